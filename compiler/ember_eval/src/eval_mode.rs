//! Evaluation modes.
//!
//! Both modes bound the frame depth, so runaway recursion surfaces as a
//! rescuable `StackOverflowError` instead of exhausting memory. `ember run`
//! gets the larger limit; the host stack grows through `stacker` beneath it.

/// Evaluation policy, selected by the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Standard mode for `ember run`: output to stdout.
    #[default]
    Interpret,
    /// Test execution: output is captured, depth is bounded.
    TestRun,
}

impl EvalMode {
    /// Whether `print` reaches the process's stdout by default.
    #[inline]
    pub fn allows_io(self) -> bool {
        matches!(self, Self::Interpret)
    }

    /// Default frame depth limit. `None` means unlimited.
    ///
    /// - `Interpret`: 10,000 on native, 200 on WASM
    /// - `TestRun`: Always 500
    #[inline]
    pub fn max_recursion_depth(self) -> Option<usize> {
        match self {
            Self::Interpret => {
                #[cfg(target_arch = "wasm32")]
                {
                    Some(200)
                }
                #[cfg(not(target_arch = "wasm32"))]
                {
                    Some(10_000)
                }
            }
            Self::TestRun => Some(500),
        }
    }
}
