//! Optional evaluation counters for `--profile`.

/// Counters for one run.
///
/// Stored as `Option<EvalCounters>` on the interpreter. When `None`, all
/// counter increments are no-ops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalCounters {
    pub frames_entered: u64,
    pub raises: u64,
    pub handlers_matched: u64,
    pub cleanups_run: u64,
    pub frames_unwound: u64,
}

impl EvalCounters {
    #[inline]
    pub fn count_frame(&mut self) {
        self.frames_entered = self.frames_entered.wrapping_add(1);
    }

    #[inline]
    pub fn count_raise(&mut self) {
        self.raises = self.raises.wrapping_add(1);
    }

    #[inline]
    pub fn count_handler_match(&mut self) {
        self.handlers_matched = self.handlers_matched.wrapping_add(1);
    }

    #[inline]
    pub fn count_cleanup(&mut self) {
        self.cleanups_run = self.cleanups_run.wrapping_add(1);
    }

    #[inline]
    pub fn count_unwound(&mut self) {
        self.frames_unwound = self.frames_unwound.wrapping_add(1);
    }

    /// Format a summary report.
    pub fn report(&self) -> String {
        format!(
            "Evaluation profile:\n  \
             Frames entered:   {}\n  \
             Raises:           {}\n  \
             Handlers matched: {}\n  \
             Cleanups run:     {}\n  \
             Frames unwound:   {}",
            self.frames_entered,
            self.raises,
            self.handlers_matched,
            self.cleanups_run,
            self.frames_unwound,
        )
    }
}
