//! Ember CLI
//!
//! Runs pre-parsed Ember programs.

use emberc::commands::{check_file, parse_run_args, run_file, EXIT_USAGE};

fn main() {
    emberc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let code = match command.as_str() {
        "run" => match parse_run_args(&args[2..]) {
            Ok((path, options)) => run_file(&path, &options),
            Err(message) => {
                eprintln!("error: {message}");
                eprintln!("Usage: ember run <file.json> [--profile] [--max-depth=N]");
                EXIT_USAGE
            }
        },
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: ember check <file.json>");
                EXIT_USAGE
            } else {
                check_file(&args[2])
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        "version" | "--version" | "-V" => {
            println!("ember {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            EXIT_USAGE
        }
    };

    std::process::exit(code);
}

fn print_usage() {
    println!("Ember - raise, rescue and ensure for pre-parsed programs");
    println!();
    println!("Usage: ember <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file.json>      Run a program");
    println!("    --profile          Print evaluation counters to stderr");
    println!("    --max-depth=N      Limit call depth (overflow raises StackOverflowError)");
    println!("  check <file.json>    Load and validate a program without running it");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Environment:");
    println!("  EMBER_LOG            Log filter, e.g. EMBER_LOG=ember_eval=debug");
}
