//! stackvm CLI: run, check, list and inspect stackvm programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage/input/parse/snapshot error
//! - 2: Runtime error

use std::process;

use stackvm_cli::commands::{self, EXIT_INPUT};
use stackvm_cli::logging;

fn main() {
    let (args, level) = match logging::take_log_level(std::env::args().collect()) {
        Ok(split) => split,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(EXIT_INPUT);
        }
    };

    let env_level = std::env::var(logging::LOG_ENV).ok();
    match logging::resolve_level(level.as_deref(), env_level.as_deref()) {
        Ok(level) => logging::init_logging(level),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(EXIT_INPUT);
        }
    }

    if args.len() < 2 {
        print_usage();
        process::exit(EXIT_INPUT);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "check" => commands::check(&args[2..]),
        "list" => commands::list(&args[2..]),
        "inspect" => commands::inspect(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(EXIT_INPUT);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: stackvm [--log-level LEVEL] <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <program> [options]               Execute a text or JSON program");
    eprintln!("      --max-steps N                     Stop after N instructions");
    eprintln!("      --max-call-depth N                Limit nested CALLs");
    eprintln!("      --load-stack F / --load-vars F    Seed state from snapshots");
    eprintln!("      --dump-stack F / --dump-vars F    Save final state to snapshots");
    eprintln!("      --show-state                      Print final stack and variables");
    eprintln!("  check <program>                       Parse and resolve labels");
    eprintln!("  list <program>                        Print the program as text");
    eprintln!("  inspect (--stack|--vars) <snapshot>   Print snapshot contents");
    eprintln!();
    eprintln!("Log level defaults to warn; STACKVM_LOG sets it when the flag is absent.");
}
