//! fixa-ci - Run a fixa agent test from CI
//!
//! Starts one agent test run, waits for it to finish, and exits 0 only when
//! it passed. Any failing call, timeout, configuration or transport error
//! exits 1.

use clap::Parser;

mod cli;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    match cli.execute() {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
