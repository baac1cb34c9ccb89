//! Tokensmith - command-line tool for rendering circular game tokens

use std::process::ExitCode;

use tokensmith::cli;

fn main() -> ExitCode {
    env_logger::init();
    cli::run()
}
