use std::process::ExitCode;

use clap::Parser;
use gonerate::cli::{run_cli, Cli};
use gonerate::logging::{init_logging, LogConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = match init_logging(&LogConfig::from_env()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: {e:#}");
            None
        }
    };

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
