//! Main entry point for the aws-envfile CLI application

use std::process::ExitCode;

use aws_envfile::LoggingTransformer;
use aws_envfile::cli::{Cli, run};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    LoggingTransformer::init(cli.log_level());

    match run(cli).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {e}", e.name());
            ExitCode::FAILURE
        }
    }
}
