//! Stockroom operator CLI

#![expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "the CLI reports results on the terminal"
)]

use std::process::ExitCode;

use clap::Parser;

mod cli;

#[tokio::main]
pub async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    if let Err(error) = cli::Cli::parse().run().await {
        eprintln!("{error}");

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
