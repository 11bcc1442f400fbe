//! # Tenancy CLI Entry Point
//!
//! The main executable for the tenancy tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Installs logging and parses arguments using [`cli::Cli`].
//! 2. **Configuration**: Resolves the gRPC endpoint and token from flags, the credentials file and defaults.
//! 3. **Execution**: Runs one tenant operation over gRPC ([`grpc::run`]) or REST ([`rest::run`]).
//! 4. **Presentation**: Prints the result to standard output. gRPC failures go to standard error
//!    with a non-zero exit code; REST failures are reported on standard output.

mod cli;
mod formatter;
mod grpc;
mod rest;
mod telemetry;

use clap::Parser;
use cli::{Cli, Commands};
use formatter::{FormattedString, GenericError};
use std::io;
use std::process;

#[tokio::main]
async fn main() {
    telemetry::init();

    let args = Cli::parse();

    match args.command {
        Commands::Grpc {
            endpoint,
            credentials,
            shutdown_grace,
            operation,
        } => {
            let settings =
                match grpc::Settings::resolve(endpoint, credentials.as_deref(), shutdown_grace) {
                    Ok(settings) => settings,
                    Err(err) => {
                        eprintln!(
                            "{}",
                            FormattedString::from(GenericError("Invalid credentials", err))
                        );
                        process::exit(1);
                    }
                };

            if let Err(err) = grpc::run(&settings, operation, &mut io::stdout()).await {
                eprintln!("{}", FormattedString::from(err));
                process::exit(1);
            }
        }
        Commands::Rest {
            base_url,
            token,
            operation,
        } => {
            if let Err(err) = rest::run(&base_url, &token, operation, &mut io::stdout()).await {
                eprintln!(
                    "{}",
                    FormattedString::from(GenericError("Failed to write output", err))
                );
                process::exit(1);
            }
        }
    }
}
