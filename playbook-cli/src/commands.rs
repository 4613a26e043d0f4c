use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute an operation scenario, a single request or a global block.
    Run {
        #[command(flatten)]
        bundle: BundleArgs,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        env: EnvArgs,
        #[command(flatten)]
        transport: TransportArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Acquire one credential and print its value.
    Auth {
        #[command(flatten)]
        bundle: BundleArgs,
        #[arg(long)]
        credential: String,
        #[arg(long)]
        method: Option<String>,
        #[command(flatten)]
        env: EnvArgs,
        #[command(flatten)]
        transport: TransportArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse and validate a bundle.
    Validate {
        path: PathBuf,
        /// Also check that every operationId exists in this OpenAPI document.
        #[arg(long)]
        oas: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}
