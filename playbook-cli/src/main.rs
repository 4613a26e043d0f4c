use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "playbook", version, about = "OpenAPI playbook executor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

/// Logs go to stderr so that `--format json` output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            bundle,
            target,
            env,
            transport,
            output,
        } => cmd::run::run_cmd(bundle, target, env, transport, output).await,
        Command::Auth {
            bundle,
            credential,
            method,
            env,
            transport,
            output,
        } => {
            cmd::auth::auth_cmd(
                bundle,
                &credential,
                method.as_deref(),
                env,
                transport,
                output,
            )
            .await
        }
        Command::Validate { path, oas, output } => {
            cmd::validate::validate_cmd(&path, oas.as_deref(), output).await
        }
    }
}
