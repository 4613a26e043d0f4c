use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct BundleArgs {
    /// Playbook bundle (JSON or YAML).
    pub bundle: PathBuf,
    /// OpenAPI document, as a file path or an http(s) URL.
    #[arg(long)]
    pub oas: String,
}

#[derive(Debug, Args, Clone)]
pub struct TargetArgs {
    #[arg(long)]
    pub operation: Option<String>,
    /// Scenario of `--operation`; the first declared one when omitted.
    #[arg(long, requires = "operation")]
    pub scenario: Option<String>,
    /// `request/<id>`, `operation/<id>` or a bare id.
    #[arg(long)]
    pub request: Option<String>,
    #[arg(long, value_enum)]
    pub global: Option<GlobalBlock>,
    /// Wrap the operation or request with the bundle's global before/after blocks.
    #[arg(long)]
    pub global_blocks: bool,
    /// Extra variables visible to a `--request` run.
    #[arg(long = "input", value_name = "KEY=VALUE")]
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GlobalBlock {
    Before,
    After,
}

#[derive(Debug, Args, Clone)]
pub struct EnvArgs {
    /// JSON or YAML file with `default` and `secrets` maps.
    #[arg(long)]
    pub env_file: Option<PathBuf>,
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
    #[arg(long = "secret", value_name = "KEY=VALUE")]
    pub secrets: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct TransportArgs {
    /// Overrides the OpenAPI servers (falls back to PLAYBOOK_SERVER).
    #[arg(long)]
    pub server: Option<String>,
    /// Dry run: no request leaves the process.
    #[arg(long)]
    pub mock: bool,
    #[arg(long, default_value_t = 30000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 10_485_760)]
    pub max_response_bytes: usize,
    /// Accept invalid TLS certificates.
    #[arg(long)]
    pub insecure: bool,
}
