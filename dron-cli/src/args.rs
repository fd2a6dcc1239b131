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
pub struct ExecArgs {
    /// Per-request timeout in milliseconds.
    #[arg(long, env = "DRON_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout: u64,
    #[arg(long, default_value_t = 4_194_304)]
    pub max_response_bytes: usize,
    /// Keep going when a server answers with a non-2xx status.
    #[arg(long)]
    pub allow_error_status: bool,
    /// Extra HTTP method token to allow (repeatable).
    #[arg(long = "method", value_name = "TOKEN")]
    pub extra_methods: Vec<String>,
    /// Redirects to follow; 0 returns the redirect response as is.
    #[arg(long, default_value_t = 0)]
    pub max_redirects: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventsMode {
    /// JSON lines on stdout.
    Stdout,
    #[value(name = "none")]
    Off,
}
