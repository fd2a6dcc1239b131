use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute a sequence, step by step, in order.
    Run {
        path: PathBuf,
        /// Write the run history here (YAML for .yaml/.yml, JSON otherwise).
        #[arg(long)]
        history_out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = EventsMode::Off)]
        events: EventsMode,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        exec: ExecArgs,
    },
    /// Check a sequence without sending anything.
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the execution plan and step dependencies.
    Inspect {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}
