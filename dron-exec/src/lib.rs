#![forbid(unsafe_code)]

//! Runs Dron sequences: sends each step over HTTP, feeds responses into the steps that
//! follow, and records what was sent in the sequence history.

pub mod executor;

pub use crate::executor::{
    spawn_sequence, ExecutorConfig, RequestExecutor, ReqwestHttpClient, RunError, RunOutcome,
    RunSummary, SequenceRunner, VariableResolver,
};
