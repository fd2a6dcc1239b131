use std::path::Path;
use std::sync::Arc;

use dron_core::{export_history, History};
use dron_exec::executor::{
    CompositeEventSink, ExtractionError, StdoutEventSink, TracingEventSink,
};
use dron_exec::{
    spawn_sequence, RequestExecutor, ReqwestHttpClient, RunOutcome, SequenceRunner,
    VariableResolver,
};
use serde::Serialize;

use crate::cmd::config::{build_executor_config, format_for_path, load_valid_sequence};
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{EventsMode, ExecArgs, OutputArgs};

#[derive(Serialize)]
struct RunReport<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<String>,
    executed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extraction_errors: Vec<ExtractionError>,
    history: &'a History,
}

pub async fn run_cmd(
    path: &Path,
    history_out: Option<&Path>,
    events: EventsMode,
    output: OutputArgs,
    exec: ExecArgs,
) -> i32 {
    let sequence = match load_valid_sequence(path, &output) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let config = build_executor_config(&exec);
    let http = match ReqwestHttpClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let executor = Arc::new(RequestExecutor::new(Arc::new(http), config));

    let mut sinks = CompositeEventSink::new();
    sinks.add(Box::new(TracingEventSink));
    if events == EventsMode::Stdout {
        sinks.add(Box::new(StdoutEventSink));
    }
    let runner = SequenceRunner::new(executor, VariableResolver::new(), Arc::new(sinks));

    let RunOutcome { sequence, result } = match spawn_sequence(runner, sequence).await {
        Ok(outcome) => outcome,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("run task failed: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    if let Some(out) = history_out {
        let written = export_history(&sequence.history, format_for_path(out))
            .map_err(|e| e.to_string())
            .and_then(|text| std::fs::write(out, text).map_err(|e| e.to_string()));
        if let Err(e) = written {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to write history to {}: {e}", out.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    }

    let (report, code) = match &result {
        Ok(summary) => (
            RunReport {
                status: "succeeded",
                run_id: Some(summary.run_id.to_string()),
                executed: summary.executed,
                error: None,
                extraction_errors: summary.extraction_errors.clone(),
                history: &sequence.history,
            },
            exit_codes::SUCCESS,
        ),
        Err(err) => (
            RunReport {
                status: "failed",
                run_id: None,
                executed: sequence.history.len(),
                error: Some(err.to_string()),
                extraction_errors: Vec::new(),
                history: &sequence.history,
            },
            exit_codes::RUN_FAILED,
        ),
    };

    match output.format {
        OutputFormat::Text if !output.quiet => print_text(&report),
        OutputFormat::Text => {}
        _ => print_result(output.format, output.quiet, &report),
    }
    code
}

fn print_text(report: &RunReport<'_>) {
    for entry in report.history {
        println!(
            "{} {} {} ({} bytes)",
            entry.step_id,
            entry.method,
            entry.url,
            entry.response.len()
        );
    }
    for e in &report.extraction_errors {
        println!("warning: {e}");
    }
    match &report.error {
        None => println!("ok: {} steps executed", report.executed),
        Some(err) => eprintln!("error: {err} ({} steps executed)", report.executed),
    }
}
