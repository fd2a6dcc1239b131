use std::path::Path;
use std::time::Duration;

use dron_core::{parse_sequence_str, DocumentFormat, DronError, ParsedSequence, Sequence, Validate};
use dron_exec::ExecutorConfig;

use crate::exit_codes;
use crate::output::print_error;
use crate::{ExecArgs, OutputArgs};

/// Reads and parses a sequence file, printing the failure and returning the exit code on error.
pub fn load_sequence(path: &Path, output: &OutputArgs) -> Result<ParsedSequence, i32> {
    let content = read_file(path, output)?;
    parse_sequence_str(&content, DocumentFormat::Auto).map_err(|e| {
        print_error(output.format, output.quiet, &e.to_string());
        exit_codes::VALIDATION_FAILED
    })
}

/// Like [`load_sequence`], but also refuses a sequence that fails validation.
pub fn load_valid_sequence(path: &Path, output: &OutputArgs) -> Result<Sequence, i32> {
    let content = read_file(path, output)?;
    parse_and_validate(&content).map_err(|e| {
        print_error(output.format, output.quiet, &e.to_string());
        if let DronError::Validation(err) = &e {
            if !output.quiet {
                for v in &err.violations {
                    eprintln!("- {v}");
                }
            }
        }
        exit_codes::VALIDATION_FAILED
    })
}

fn parse_and_validate(content: &str) -> Result<Sequence, DronError> {
    let sequence = parse_sequence_str(content, DocumentFormat::Auto)?.sequence;
    sequence.validate()?;
    Ok(sequence)
}

fn read_file(path: &Path, output: &OutputArgs) -> Result<String, i32> {
    std::fs::read_to_string(path).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to read {}: {e}", path.display()),
        );
        exit_codes::RUNTIME_ERROR
    })
}

pub fn build_executor_config(exec: &ExecArgs) -> ExecutorConfig {
    ExecutorConfig {
        timeout: Duration::from_millis(exec.timeout),
        max_response_bytes: exec.max_response_bytes,
        fail_on_error_status: !exec.allow_error_status,
        extra_methods: exec
            .extra_methods
            .iter()
            .map(|m| m.trim().to_ascii_uppercase())
            .filter(|m| !m.is_empty())
            .collect(),
        max_redirects: exec.max_redirects,
        user_agent: concat!("dron/", env!("CARGO_PKG_VERSION")).to_string(),
    }
}

/// Picks the export format from the file extension.
pub fn format_for_path(path: &Path) -> DocumentFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => DocumentFormat::Yaml,
        _ => DocumentFormat::Json,
    }
}
