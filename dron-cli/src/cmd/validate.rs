use std::path::Path;

use dron_core::{plan_sequence, Validate};
use serde::Serialize;

use crate::cmd::config::load_sequence;
use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    format: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

pub async fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match load_sequence(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let format = format!("{:?}", parsed.format);

    match parsed.sequence.validate() {
        Ok(()) => {
            let warnings = plan_sequence(&parsed.sequence).validation.warnings;
            if output.format == OutputFormat::Text && !output.quiet {
                println!(
                    "ok: valid sequence ({format}, {} steps)",
                    parsed.sequence.order.len()
                );
                for w in &warnings {
                    println!("warning: {w}");
                }
            } else {
                print_result(
                    output.format,
                    output.quiet,
                    &ValidateResult {
                        valid: true,
                        format,
                        errors: vec![],
                        warnings,
                    },
                );
            }
            exit_codes::SUCCESS
        }
        Err(err) => {
            let errors: Vec<String> = err.violations.iter().map(|v| v.to_string()).collect();
            if output.format == OutputFormat::Text && !output.quiet {
                eprintln!("error: validation failed");
                for e in &errors {
                    eprintln!("- {e}");
                }
            } else {
                print_result(
                    output.format,
                    output.quiet,
                    &ValidateResult {
                        valid: false,
                        format,
                        errors,
                        warnings: vec![],
                    },
                );
            }
            exit_codes::VALIDATION_FAILED
        }
    }
}
