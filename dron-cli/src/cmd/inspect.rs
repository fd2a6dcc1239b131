use std::path::Path;

use dron_core::plan_sequence;

use crate::cmd::config::load_sequence;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::OutputArgs;

pub async fn inspect_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match load_sequence(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let outcome = plan_sequence(&parsed.sequence);
    let Some(plan) = outcome.plan.as_ref() else {
        if output.format == OutputFormat::Json {
            print_result(output.format, output.quiet, &outcome);
        } else {
            print_error(output.format, output.quiet, "validation failed");
            if !output.quiet {
                for e in &outcome.validation.errors {
                    eprintln!("- {e}");
                }
            }
        }
        return exit_codes::VALIDATION_FAILED;
    };

    match output.format {
        OutputFormat::Dot => {
            if !output.quiet {
                print!("{}", plan.graph.to_dot());
            }
        }
        OutputFormat::Json => print_result(output.format, output.quiet, &outcome),
        OutputFormat::Text if !output.quiet => {
            println!("Steps:");
            for s in &plan.steps {
                println!("  {}. {} {} {}", s.position + 1, s.step_id, s.method, s.url);
                if !s.depends_on.is_empty() {
                    let deps: Vec<&str> = s.depends_on.iter().map(String::as_str).collect();
                    println!("     uses: {}", deps.join(", "));
                }
                if !s.params.is_empty() {
                    let params: Vec<&str> = s.params.iter().map(String::as_str).collect();
                    println!("     params: {}", params.join(", "));
                }
            }
            if !plan.unscheduled.is_empty() {
                println!("\nNot in order: {}", plan.unscheduled.join(", "));
            }
            for w in &outcome.validation.warnings {
                println!("warning: {w}");
            }
        }
        OutputFormat::Text => {}
    }

    exit_codes::SUCCESS
}
