mod model;
mod scan;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ParseError;
use crate::parser::{parse_sequence_str, DocumentFormat};
use crate::types::Sequence;
use crate::validate::validate_sequence;

pub use model::{DependencyGraph, Plan, PlanStep, PlanningOutcome, ValidationSummary};

pub fn plan_from_str(input: &str, doc_format: DocumentFormat) -> Result<PlanningOutcome, ParseError> {
    let parsed = parse_sequence_str(input, doc_format)?;
    Ok(plan_sequence(&parsed.sequence))
}

pub fn plan_sequence(sequence: &Sequence) -> PlanningOutcome {
    let mut validation = match validate_sequence(sequence) {
        Ok(()) => ValidationSummary::valid(),
        Err(e) => ValidationSummary::invalid_from(e),
    };

    if !validation.is_valid {
        return PlanningOutcome {
            validation,
            plan: None,
        };
    }

    let plan = build_plan(sequence);
    validation.warnings = plan_warnings(&plan);
    PlanningOutcome {
        validation,
        plan: Some(plan),
    }
}

fn build_plan(sequence: &Sequence) -> Plan {
    let param_deps = scan::scan_param_dependencies(sequence);
    let mut scheduled = BTreeSet::<String>::new();
    let mut steps = Vec::with_capacity(sequence.order.len());
    let mut depends_on = BTreeMap::new();

    // Validation guarantees every id in `order` names a step.
    for (position, id) in sequence.order.iter().enumerate() {
        let Some(step) = sequence.find_step(id) else {
            continue;
        };
        let refs = scan::scan_step(step, &param_deps);
        depends_on.insert(id.clone(), refs.steps.iter().cloned().collect::<Vec<_>>());
        steps.push(PlanStep {
            position,
            step_id: id.clone(),
            method: step.method.to_string(),
            url: step.url.source().to_string(),
            depends_on: refs.steps,
            params: refs.params,
        });
        scheduled.insert(id.clone());
    }

    let unscheduled = sequence
        .steps
        .keys()
        .filter(|id| !scheduled.contains(*id))
        .cloned()
        .collect();

    Plan {
        steps,
        graph: DependencyGraph {
            depends_on,
            order: sequence.order.clone(),
        },
        unscheduled,
    }
}

fn plan_warnings(plan: &Plan) -> Vec<String> {
    plan.unscheduled
        .iter()
        .map(|id| format!("steps.{id}: not listed in order; it will never run"))
        .collect()
}
