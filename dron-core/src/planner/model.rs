use std::collections::{BTreeMap, BTreeSet};

use crate::error::ValidationError;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlanningOutcome {
    pub validation: ValidationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidationSummary {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationSummary {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn invalid_from(err: ValidationError) -> Self {
        let errors = err.violations.into_iter().map(|v| v.to_string()).collect();
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub graph: DependencyGraph,
    /// Steps defined but absent from `order`; they never run.
    pub unscheduled: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlanStep {
    pub position: usize,
    pub step_id: String,
    pub method: String,
    pub url: String,
    /// Producer steps whose responses this step's templates (directly or through params) read.
    pub depends_on: BTreeSet<String>,
    pub params: BTreeSet<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DependencyGraph {
    /// For each step, which steps it reads values from.
    pub depends_on: BTreeMap<String, Vec<String>>,
    /// Execution order.
    pub order: Vec<String>,
}

impl DependencyGraph {
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph dron {\n");
        out.push_str("  rankdir=LR;\n");

        for pair in self.order.windows(2) {
            out.push_str(&format!(
                "  \"{}\" -> \"{}\" [style=dotted, arrowhead=none];\n",
                pair[0], pair[1]
            ));
        }

        for (step, deps) in &self.depends_on {
            if deps.is_empty() {
                out.push_str(&format!("  \"{step}\";\n"));
            } else {
                for dep in deps {
                    out.push_str(&format!("  \"{dep}\" -> \"{step}\";\n"));
                }
            }
        }

        out.push_str("}\n");
        out
    }
}
