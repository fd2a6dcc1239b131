use std::collections::{BTreeMap, BTreeSet};

use crate::expressions::{Reference, Template};
use crate::types::{Sequence, Step};

#[derive(Debug, Default)]
pub(crate) struct StepRefs {
    pub steps: BTreeSet<String>,
    pub params: BTreeSet<String>,
}

pub(crate) fn scan_param_dependencies(sequence: &Sequence) -> BTreeMap<String, BTreeSet<String>> {
    let mut out = BTreeMap::new();
    for p in &sequence.params {
        let mut refs = StepRefs::default();
        scan_template(&p.value, &mut refs);
        out.insert(p.key.clone(), refs.steps);
    }
    out
}

/// Direct references of one step, with param references expanded to the steps the
/// param values read.
pub(crate) fn scan_step(step: &Step, param_deps: &BTreeMap<String, BTreeSet<String>>) -> StepRefs {
    let mut refs = StepRefs::default();
    for (_, template) in step.fields() {
        scan_template(template, &mut refs);
    }
    for key in &refs.params {
        if let Some(deps) = param_deps.get(key) {
            refs.steps.extend(deps.iter().cloned());
        }
    }
    refs
}

fn scan_template(template: &Template, refs: &mut StepRefs) {
    for p in template.placeholders() {
        match &p.reference {
            Reference::Step { step_id, .. } => {
                refs.steps.insert(step_id.clone());
            }
            Reference::Param { key } => {
                refs.params.insert(key.clone());
            }
        }
    }
}
