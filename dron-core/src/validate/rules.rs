use std::collections::HashSet;

use crate::expressions::{Reference, Template};
use crate::types::{Sequence, Step};

use super::validator::{Validator, HEADER_NAME_RE, ID_RE};

pub(crate) fn validate_order(v: &mut Validator, sequence: &Sequence) {
    if sequence.order.is_empty() {
        v.push("order", "must have at least one entry");
    }

    let mut seen = HashSet::<&str>::new();
    for (idx, id) in sequence.order.iter().enumerate() {
        let path = format!("order[{idx}]");
        if id.trim().is_empty() {
            v.push(path, "must not be empty");
            continue;
        }
        if !sequence.steps.contains_key(id) {
            v.push(&path, format!("references unknown step `{id}`"));
        }
        if !seen.insert(id) {
            v.push(path, format!("step `{id}` appears more than once"));
        }
    }
}

pub(crate) fn validate_params(v: &mut Validator, sequence: &Sequence) {
    let mut keys = HashSet::<&str>::new();
    for (idx, p) in sequence.params.iter().enumerate() {
        let path = format!("params[{idx}]");
        if p.key.trim().is_empty() {
            v.push(format!("{path}.key"), "must not be empty");
        } else if !keys.insert(&p.key) {
            v.push(format!("{path}.key"), format!("duplicate param `{}`", p.key));
        }
        validate_template_refs(v, sequence, &format!("{path}.value"), &p.value, true);
    }
}

pub(crate) fn validate_step(v: &mut Validator, sequence: &Sequence, key: &str, step: &Step) {
    let path = format!("steps.{key}");

    if step.id != key {
        v.push(
            format!("{path}.id"),
            format!("id `{}` does not match its key", step.id),
        );
    }
    if !ID_RE.is_match(&step.id) {
        v.push(format!("{path}.id"), "must match regex [A-Za-z0-9_\\-]+");
    }
    if step.url.is_empty() {
        v.push(format!("{path}.url"), "must not be empty");
    }

    for (idx, h) in step.headers.iter().enumerate() {
        if !HEADER_NAME_RE.is_match(&h.name) {
            v.push(
                format!("{path}.headers[{idx}].name"),
                format!("invalid header name `{}`", h.name),
            );
        }
    }

    // Steps absent from `order` never run, so their placeholders have no run order to check.
    let position = position_in_order(sequence, key);
    for (field, template) in step.fields() {
        let field_path = format!("{path}.{field}");
        validate_template_refs(v, sequence, &field_path, template, false);
        if let Some(position) = position {
            validate_run_order(v, sequence, &field_path, template, key, position);
        }
    }
}

/// A placeholder can only be filled by a step that runs before its consumer.
/// Param placeholders are checked through the steps the param value reads.
fn validate_run_order(
    v: &mut Validator,
    sequence: &Sequence,
    path: &str,
    template: &Template,
    consumer: &str,
    position: usize,
) {
    for p in template.placeholders() {
        match &p.reference {
            Reference::Step { step_id, .. } => {
                check_producer(v, sequence, path, &p.raw, step_id, consumer, position);
            }
            Reference::Param { key } => {
                let Some(param) = sequence.param(key) else {
                    continue;
                };
                for inner in param.value.placeholders() {
                    if let Reference::Step { step_id, .. } = &inner.reference {
                        check_producer(v, sequence, path, &p.raw, step_id, consumer, position);
                    }
                }
            }
        }
    }
}

fn check_producer(
    v: &mut Validator,
    sequence: &Sequence,
    path: &str,
    raw: &str,
    producer: &str,
    consumer: &str,
    position: usize,
) {
    // Unknown producers are reported by `validate_template_refs`.
    if !sequence.steps.contains_key(producer) {
        return;
    }
    if producer == consumer {
        v.push(path, format!("{raw} references the response of its own step `{producer}`"));
        return;
    }
    match position_in_order(sequence, producer) {
        Some(p) if p < position => {}
        Some(_) => v.push(path, format!("{raw} references step `{producer}` which runs later")),
        None => v.push(
            path,
            format!("{raw} references step `{producer}` which is not in order and never runs"),
        ),
    }
}

fn position_in_order(sequence: &Sequence, id: &str) -> Option<usize> {
    sequence.order.iter().position(|o| o == id)
}

fn validate_template_refs(
    v: &mut Validator,
    sequence: &Sequence,
    path: &str,
    template: &Template,
    in_param: bool,
) {
    for p in template.placeholders() {
        match &p.reference {
            Reference::Step { step_id, .. } => {
                if !sequence.steps.contains_key(step_id) {
                    v.push(path, format!("{} references unknown step `{step_id}`", p.raw));
                }
            }
            Reference::Param { key } => {
                if in_param {
                    v.push(path, format!("{} params cannot reference other params", p.raw));
                } else if sequence.param(key).is_none() {
                    v.push(path, format!("{} references unknown param `{key}`", p.raw));
                }
            }
        }
    }
}
