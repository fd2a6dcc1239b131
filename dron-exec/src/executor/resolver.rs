//! Fills placeholders in steps that have not run yet from responses of steps that have.
//!
//! Resolution is incremental: each completed step fills only the placeholders that name
//! it, in place, and leaves the rest for later producers. A placeholder that cannot be
//! filled (unparsable response, path that does not resolve) stays in the template as
//! written and is reported as an [`ExtractionError`]; it never stops the run.

use std::cell::OnceCell;

use dron_core::expressions::{Reference, Selector};
use dron_core::{Param, Step, StepField, Template};
use serde_json::Value as JsonValue;

/// Stands in for a step id when the producer or consumer of a value is the param list.
pub const PARAMS_SCOPE: &str = "$params";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[error("cannot fill {placeholder} in {consumer}/{field} from {producer}: {kind}")]
pub struct ExtractionError {
    pub producer: String,
    pub consumer: String,
    pub field: StepField,
    pub placeholder: String,
    pub kind: ExtractionErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    #[error("response is not valid JSON: {message}")]
    UnparsableResponse { message: String },
    #[error("path `{path}` did not resolve: {detail}")]
    PathNotFound { path: String, detail: String },
    #[error("unknown param `{key}`")]
    UnknownParam { key: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VariableResolver;

impl VariableResolver {
    pub fn new() -> Self {
        Self
    }

    /// Pushes values out of `producer_id`'s response into every pending step and into
    /// the sequence params.
    pub fn fill_future_params<'s, I>(
        &self,
        producer_id: &str,
        response: &str,
        pending: I,
        params: &mut [Param],
    ) -> Vec<ExtractionError>
    where
        I: IntoIterator<Item = &'s mut Step>,
    {
        let producer = ProducerResponse::new(producer_id, response);
        let mut errors = Vec::new();

        for step in pending {
            let consumer = step.id.clone();
            for (field, template) in step.fields_mut() {
                fill_template(&producer, &consumer, field, template, &mut errors);
            }
        }

        for param in params.iter_mut() {
            let field = StepField::Param {
                key: param.key.clone(),
            };
            fill_template(&producer, PARAMS_SCOPE, field, &mut param.value, &mut errors);
        }

        errors
    }

    /// Replaces `{{$params.key}}` in `step` with the param's current value.
    ///
    /// A param whose own value still waits on a producer is left as a placeholder.
    pub fn bind_params(&self, step: &mut Step, params: &[Param]) -> Vec<ExtractionError> {
        let mut errors = Vec::new();
        let consumer = step.id.clone();

        for (field, template) in step.fields_mut() {
            template.substitute(|p| {
                let Reference::Param { key } = &p.reference else {
                    return None;
                };
                match params.iter().find(|param| &param.key == key) {
                    Some(param) if param.value.is_resolved() => Some(param.value.render()),
                    Some(_) => None,
                    None => {
                        errors.push(ExtractionError {
                            producer: PARAMS_SCOPE.to_string(),
                            consumer: consumer.clone(),
                            field: field.clone(),
                            placeholder: p.raw.clone(),
                            kind: ExtractionErrorKind::UnknownParam { key: key.clone() },
                        });
                        None
                    }
                }
            });
        }

        errors
    }
}

fn fill_template(
    producer: &ProducerResponse<'_>,
    consumer: &str,
    field: StepField,
    template: &mut Template,
    errors: &mut Vec<ExtractionError>,
) {
    template.substitute(|p| {
        let Reference::Step { step_id, selector } = &p.reference else {
            return None;
        };
        if step_id != producer.id {
            return None;
        }
        match producer.extract(selector) {
            Ok(value) => Some(value),
            Err(kind) => {
                errors.push(ExtractionError {
                    producer: producer.id.to_string(),
                    consumer: consumer.to_string(),
                    field: field.clone(),
                    placeholder: p.raw.clone(),
                    kind,
                });
                None
            }
        }
    });
}

/// A completed step's response, parsed as JSON on first use.
struct ProducerResponse<'r> {
    id: &'r str,
    raw: &'r str,
    parsed: OnceCell<Result<JsonValue, String>>,
}

impl<'r> ProducerResponse<'r> {
    fn new(id: &'r str, raw: &'r str) -> Self {
        Self {
            id,
            raw,
            parsed: OnceCell::new(),
        }
    }

    fn json(&self) -> Result<&JsonValue, ExtractionErrorKind> {
        self.parsed
            .get_or_init(|| serde_json::from_str(self.raw).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|message| ExtractionErrorKind::UnparsableResponse {
                message: message.clone(),
            })
    }

    fn extract(&self, selector: &Selector) -> Result<String, ExtractionErrorKind> {
        match selector {
            Selector::Whole => Ok(self.raw.to_string()),
            Selector::Path(path) => {
                let doc = self.json()?;
                path.evaluate(doc)
                    .map(render_value)
                    .map_err(|e| ExtractionErrorKind::PathNotFound {
                        path: path.to_string(),
                        detail: e.to_string(),
                    })
            }
            Selector::Pointer(ptr) => {
                let doc = self.json()?;
                ptr.evaluate(doc)
                    .map(render_value)
                    .ok_or_else(|| ExtractionErrorKind::PathNotFound {
                        path: format!("#{}", ptr.as_str()),
                        detail: "no value at pointer".to_string(),
                    })
            }
        }
    }
}

fn render_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
