use crate::expressions::{Template, TemplateError};

/// A sequence-wide key/value pair, referenced from steps as `{{$params.key}}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Param {
    pub key: String,
    #[serde(default)]
    pub value: Template,
}

impl Param {
    pub fn new(key: impl Into<String>, value: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            key: key.into(),
            value: Template::parse(value)?,
        })
    }
}
