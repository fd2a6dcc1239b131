use std::fmt;

use crate::expressions::{Template, TemplateError};
use crate::types::HttpMethod;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Header {
    pub name: String,
    #[serde(default)]
    pub value: Template,
}

/// One HTTP call in a sequence.
///
/// `url`, `body` and header values are templates; `response` stays empty until the
/// step has run in the current run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    pub id: String,

    #[serde(default)]
    pub method: HttpMethod,

    #[serde(default)]
    pub url: Template,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,

    #[serde(default, skip_serializing_if = "Template::is_empty")]
    pub body: Template,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response: String,
}

/// Names a template field of a step, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepField {
    Url,
    Body,
    Header { index: usize, name: String },
    Param { key: String },
}

impl fmt::Display for StepField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepField::Url => f.write_str("url"),
            StepField::Body => f.write_str("body"),
            StepField::Header { index, name } => write!(f, "header[{index}]:{name}"),
            StepField::Param { key } => write!(f, "param:{key}"),
        }
    }
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        method: HttpMethod,
        url: &str,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            id: id.into(),
            method,
            url: Template::parse(url)?,
            headers: Vec::new(),
            body: Template::default(),
            response: String::new(),
        })
    }

    pub fn with_header(mut self, name: impl Into<String>, value: &str) -> Result<Self, TemplateError> {
        self.headers.push(Header {
            name: name.into(),
            value: Template::parse(value)?,
        });
        Ok(self)
    }

    pub fn with_body(mut self, body: &str) -> Result<Self, TemplateError> {
        self.body = Template::parse(body)?;
        Ok(self)
    }

    pub fn fields(&self) -> Vec<(StepField, &Template)> {
        let mut out = Vec::with_capacity(self.headers.len() + 2);
        out.push((StepField::Url, &self.url));
        for (index, h) in self.headers.iter().enumerate() {
            out.push((
                StepField::Header {
                    index,
                    name: h.name.clone(),
                },
                &h.value,
            ));
        }
        out.push((StepField::Body, &self.body));
        out
    }

    pub fn fields_mut(&mut self) -> Vec<(StepField, &mut Template)> {
        let Step {
            url, headers, body, ..
        } = self;
        let mut out = Vec::with_capacity(headers.len() + 2);
        out.push((StepField::Url, url));
        for (index, h) in headers.iter_mut().enumerate() {
            out.push((
                StepField::Header {
                    index,
                    name: h.name.clone(),
                },
                &mut h.value,
            ));
        }
        out.push((StepField::Body, body));
        out
    }

    /// Raw text of every placeholder still present in the step's templates.
    pub fn unresolved_placeholders(&self) -> Vec<String> {
        self.fields()
            .into_iter()
            .flat_map(|(_, t)| t.placeholders().map(|p| p.raw.clone()).collect::<Vec<_>>())
            .collect()
    }

    /// Clears the response and restores templates to their authored text.
    pub fn reset(&mut self) {
        for (_, t) in self.fields_mut() {
            t.reset();
        }
        self.response.clear();
    }
}
