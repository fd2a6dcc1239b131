use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::json_pointer::{JsonPointer, JsonPointerError};
use super::path::{PathError, ValuePath};

pub(crate) static STEP_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("valid regex"));

static PARAM_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid regex"));

const PARAMS_PREFIX: &str = "$params.";

/// What a placeholder points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Step { step_id: String, selector: Selector },
    Param { key: String },
}

/// Which part of a producing step's response a placeholder wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// The raw response text, unparsed.
    Whole,
    Path(ValuePath),
    Pointer(JsonPointer),
}

impl Reference {
    pub fn step_id(&self) -> Option<&str> {
        match self {
            Reference::Step { step_id, .. } => Some(step_id),
            Reference::Param { .. } => None,
        }
    }

    pub fn param_key(&self) -> Option<&str> {
        match self {
            Reference::Param { key } => Some(key),
            Reference::Step { .. } => None,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Param { key } => write!(f, "{PARAMS_PREFIX}{key}"),
            Reference::Step { step_id, selector } => match selector {
                Selector::Whole => f.write_str(step_id),
                Selector::Path(p) => write!(f, "{step_id}{p}"),
                Selector::Pointer(p) => write!(f, "{step_id}#{}", p.as_str()),
            },
        }
    }
}

pub fn parse_reference(input: &str) -> Result<Reference, ReferenceError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ReferenceError::Empty);
    }

    if s.starts_with('$') {
        let key = s
            .strip_prefix(PARAMS_PREFIX)
            .ok_or_else(|| ReferenceError::UnknownRoot(s.to_string()))?;
        if key.is_empty() {
            return Err(ReferenceError::Empty);
        }
        if !PARAM_KEY_RE.is_match(key) {
            return Err(ReferenceError::InvalidParamKey(key.to_string()));
        }
        return Ok(Reference::Param {
            key: key.to_string(),
        });
    }

    let end = s.find(['.', '[', '#']).unwrap_or(s.len());
    let (step_id, rest) = s.split_at(end);
    if step_id.is_empty() {
        return Err(ReferenceError::Empty);
    }
    if !STEP_ID_RE.is_match(step_id) {
        return Err(ReferenceError::InvalidStepId(step_id.to_string()));
    }

    let selector = if rest.is_empty() {
        Selector::Whole
    } else if let Some(fragment) = rest.strip_prefix('#') {
        Selector::Pointer(JsonPointer::parse(fragment)?)
    } else {
        Selector::Path(ValuePath::parse(rest)?)
    };

    Ok(Reference::Step {
        step_id: step_id.to_string(),
        selector,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("placeholder must name a step or $params.<key>")]
    Empty,
    #[error("unknown placeholder root: {0} (only $params.<key> is supported)")]
    UnknownRoot(String),
    #[error("invalid step id: {0}")]
    InvalidStepId(String),
    #[error("invalid param key: {0}")]
    InvalidParamKey(String),
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("invalid json pointer: {0}")]
    InvalidJsonPointer(#[from] JsonPointerError),
}
