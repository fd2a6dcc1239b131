use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ParseError;
use crate::types::{History, Sequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedSequence {
    pub sequence: Sequence,
    pub format: DocumentFormat,
}

pub fn parse_sequence_str(input: &str, format: DocumentFormat) -> Result<ParsedSequence, ParseError> {
    let (sequence, format) = parse_as::<Sequence>(input, format)?;
    Ok(ParsedSequence { sequence, format })
}

/// Serializes a run's history. `Auto` writes JSON.
pub fn export_history(history: &History, format: DocumentFormat) -> Result<String, ParseError> {
    export(history, format)
}

/// Serializes a sequence definition (templates as authored, plus any recorded history).
pub fn export_sequence(sequence: &Sequence, format: DocumentFormat) -> Result<String, ParseError> {
    export(sequence, format)
}

fn export<T: Serialize>(value: &T, format: DocumentFormat) -> Result<String, ParseError> {
    match format {
        DocumentFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        DocumentFormat::Json | DocumentFormat::Auto => Ok(serde_json::to_string_pretty(value)?),
    }
}

fn parse_as<T: DeserializeOwned>(
    input: &str,
    format: DocumentFormat,
) -> Result<(T, DocumentFormat), ParseError> {
    match format {
        DocumentFormat::Json => Ok((serde_json::from_str(input)?, format)),
        DocumentFormat::Yaml => Ok((serde_yaml::from_str(input)?, format)),
        DocumentFormat::Auto => parse_auto(input),
    }
}

fn parse_auto<T: DeserializeOwned>(input: &str) -> Result<(T, DocumentFormat), ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::UnknownFormat);
    }

    // JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str::<T>(input) {
            Ok(v) => Ok((v, DocumentFormat::Json)),
            Err(e) => match serde_yaml::from_str::<T>(input) {
                Ok(v) => Ok((v, DocumentFormat::Yaml)),
                // Report the JSON error since JSON was tried first.
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    match serde_yaml::from_str::<T>(input) {
        Ok(v) => Ok((v, DocumentFormat::Yaml)),
        Err(e) => {
            if let Ok(v) = serde_json::from_str::<T>(input) {
                return Ok((v, DocumentFormat::Json));
            }
            Err(ParseError::Yaml(e))
        }
    }
}
