use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::placeholder::{parse_reference, Reference, ReferenceError};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The placeholder exactly as written, braces included.
    pub raw: String,
    pub reference: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Text with `{{ ... }}` placeholders that are filled in as producing steps complete.
///
/// `source` is the text as authored; `segments` is the current resolution state.
/// Substituted values become literal segments, so they are never scanned again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

pub fn parse_template(input: &str) -> Result<Template, TemplateError> {
    Template::parse(input)
}

impl Template {
    pub fn parse(input: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            source: input.to_string(),
            segments: scan_segments(input)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn is_resolved(&self) -> bool {
        !self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder(_)))
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    /// Current text: resolved values inline, unresolved placeholders as written.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(l) => out.push_str(l),
                Segment::Placeholder(p) => out.push_str(&p.raw),
            }
        }
        out
    }

    /// Replaces every placeholder for which `fill` returns a value. Returns how many were replaced.
    pub fn substitute<F>(&mut self, mut fill: F) -> usize
    where
        F: FnMut(&Placeholder) -> Option<String>,
    {
        if self.is_resolved() {
            return 0;
        }

        let mut replaced = 0;
        let mut out: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for seg in std::mem::take(&mut self.segments) {
            let seg = match seg {
                Segment::Placeholder(p) => match fill(&p) {
                    Some(value) => {
                        replaced += 1;
                        Segment::Literal(value)
                    }
                    None => Segment::Placeholder(p),
                },
                lit => lit,
            };
            push_segment(&mut out, seg);
        }
        self.segments = out;
        replaced
    }

    /// Back to the authored text, discarding any substitutions.
    pub fn reset(&mut self) {
        // `source` parsed once already, so this cannot fail.
        if let Ok(segments) = scan_segments(&self.source) {
            self.segments = segments;
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::str::FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::parse(s)
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Template::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn scan_segments(input: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = input;
    let mut offset = 0;

    while let Some(mut start) = rest.find(OPEN) {
        // In `{{{a}}}` the placeholder is the innermost `{{a}}`.
        while rest[start + OPEN.len()..].starts_with('{') {
            start += 1;
        }

        let after = &rest[start + OPEN.len()..];
        let end = find_close(after).ok_or(TemplateError::UnclosedPlaceholder {
            offset: offset + start,
        })?;
        let inner = &after[..end];
        let raw = &rest[start..start + OPEN.len() + end + CLOSE.len()];
        let reference =
            parse_reference(inner).map_err(|source| TemplateError::InvalidPlaceholder {
                placeholder: raw.to_string(),
                source,
            })?;

        push_segment(&mut segments, Segment::Literal(rest[..start].to_string()));
        segments.push(Segment::Placeholder(Placeholder {
            raw: raw.to_string(),
            reference,
        }));

        let consumed = start + raw.len();
        offset += consumed;
        rest = &rest[consumed..];
    }

    push_segment(&mut segments, Segment::Literal(rest.to_string()));
    Ok(segments)
}

/// Offset of the `}}` that closes a placeholder. Quoted bracket keys (`["..."]`,
/// `['...']`) are skipped, so they may contain `}}`.
fn find_close(inner: &str) -> Option<usize> {
    let bytes = inner.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'[' && matches!(bytes.get(i + 1), Some(b'"' | b'\'')) => {
                quote = bytes.get(i + 1).copied();
                i += 1;
            }
            None if bytes[i..].starts_with(CLOSE.as_bytes()) => return Some(i),
            None => {}
        }
        i += 1;
    }
    None
}

fn push_segment(out: &mut Vec<Segment>, seg: Segment) {
    match seg {
        Segment::Literal(l) if l.is_empty() => {}
        Segment::Literal(l) => {
            if let Some(Segment::Literal(prev)) = out.last_mut() {
                prev.push_str(&l);
            } else {
                out.push(Segment::Literal(l));
            }
        }
        p => out.push(p),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed placeholder at byte {offset} (missing '}}}}')")]
    UnclosedPlaceholder { offset: usize },
    #[error("invalid placeholder {placeholder}: {source}")]
    InvalidPlaceholder {
        placeholder: String,
        #[source]
        source: ReferenceError,
    },
}
