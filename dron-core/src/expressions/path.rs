use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_$\-]+$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A dot/bracket path into a JSON document, e.g. `.data.items[0]["x-id"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValuePath {
    segments: Vec<PathSegment>,
}

impl ValuePath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn parse(input: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut chars = input.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    let mut name = String::new();
                    while let Some(&c) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        name.push(c);
                        chars.next();
                    }
                    if name.is_empty() {
                        return Err(PathError::EmptySegment);
                    }
                    if !NAME_RE.is_match(&name) {
                        return Err(PathError::InvalidName(name));
                    }
                    segments.push(PathSegment::Key(name));
                }
                '[' => match chars.peek() {
                    Some(&quote @ ('"' | '\'')) => {
                        chars.next();
                        let mut key = String::new();
                        let mut closed = false;
                        while let Some(c) = chars.next() {
                            if c == '\\' {
                                match chars.next() {
                                    Some(escaped) => key.push(escaped),
                                    None => break,
                                }
                            } else if c == quote {
                                closed = true;
                                break;
                            } else {
                                key.push(c);
                            }
                        }
                        if !closed {
                            return Err(PathError::UnterminatedQuote);
                        }
                        if chars.next() != Some(']') {
                            return Err(PathError::UnclosedBracket);
                        }
                        segments.push(PathSegment::Key(key));
                    }
                    _ => {
                        let mut digits = String::new();
                        let mut closed = false;
                        for c in chars.by_ref() {
                            if c == ']' {
                                closed = true;
                                break;
                            }
                            digits.push(c);
                        }
                        if !closed {
                            return Err(PathError::UnclosedBracket);
                        }
                        let index = digits
                            .trim()
                            .parse::<usize>()
                            .map_err(|_| PathError::InvalidIndex(digits.clone()))?;
                        segments.push(PathSegment::Index(index));
                    }
                },
                other => return Err(PathError::UnexpectedChar(other)),
            }
        }

        Ok(Self { segments })
    }

    pub fn evaluate<'v>(&self, root: &'v JsonValue) -> Result<&'v JsonValue, PathError> {
        let mut cur = root;
        for (depth, seg) in self.segments.iter().enumerate() {
            let next = match (seg, cur) {
                (PathSegment::Key(k), JsonValue::Object(map)) => map.get(k),
                (PathSegment::Key(k), JsonValue::Array(arr)) => {
                    k.parse::<usize>().ok().and_then(|i| arr.get(i))
                }
                (PathSegment::Index(i), JsonValue::Array(arr)) => arr.get(*i),
                _ => None,
            };
            cur = next.ok_or_else(|| PathError::NotFound {
                at: render_segments(&self.segments[..=depth]),
            })?;
        }
        Ok(cur)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_segments(&self.segments))
    }
}

fn render_segments(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg {
            PathSegment::Key(k) if NAME_RE.is_match(k) => {
                out.push('.');
                out.push_str(k);
            }
            PathSegment::Key(k) => {
                out.push_str("[\"");
                out.push_str(&k.replace('\\', "\\\\").replace('"', "\\\""));
                out.push_str("\"]");
            }
            PathSegment::Index(i) => out.push_str(&format!("[{i}]")),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path segment must not be empty")]
    EmptySegment,
    #[error("invalid path segment: {0}")]
    InvalidName(String),
    #[error("invalid array index: {0}")]
    InvalidIndex(String),
    #[error("missing ']' in path")]
    UnclosedBracket,
    #[error("unterminated quoted key in path")]
    UnterminatedQuote,
    #[error("unexpected character '{0}' in path")]
    UnexpectedChar(char),
    #[error("no value at {at}")]
    NotFound { at: String },
}
