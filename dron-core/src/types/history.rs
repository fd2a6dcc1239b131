use chrono::{DateTime, Utc};

use crate::types::{HttpMethod, Step};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

/// A step as it was sent, captured right after it completed.
///
/// Every field is an owned copy of the rendered value, so later changes to the live
/// step never reach a recorded entry. Methods that carry no body record an empty one.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    pub step_id: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderPair>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(default)]
    pub response: String,
    pub executed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn snapshot(step: &Step) -> Self {
        Self {
            step_id: step.id.clone(),
            method: step.method.clone(),
            url: step.url.render(),
            headers: step
                .headers
                .iter()
                .map(|h| HeaderPair {
                    name: h.name.clone(),
                    value: h.value.render(),
                })
                .collect(),
            body: if step.method.allows_body() {
                step.body.render()
            } else {
                String::new()
            },
            response: step.response.clone(),
            executed_at: Utc::now(),
        }
    }
}

/// Append-only record of the steps executed in one run, in execution order.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.step_id.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
