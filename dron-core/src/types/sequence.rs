use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::types::{History, Param, Step};

/// An ordered list of steps plus sequence-wide params and the history of the last run.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Sequence {
    /// Execution order. Entries may be empty (a `null` in the source document);
    /// the runner reports those rather than dropping them.
    #[serde(default, deserialize_with = "deserialize_order")]
    pub order: Vec<String>,

    #[serde(default, with = "step_list")]
    pub steps: BTreeMap<String, Step>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,

    /// Step currently selected in an editor. Carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,

    #[serde(default, skip_serializing_if = "History::is_empty")]
    pub history: History,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step and appends its id to `order`.
    pub fn with_step(mut self, step: Step) -> Self {
        self.order.push(step.id.clone());
        self.steps.insert(step.id.clone(), step);
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn find_step(&self, id: &str) -> Option<&Step> {
        self.steps.get(id)
    }

    pub fn find_step_mut(&mut self, id: &str) -> Option<&mut Step> {
        self.steps.get_mut(id)
    }

    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.key == key)
    }

    /// Prepares for a fresh run: responses cleared, templates back to their authored
    /// text, and a new empty history.
    pub fn reset_for_run(&mut self) {
        for step in self.steps.values_mut() {
            step.reset();
        }
        for param in &mut self.params {
            param.value.reset();
        }
        self.history = History::new();
    }
}

fn deserialize_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.into_iter().map(Option::unwrap_or_default).collect())
}

/// Steps are written as a list of step objects and keyed by `id` in memory.
mod step_list {
    use std::collections::BTreeMap;

    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::Step;

    pub fn serialize<S: Serializer>(
        steps: &BTreeMap<String, Step>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(steps.len()))?;
        for step in steps.values() {
            seq.serialize_element(step)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Step>, D::Error> {
        let list = Option::<Vec<Step>>::deserialize(deserializer)?.unwrap_or_default();
        let mut out = BTreeMap::new();
        for step in list {
            let id = step.id.clone();
            if out.insert(id.clone(), step).is_some() {
                return Err(serde::de::Error::custom(format!("duplicate step id `{id}`")));
            }
        }
        Ok(out)
    }
}
