//! Template variable sets and their merge rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utilities::errors::ConfigError;

/// Key every variable set carries for the crew's main subject.
pub const TOPIC_KEY: &str = "topic";

/// Mapping from placeholder name to substitution value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSet(BTreeMap<String, String>);

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from JSON object entries, coercing non-string values to their JSON text.
    pub fn from_json_entries<'a>(entries: impl IntoIterator<Item = (&'a String, &'a Value)>) -> Self {
        entries
            .into_iter()
            .map(|(key, value)| (key.clone(), json_to_text(value)))
            .collect()
    }

    /// Parse JSON text that must hold an object.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self::from_json_entries(&map)),
            other => Err(ConfigError::VariablesNotAnObject {
                found: json_kind(&other),
            }),
        }
    }

    /// Merge the variables of a single kickoff call.
    ///
    /// `topic` is the base entry, `explicit` values overlay it (and may replace
    /// the topic), then `process_wide` fills only the keys still absent.
    pub fn for_call(topic: &str, explicit: &VariableSet, process_wide: &VariableSet) -> Self {
        let mut merged = VariableSet::new();
        merged.insert(TOPIC_KEY, topic);
        merged.extend_from(explicit);
        for (key, value) in process_wide.iter() {
            if !merged.contains_key(key) {
                merged.insert(key, value);
            }
        }
        merged
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Overlay `other` onto `self`; keys of `other` win.
    pub fn extend_from(&mut self, other: &VariableSet) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize as a JSON object string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl FromIterator<(String, String)> for VariableSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        VariableSet(iter.into_iter().collect())
    }
}

fn json_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
