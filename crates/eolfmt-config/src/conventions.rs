use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the convention selecting the line terminator style.
pub const END_OF_LINE_KEY: &str = "end_of_line";

/// The coding conventions resolved for a single document.
///
/// Resolution (which `.editorconfig` sections or config files apply to a path) happens elsewhere;
/// a snapshot is just the resulting key/value pairs. Keys are case-insensitive. Values are trimmed
/// and lower-cased on insertion, matching editorconfig semantics for the well-known properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ConventionValue>",
    into = "BTreeMap<String, String>"
)]
pub struct ConventionsSnapshot {
    values: BTreeMap<String, String>,
}

impl ConventionsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: &str) -> Option<String> {
        self.values
            .insert(normalize_key(key), value.trim().to_ascii_lowercase())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(&normalize_key(key))
    }

    /// Look up a convention value. `None` means the convention is not configured at all.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

/// A convention value as written in a config file.
///
/// Editorconfig properties are strings, but TOML users write `indent_size = 4` and
/// `insert_final_newline = true`; those are stored in their string form.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
enum ConventionValue {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
}

impl ConventionValue {
    fn into_string(self) -> String {
        match self {
            ConventionValue::String(value) => value,
            ConventionValue::Bool(value) => value.to_string(),
            ConventionValue::Integer(value) => value.to_string(),
            ConventionValue::Float(value) => value.to_string(),
        }
    }
}

impl From<BTreeMap<String, ConventionValue>> for ConventionsSnapshot {
    fn from(values: BTreeMap<String, ConventionValue>) -> Self {
        values
            .into_iter()
            .fold(Self::new(), |snapshot, (key, value)| {
                snapshot.with(&key, &value.into_string())
            })
    }
}

impl From<ConventionsSnapshot> for BTreeMap<String, String> {
    fn from(snapshot: ConventionsSnapshot) -> Self {
        snapshot.values
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ConventionsSnapshot {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |snapshot, (key, value)| snapshot.with(key, value))
    }
}
