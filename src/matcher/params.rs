use crate::pattern::ParamSpec;
use crate::types::CaptureValues;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Parameters bound from one successful match, in capture order.
///
/// A key whose group did not take part in the match is present with no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: SmallVec<[(String, Option<String>); 4]>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object view; absent values become `null`.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| {
                let value = v.as_ref().map_or(Value::Null, |v| Value::String(v.clone()));
                (k.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Pairs each capture slot with the key at the same position in `spec`.
#[tracing::instrument(level = "trace", skip_all, fields(keys = spec.len() as u64))]
pub fn bind(captures: &CaptureValues, spec: &ParamSpec) -> Params {
    let mut params = Params::new();
    for (i, key) in spec.keys().iter().enumerate() {
        let value = captures.get(i).cloned().flatten();
        params.insert(key.to_string(), value);
    }
    params
}
