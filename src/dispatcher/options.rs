use crate::pattern::CompileOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// How repeated registrations of an identical compiled pattern are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RegistrationMode {
    /// Every registration call becomes its own rule, in call order.
    #[default]
    Independent,
    /// Handlers join the first rule whose compiled pattern is identical.
    MergeIdentical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DispatcherOptions {
    /// Copied into every context before any handler runs.
    pub mixins: Map<String, Value>,
    /// Trailing delimiters must match exactly.
    pub strict: bool,
    pub case_sensitive: bool,
    /// Constructing with a key already in use returns the existing dispatcher.
    pub instance_key: Option<String>,
    pub registration: RegistrationMode,
}

impl DispatcherOptions {
    pub fn builder() -> DispatcherOptionsBuilder {
        DispatcherOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self
            .instance_key
            .as_ref()
            .is_some_and(|key| key.trim().is_empty())
        {
            return Err(OptionsError::EmptyInstanceKey);
        }
        Ok(())
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            case_sensitive: self.case_sensitive,
            strict: self.strict,
        }
    }

    /// The key used for instance caching; a blank key counts as none.
    pub(crate) fn cache_key(&self) -> Option<&str> {
        self.instance_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Default, Clone)]
pub struct DispatcherOptionsBuilder {
    options: DispatcherOptions,
    mixins: Option<Value>,
}

impl DispatcherOptionsBuilder {
    /// Replaces all mixins. Must be a JSON object; checked by [`build`](Self::build).
    pub fn mixins(mut self, mixins: Value) -> Self {
        self.mixins = Some(mixins);
        self
    }

    pub fn mixin<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.options.mixins.insert(key.into(), value.into());
        self
    }

    pub fn strict(mut self, value: bool) -> Self {
        self.options.strict = value;
        self
    }

    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.options.case_sensitive = value;
        self
    }

    pub fn instance_key<S: Into<String>>(mut self, key: S) -> Self {
        self.options.instance_key = Some(key.into());
        self
    }

    pub fn registration(mut self, mode: RegistrationMode) -> Self {
        self.options.registration = mode;
        self
    }

    pub fn build(self) -> Result<DispatcherOptions, OptionsError> {
        let mut options = self.options;

        match self.mixins {
            None => {}
            Some(Value::Object(mut map)) => {
                map.extend(std::mem::take(&mut options.mixins));
                options.mixins = map;
            }
            Some(other) => {
                return Err(OptionsError::MixinsNotObject {
                    found: json_kind(&other),
                });
            }
        }

        options.validate()?;
        Ok(options)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("mixins must be a JSON object (got {found})")]
    MixinsNotObject { found: &'static str },
    #[error("instance key must not be blank")]
    EmptyInstanceKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_loose_and_unkeyed() {
        let options = DispatcherOptions::default();
        assert!(options.mixins.is_empty());
        assert!(!options.strict);
        assert!(!options.case_sensitive);
        assert_eq!(options.instance_key, None);
        assert_eq!(options.registration, RegistrationMode::Independent);
    }

    #[test]
    fn single_mixins_override_the_bulk_object() {
        let options = DispatcherOptions::builder()
            .mixin("b", 2)
            .mixins(json!({ "a": 1, "b": 1 }))
            .build()
            .unwrap();
        assert_eq!(Value::Object(options.mixins), json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn non_object_mixins_are_rejected() {
        let err = DispatcherOptions::builder()
            .mixins(json!([1, 2]))
            .build()
            .unwrap_err();
        assert_eq!(err, OptionsError::MixinsNotObject { found: "array" });
    }

    #[test]
    fn blank_instance_key_is_rejected() {
        let err = DispatcherOptions::builder()
            .instance_key("   ")
            .build()
            .unwrap_err();
        assert_eq!(err, OptionsError::EmptyInstanceKey);
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let options: DispatcherOptions =
            serde_json::from_value(json!({ "strict": true, "instance_key": "main" })).unwrap();
        assert!(options.strict);
        assert!(!options.case_sensitive);
        assert_eq!(options.cache_key(), Some("main"));
    }

    #[test]
    fn empty_instance_key_counts_as_none() {
        let options = DispatcherOptions {
            instance_key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(options.cache_key(), None);
    }

    #[test]
    fn blank_instance_key_counts_as_none() {
        let options = DispatcherOptions {
            instance_key: Some(" \t ".to_string()),
            ..Default::default()
        };
        assert_eq!(options.cache_key(), None);
        assert_eq!(options.validate(), Err(OptionsError::EmptyInstanceKey));
    }
}
