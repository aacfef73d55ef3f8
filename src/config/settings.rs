//! Key/value access to the `janitor` settings section.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use super::CONFIG_SECTION;
use crate::error::{JanitorError, Result};

/// A source of raw setting values, keyed within the `janitor` section.
pub trait Settings: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
}

/// In-memory settings, used for defaults and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }
}

impl Settings for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

/// Typed getters over a [`Settings`] source.
pub struct SettingsReader<'a> {
    settings: &'a dyn Settings,
}

impl<'a> SettingsReader<'a> {
    pub fn new(settings: &'a dyn Settings) -> Self {
        Self { settings }
    }

    /// Read `key`, treating an explicit `null` as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.settings.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                JanitorError::Config(format!("Invalid value for '{CONFIG_SECTION}.{key}': {e}"))
            }),
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get(key)?.unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_fall_back_to_default() {
        let settings = MemorySettings::new().with("showDiff", Value::Null);
        let reader = SettingsReader::new(&settings);

        assert!(!reader.get_or("showDiff", false).unwrap());
        assert!(reader.get_or("closeAfterCleanup", true).unwrap());
    }

    #[test]
    fn test_typed_values_are_deserialized() {
        let settings = MemorySettings::new()
            .with("skipConfirmation", true)
            .with("commands", json!(["a", "b@\\.rs$"]));
        let reader = SettingsReader::new(&settings);

        assert!(reader.get_or("skipConfirmation", false).unwrap());
        let commands: Vec<String> = reader.get_or("commands", Vec::new()).unwrap();
        assert_eq!(commands, vec!["a", "b@\\.rs$"]);
    }

    #[test]
    fn test_wrong_type_is_a_config_error() {
        let settings = MemorySettings::new().with("skipConfirmation", "sometimes");
        let reader = SettingsReader::new(&settings);

        let err = reader.get_or("skipConfirmation", false).unwrap_err();
        assert!(matches!(err, JanitorError::Config(_)));
        assert!(err.to_string().contains("janitor.skipConfirmation"));
    }
}
