//! Host-owned settings object.
//!
//! Mirrors the key/value data object a compositing host hands to its
//! filters: every key has an optional user value and an optional default.
//! Reads fall back from the user value to the default, then to a zero
//! value. Only user values are persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{NineSliceError, Result};

/// A single setting value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Double(f64),
}

/// Key/value settings with separate user values and defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, SettingValue>,
    defaults: BTreeMap<String, SettingValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, key: &str) -> Option<SettingValue> {
        self.values
            .get(key)
            .or_else(|| self.defaults.get(key))
            .copied()
    }

    /// Boolean value for `key`, `false` if unset or not a boolean.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.lookup(key) {
            Some(SettingValue::Bool(b)) => b,
            Some(SettingValue::Double(_)) => {
                log::debug!("setting '{key}' is not a bool");
                false
            }
            None => false,
        }
    }

    /// Floating point value for `key`, `0.0` if unset or not a number.
    pub fn get_double(&self, key: &str) -> f64 {
        match self.lookup(key) {
            Some(SettingValue::Double(d)) => d,
            Some(SettingValue::Bool(_)) => {
                log::debug!("setting '{key}' is not a number");
                0.0
            }
            None => 0.0,
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), SettingValue::Bool(value));
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.values
            .insert(key.to_string(), SettingValue::Double(value));
    }

    pub fn set_default_bool(&mut self, key: &str, value: bool) {
        self.defaults
            .insert(key.to_string(), SettingValue::Bool(value));
    }

    pub fn set_default_double(&mut self, key: &str, value: f64) {
        self.defaults
            .insert(key.to_string(), SettingValue::Double(value));
    }

    /// Whether the user explicitly set `key`.
    pub fn has_user_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn has_default(&self, key: &str) -> bool {
        self.defaults.contains_key(key)
    }

    /// Drop the user value for `key`, reverting reads to the default.
    pub fn erase(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Keys that carry a user value, in sorted order.
    pub fn user_keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Apply a `key=value` assignment as a user value.
    ///
    /// `true`/`false` store a boolean, anything else must parse as a finite
    /// number.
    pub fn apply_assignment(&mut self, text: &str) -> Result<()> {
        let Some((key, value)) = text.split_once('=') else {
            return Err(NineSliceError::Settings(format!(
                "expected key=value, got '{text}'"
            )));
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(NineSliceError::Settings(format!("empty key in '{text}'")));
        }
        match value {
            "true" => self.set_bool(key, true),
            "false" => self.set_bool(key, false),
            _ => {
                let number = value
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| {
                        NineSliceError::Settings(format!(
                            "'{key}': '{value}' is not a bool or finite number"
                        ))
                    })?;
                self.set_double(key, number);
            }
        }
        Ok(())
    }

    /// Serialize the user values as a JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.values)?)
    }

    /// Parse user values from a JSON object. Defaults start empty.
    pub fn from_json(json: &str) -> Result<Self> {
        let values: BTreeMap<String, SettingValue> = serde_json::from_str(json)?;
        Ok(Self {
            values,
            defaults: BTreeMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_keys_read_as_zero() {
        let s = Settings::new();
        assert!(!s.get_bool("show_uvs"));
        assert_eq!(s.get_double("border_top"), 0.0);
    }

    #[test]
    fn default_then_user_value() {
        let mut s = Settings::new();
        s.set_default_double("border_top", 8.0);
        assert_eq!(s.get_double("border_top"), 8.0);
        s.set_double("border_top", 12.0);
        assert_eq!(s.get_double("border_top"), 12.0);
        s.erase("border_top");
        assert_eq!(s.get_double("border_top"), 8.0);
    }

    #[test]
    fn type_mismatch_reads_zero() {
        let mut s = Settings::new();
        s.set_bool("output_scale_x", true);
        s.set_double("show_uvs", 1.0);
        assert_eq!(s.get_double("output_scale_x"), 0.0);
        assert!(!s.get_bool("show_uvs"));
    }

    #[test]
    fn user_value_flags() {
        let mut s = Settings::new();
        s.set_default_bool("uniform_scale", true);
        assert!(s.has_default("uniform_scale"));
        assert!(!s.has_user_value("uniform_scale"));
        s.set_bool("uniform_scale", false);
        assert!(s.has_user_value("uniform_scale"));
        assert_eq!(s.user_keys().collect::<Vec<_>>(), vec!["uniform_scale"]);
    }

    #[test]
    fn assignments() {
        let mut s = Settings::new();
        s.apply_assignment("show_uvs=true").unwrap();
        s.apply_assignment(" border_top = 12.5 ").unwrap();
        assert!(s.get_bool("show_uvs"));
        assert_eq!(s.get_double("border_top"), 12.5);

        for bad in [
            "no_equals",
            "=1",
            "border_top=wide",
            "border_top=nan",
            "output_scale_x=inf",
            "output_scale_x=-infinity",
        ] {
            let err = s.apply_assignment(bad).unwrap_err();
            assert!(matches!(err, NineSliceError::Settings(_)), "{bad}");
        }
    }

    #[test]
    fn json_persists_only_user_values() {
        let mut s = Settings::new();
        s.set_default_double("border_left", 8.0);
        s.set_double("border_top", 3.0);
        s.set_bool("show_uvs", true);
        let json = s.to_json().unwrap();
        assert!(json.contains("border_top"));
        assert!(!json.contains("border_left"));

        let restored = Settings::from_json(&json).unwrap();
        assert_eq!(restored.get_double("border_top"), 3.0);
        assert!(restored.get_bool("show_uvs"));
        assert!(!restored.has_default("border_left"));
    }

    #[test]
    fn assigned_settings_reload_from_json() {
        let mut s = Settings::new();
        s.apply_assignment("border_top=1e3").unwrap();
        assert!(s.apply_assignment("border_left=NaN").is_err());
        let restored = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(restored, s);
    }

    #[test]
    fn json_integers_read_as_doubles() {
        let s = Settings::from_json(r#"{"border_top": 8}"#).unwrap();
        assert_eq!(s.get_double("border_top"), 8.0);
    }

    #[test]
    fn json_rejects_strings() {
        assert!(Settings::from_json(r#"{"border_top": "eight"}"#).is_err());
    }
}
