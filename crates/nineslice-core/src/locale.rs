//! Localized UI strings.
//!
//! Locale files are INI-style, one `Key="Value"` pair per line:
//!
//! ```ini
//! # comment
//! NineSlice.Name="9-Slice"
//! ```
//!
//! Lookups of unknown keys return the key itself so a missing translation
//! is visible in the UI instead of blank.

use std::collections::HashMap;

/// Embedded default (en-US) table.
const EN_US: &str = include_str!("../../../data/locale/en-US.ini");

/// A parsed locale table.
#[derive(Debug, Clone, Default)]
pub struct Locale {
    strings: HashMap<String, String>,
}

impl Locale {
    /// The built-in en-US strings.
    pub fn en_us() -> Self {
        Self::parse(EN_US)
    }

    /// Parse locale text. Malformed lines are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut strings = HashMap::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("locale line {}: missing '='", lineno + 1);
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                log::warn!("locale line {}: empty key", lineno + 1);
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            strings.insert(key.to_string(), value.to_string());
        }
        Self { strings }
    }

    /// Translated text for `key`, or the key itself if untranslated.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.strings.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
