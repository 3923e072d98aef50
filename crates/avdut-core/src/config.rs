//! Read-only settings store
//!
//! Service credentials and IDs the harness needs (TuneIn partner ID, TIDAL
//! and Qobuz client IDs) live in one TOML settings file, loaded exactly
//! once. Nested tables flatten to dotted keys, so
//!
//! ```toml
//! [tunein]
//! partnerid = "abc123"
//! ```
//!
//! is read back as `tunein.partnerid`. The store exposes no write
//! operations and performs file I/O only at load time, so it is safe to
//! share across any number of readers.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{HarnessError, Result};

/// Process-wide read access to named configuration values.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    values: HashMap<String, String>,
}

impl ConfigStore {
    /// Load the settings file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading settings file");
        Self::from_toml_str(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let root: toml::Value =
            toml::from_str(content).map_err(|e| HarnessError::ConfigParse(e.to_string()))?;

        let mut values = HashMap::new();
        flatten("", &root, &mut values);
        tracing::debug!(keys = values.len(), "Settings loaded");
        Ok(Self { values })
    }

    /// Look up a dotted key, e.g. `tunein.partnerid`.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| HarnessError::ConfigKeyNotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn flatten(prefix: &str, value: &toml::Value, out: &mut HashMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let dotted = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&dotted, child, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        toml::Value::Integer(i) => {
            out.insert(prefix.to_string(), i.to_string());
        }
        toml::Value::Float(f) => {
            out.insert(prefix.to_string(), f.to_string());
        }
        toml::Value::Boolean(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        other => {
            // Arrays and datetimes have no dotted-key scalar form
            tracing::debug!(key = %prefix, kind = other.type_str(), "Skipping non-scalar setting");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"
[tunein]
partnerid = "abc123"

[tidal]
id = "xyz"

[qobuz]
id = "q1"
secret = "s1"

[player]
retries = 3
verbose = true
"#;

    #[test]
    fn nested_tables_flatten_to_dotted_keys() {
        let store = ConfigStore::from_toml_str(SETTINGS).unwrap();
        assert_eq!(store.get("tunein.partnerid").unwrap(), "abc123");
        assert_eq!(store.get("tidal.id").unwrap(), "xyz");
        assert_eq!(store.get("qobuz.id").unwrap(), "q1");
        assert_eq!(store.get("qobuz.secret").unwrap(), "s1");
    }

    #[test]
    fn non_string_scalars_stringify() {
        let store = ConfigStore::from_toml_str(SETTINGS).unwrap();
        assert_eq!(store.get("player.retries").unwrap(), "3");
        assert_eq!(store.get("player.verbose").unwrap(), "true");
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let store = ConfigStore::from_toml_str(SETTINGS).unwrap();
        match store.get("spotify.id") {
            Err(HarnessError::ConfigKeyNotFound(key)) => assert_eq!(key, "spotify.id"),
            other => panic!("expected ConfigKeyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        match ConfigStore::from_toml_str("tunein = {") {
            Err(HarnessError::ConfigParse(_)) => {}
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn top_level_dotted_keys_work_too() {
        let store = ConfigStore::from_toml_str("\"tunein.partnerid\" = \"p\"").unwrap();
        assert_eq!(store.get("tunein.partnerid").unwrap(), "p");
    }
}
