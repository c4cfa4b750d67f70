//! Persistent settings, stored at `~/.config/datkit/settings.toml`.
//!
//! Every field is optional in the file; missing ones take their defaults.
//! Command-line flags override whatever is loaded here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bucket::BucketKey;
use crate::dedupe::{DedupeOptions, DedupeScope, default_workers};
use crate::error::SettingsError;

/// Canonical path to the settings file: `~/.config/datkit/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("datkit").join("settings.toml")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dedupe: DedupeSettings,
}

/// The `[dedupe]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupeSettings {
    pub key: BucketKey,
    pub scope: DedupeScope,
    /// Worker count; one per core when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    pub soft_delete: bool,
    pub resolve_names: bool,
}

impl Default for DedupeSettings {
    fn default() -> Self {
        Self {
            key: BucketKey::default(),
            scope: DedupeScope::default(),
            workers: None,
            soft_delete: false,
            resolve_names: true,
        }
    }
}

impl DedupeSettings {
    pub fn to_options(&self) -> DedupeOptions {
        DedupeOptions {
            key: self.key,
            scope: self.scope,
            workers: self.workers.unwrap_or_else(default_workers).max(1),
            soft_delete: self.soft_delete,
            resolve_names: self.resolve_names,
        }
    }
}

/// Keys accepted by [`set_value`].
pub const SETTING_KEYS: &[&str] = &[
    "dedupe.key",
    "dedupe.scope",
    "dedupe.workers",
    "dedupe.soft_delete",
    "dedupe.resolve_names",
];

impl Settings {
    /// Load from [`settings_path`]. A missing file yields the defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(toml::from_str(&contents)?)
    }
}

/// Update one setting in [`settings_path`].
pub fn set_value(key: &str, value: &str) -> Result<(), SettingsError> {
    set_value_at(&settings_path(), key, value)
}

/// Update one setting in the file at `path`.
///
/// The value is validated against its field, then written with a
/// `toml::Value` edit so unrelated tables in the file are preserved.
pub fn set_value_at(path: &Path, key: &str, value: &str) -> Result<(), SettingsError> {
    let (table_name, field) = key
        .split_once('.')
        .filter(|_| SETTING_KEYS.contains(&key))
        .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
    let parsed = parse_setting(key, field, value)?;

    let mut doc: toml::Value = match std::fs::read_to_string(path) {
        Ok(contents) => contents.parse()?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            toml::Value::Table(Default::default())
        }
        Err(e) => return Err(e.into()),
    };

    let root = doc
        .as_table_mut()
        .ok_or_else(|| SettingsError::invalid_value(key, "settings root is not a table"))?;
    let table = root
        .entry(table_name)
        .or_insert_with(|| toml::Value::Table(Default::default()))
        .as_table_mut()
        .ok_or_else(|| SettingsError::invalid_value(key, format!("[{table_name}] is not a table")))?;
    table.insert(field.to_string(), parsed);

    // Reject a file that would no longer load
    let serialized = toml::to_string_pretty(&doc)?;
    toml::from_str::<Settings>(&serialized)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;
    log::debug!("Set {key} = {value} in {}", path.display());
    Ok(())
}

fn parse_setting(key: &str, field: &str, value: &str) -> Result<toml::Value, SettingsError> {
    let invalid = |e: &dyn std::fmt::Display| SettingsError::invalid_value(key, e.to_string());
    Ok(match field {
        "key" => {
            let k: BucketKey = value.parse().map_err(|e| invalid(&e))?;
            toml::Value::String(k.name().to_string())
        }
        "scope" => {
            let s: DedupeScope = value.parse().map_err(|e| invalid(&e))?;
            toml::Value::String(s.to_string())
        }
        "workers" => {
            let n: i64 = value.trim().parse().map_err(|e| invalid(&e))?;
            if n < 1 {
                return Err(SettingsError::invalid_value(key, "must be at least 1"));
            }
            toml::Value::Integer(n)
        }
        _ => {
            let b: bool = value.trim().parse().map_err(|e| invalid(&e))?;
            toml::Value::Boolean(b)
        }
    })
}

/// Load the settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.dedupe.resolve_names);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[dedupe]\nkey = \"sha1\"\nworkers = 3\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.dedupe.key, BucketKey::Sha1);
        assert_eq!(settings.dedupe.scope, DedupeScope::Full);

        let options = settings.dedupe.to_options();
        assert_eq!(options.workers, 3);
        assert!(options.resolve_names);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[dedupe]\nkey = \"bogus\"\n").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_set_value_preserves_other_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[other]\nkeep = 1\n").unwrap();

        set_value_at(&path, "dedupe.scope", "Machine").unwrap();
        set_value_at(&path, "dedupe.soft_delete", "true").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.dedupe.scope, DedupeScope::Machine);
        assert!(settings.dedupe.soft_delete);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("keep = 1"));
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        assert!(matches!(
            set_value_at(&path, "dedupe.colour", "red"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            set_value_at(&path, "dedupe.workers", "0"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_value_at(&path, "dedupe.key", "sha3"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(!path.exists());
    }
}
