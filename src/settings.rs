//! User settings for compiler invocations.
//!
//! Settings are looked up at the moment of each invocation and never cached,
//! so edits to the settings file apply to the next `run` or `compile`.
//!
//! Lookup priority (highest to lowest):
//! 1. Command-line overrides
//! 2. Environment variables (`TCC_RUNNER_FLAGS`, `TCC_RUNNER_ARGS`)
//! 3. The `tcc` section of the settings file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

/// Section of the settings file holding compiler settings.
pub const SETTINGS_SECTION: &str = "tcc";

/// Known setting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Compiler options, placed before the run marker.
    Flags,
    /// Program arguments, placed after the run marker.
    Args,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Flags => "flags",
            SettingKey::Args => "args",
        }
    }

    /// Environment variable overriding this setting.
    pub fn env_var(&self) -> &'static str {
        match self {
            SettingKey::Flags => "TCC_RUNNER_FLAGS",
            SettingKey::Args => "TCC_RUNNER_ARGS",
        }
    }
}

/// Source of user settings.
///
/// `None` means "not set"; callers apply their own fallback.
pub trait Settings {
    fn get(&self, key: SettingKey) -> Option<String>;
}

impl Settings for HashMap<String, String> {
    fn get(&self, key: SettingKey) -> Option<String> {
        HashMap::get(self, key.as_str()).cloned()
    }
}

impl<S: Settings + ?Sized> Settings for &S {
    fn get(&self, key: SettingKey) -> Option<String> {
        (**self).get(key)
    }
}

/// Layered settings backed by an optional JSON file.
#[derive(Debug, Clone, Default)]
pub struct UserSettings {
    overrides: HashMap<SettingKey, String>,
    file: Option<PathBuf>,
    read_env: bool,
}

impl UserSettings {
    /// Settings read from `file` (if any) and the environment.
    pub fn new(file: Option<PathBuf>) -> Self {
        Self {
            overrides: HashMap::new(),
            file,
            read_env: true,
        }
    }

    /// Override a setting for the lifetime of this value.
    pub fn with_override(mut self, key: SettingKey, value: impl Into<String>) -> Self {
        self.overrides.insert(key, value.into());
        self
    }

    /// Ignore environment variables.
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn from_file(&self, key: SettingKey) -> Option<String> {
        let path = self.file.as_ref()?;

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("failed to read settings file {}: {}", path.display(), e);
                return None;
            }
        };

        let root: Value = match serde_json::from_str(&content) {
            Ok(root) => root,
            Err(e) => {
                warn!("failed to parse settings file {}: {}", path.display(), e);
                return None;
            }
        };

        setting_value(&root, key)
    }
}

impl Settings for UserSettings {
    fn get(&self, key: SettingKey) -> Option<String> {
        if let Some(value) = self.overrides.get(&key) {
            return Some(value.clone());
        }

        if self.read_env {
            if let Ok(value) = std::env::var(key.env_var()) {
                return Some(value);
            }
        }

        let value = self.from_file(key);
        if value.is_none() {
            debug!("no {} given, reverting to default", key.as_str());
        }
        value
    }
}

/// Extract `tcc.<key>` from a parsed settings document.
///
/// Missing keys and `null` are "not set". Non-string scalars keep their JSON
/// text, so `"flags": 1` yields `1`.
fn setting_value(root: &Value, key: SettingKey) -> Option<String> {
    match root.get(SETTINGS_SECTION)?.get(key.as_str())? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_setting_value_variants() {
        let root = json!({"tcc": {"flags": "-Wall", "args": null}});
        assert_eq!(setting_value(&root, SettingKey::Flags), Some("-Wall".into()));
        assert_eq!(setting_value(&root, SettingKey::Args), None);

        let root = json!({"tcc": {"flags": 3}});
        assert_eq!(setting_value(&root, SettingKey::Flags), Some("3".into()));
        assert_eq!(setting_value(&root, SettingKey::Args), None);

        assert_eq!(setting_value(&json!({}), SettingKey::Flags), None);
    }

    #[test]
    fn test_file_settings() {
        let file = settings_file(r#"{"tcc": {"flags": "-Wall", "args": "-o out"}}"#);
        let settings = UserSettings::new(Some(file.path().to_path_buf())).without_env();

        assert_eq!(settings.get(SettingKey::Flags), Some("-Wall".into()));
        assert_eq!(settings.get(SettingKey::Args), Some("-o out".into()));
    }

    #[test]
    fn test_file_reread_each_lookup() {
        let file = settings_file(r#"{"tcc": {"flags": "-O1"}}"#);
        let settings = UserSettings::new(Some(file.path().to_path_buf())).without_env();
        assert_eq!(settings.get(SettingKey::Flags), Some("-O1".into()));

        std::fs::write(file.path(), r#"{"tcc": {"flags": "-O2"}}"#).unwrap();
        assert_eq!(settings.get(SettingKey::Flags), Some("-O2".into()));
    }

    #[test]
    fn test_malformed_file_is_absent() {
        let file = settings_file("{ not json");
        let settings = UserSettings::new(Some(file.path().to_path_buf())).without_env();
        assert_eq!(settings.get(SettingKey::Flags), None);
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let settings = UserSettings::new(Some(dir.path().join("missing.json"))).without_env();
        assert_eq!(settings.get(SettingKey::Args), None);
    }

    #[test]
    fn test_override_beats_file() {
        let file = settings_file(r#"{"tcc": {"flags": "-Wall"}}"#);
        let settings = UserSettings::new(Some(file.path().to_path_buf()))
            .without_env()
            .with_override(SettingKey::Flags, "-g");

        assert_eq!(settings.get(SettingKey::Flags), Some("-g".into()));
    }

    #[test]
    fn test_hashmap_settings() {
        let mut map = HashMap::new();
        map.insert("args".to_string(), "a b".to_string());

        assert_eq!(Settings::get(&map, SettingKey::Args), Some("a b".into()));
        assert_eq!(Settings::get(&map, SettingKey::Flags), None);
    }

    #[test]
    fn test_env_layering() {
        let _guard = crate::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let file = settings_file(r#"{"tcc": {"flags": "-Wall", "args": "-o file"}}"#);

        std::env::set_var("TCC_RUNNER_FLAGS", "-O2");
        std::env::set_var("TCC_RUNNER_ARGS", "-o env");
        let settings = UserSettings::new(Some(file.path().to_path_buf()))
            .with_override(SettingKey::Args, "-o cli");

        // Environment beats the file, an override beats the environment.
        assert_eq!(settings.get(SettingKey::Flags), Some("-O2".into()));
        assert_eq!(settings.get(SettingKey::Args), Some("-o cli".into()));
        // Opting out of the environment falls through to the file.
        let file_only = settings.clone().without_env();
        assert_eq!(file_only.get(SettingKey::Flags), Some("-Wall".into()));

        std::env::remove_var("TCC_RUNNER_FLAGS");
        std::env::remove_var("TCC_RUNNER_ARGS");
        assert_eq!(settings.get(SettingKey::Flags), Some("-Wall".into()));
    }
}
