// Settings store: a small JSON object on disk holding values that should
// survive between invocations (currently only the default API key).
//
// The file is read lazily, at most once per `Settings` instance, and the
// whole mapping is written back after every `set`.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the default API key is stored.
pub const DEFAULT_API_KEY: &str = "default-api-key";

/// Suffix appended to the settings path for the temporary file used while
/// writing.
const TEMP_SUFFIX: &str = "~";

/// File-backed key/value mapping.
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    values: Option<Map<String, Value>>,
}

impl Settings {
    /// Create a store backed by `path`. Nothing is read until the first
    /// access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Settings {
            path: path.into(),
            values: None,
        }
    }

    /// Settings file at the conventional per-user location,
    /// `~/opt/etc/prowl.json`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine the home directory")?;
        Ok(home.join("opt").join("etc").join("prowl.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the value stored under `key`, or `default` if it is absent.
    pub fn get(&mut self, key: &str, default: Value) -> Result<Value> {
        Ok(self.values()?.get(key).cloned().unwrap_or(default))
    }

    /// Store `value` under `key` and persist the whole mapping.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values()?.insert(key.to_string(), value);
        self.save()
    }

    fn values(&mut self) -> Result<&mut Map<String, Value>> {
        let values = match self.values.take() {
            Some(values) => values,
            None => load(&self.path)?,
        };
        Ok(self.values.insert(values))
    }

    fn save(&self) -> Result<()> {
        let Some(values) = &self.values else {
            return Ok(());
        };
        let data = serde_json::to_vec(values).context("Failed to serialize settings")?;
        write_atomic(&self.path, &data)?;
        tracing::debug!(path = %self.path.display(), "settings written");
        Ok(())
    }
}

fn load(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, starting empty");
        return Ok(Map::new());
    }
    let data = fs::read(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let value: Value = serde_json::from_slice(&data)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
    let Value::Object(map) = value else {
        bail!("Settings file {} does not contain a JSON object", path.display());
    };
    tracing::debug!(path = %path.display(), keys = map.len(), "settings loaded");
    Ok(map)
}

/// Write `data` to a sibling temporary file, then rename it over `path` so
/// readers only ever see the old or the new content.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let temp_path = temp_path(path);
    fs::write(&temp_path, data)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    fs::rename(&temp_path, path).with_context(|| {
        format!("Failed to move {} to {}", temp_path.display(), path.display())
    })?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> Settings {
        Settings::new(dir.path().join("opt/etc/prowl.json"))
    }

    #[test]
    fn missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let mut settings = store_in(&dir);

        let value = settings.get(DEFAULT_API_KEY, Value::Null).unwrap();
        assert_eq!(value, Value::Null);
        assert_eq!(settings.get("other", json!("fallback")).unwrap(), json!("fallback"));
        assert!(!settings.path().exists());
    }

    #[test]
    fn set_then_get_in_same_store() {
        let dir = TempDir::new().unwrap();
        let mut settings = store_in(&dir);
        let key = "0123456789abcdef0123456789abcdef01234567";

        settings.set(DEFAULT_API_KEY, json!(key)).unwrap();

        assert_eq!(settings.get(DEFAULT_API_KEY, Value::Null).unwrap(), json!(key));
    }

    #[test]
    fn set_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let key = "0123456789abcdef0123456789abcdef01234567";

        store_in(&dir).set(DEFAULT_API_KEY, json!(key)).unwrap();

        let mut reloaded = store_in(&dir);
        assert_eq!(reloaded.get(DEFAULT_API_KEY, Value::Null).unwrap(), json!(key));

        let on_disk: Value =
            serde_json::from_slice(&fs::read(reloaded.path()).unwrap()).unwrap();
        assert_eq!(on_disk, json!({ DEFAULT_API_KEY: key }));
    }

    #[test]
    fn set_keeps_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prowl.json");
        fs::write(&path, r#"{"other": [1, 2]}"#).unwrap();

        let mut settings = Settings::new(&path);
        settings.set(DEFAULT_API_KEY, json!("x")).unwrap();

        let on_disk: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json!({ "other": [1, 2], DEFAULT_API_KEY: "x" }));
    }

    #[test]
    fn file_is_loaded_only_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prowl.json");
        fs::write(&path, r#"{"a": 1}"#).unwrap();

        let mut settings = Settings::new(&path);
        assert_eq!(settings.get("a", Value::Null).unwrap(), json!(1));

        fs::write(&path, r#"{"a": 2}"#).unwrap();
        assert_eq!(settings.get("a", Value::Null).unwrap(), json!(1));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prowl.json");
        fs::write(&path, "{not json").unwrap();

        let err = Settings::new(&path).get("a", Value::Null).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }

    #[test]
    fn non_object_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prowl.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = Settings::new(&path).get("a", Value::Null).unwrap_err();
        assert!(err.to_string().contains("does not contain a JSON object"));
    }

    #[test]
    fn failed_set_leaves_previous_file_intact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prowl.json");
        let before = r#"{"default-api-key":"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}"#;
        fs::write(&path, before).unwrap();

        // A directory in place of the temporary file makes the write fail
        // before the rename.
        fs::create_dir(temp_path(&path)).unwrap();

        let mut settings = Settings::new(&path);
        assert!(settings.set(DEFAULT_API_KEY, json!("b")).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn stale_temp_file_does_not_affect_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prowl.json");
        fs::write(&path, r#"{"a":1}"#).unwrap();
        // Leftover from a write that died before its rename.
        fs::write(temp_path(&path), "{\"a\":").unwrap();

        let mut settings = Settings::new(&path);
        assert_eq!(settings.get("a", Value::Null).unwrap(), json!(1));

        settings.set("a", json!(2)).unwrap();
        let on_disk: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json!({ "a": 2 }));
        assert!(!temp_path(&path).exists());
    }
}
