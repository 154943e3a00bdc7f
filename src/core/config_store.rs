//! Load, validate, and atomically persist the ZIVPN configuration document.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::core::paths::ZimanPaths;
use crate::error::{Result, ZimanError};
use crate::models::config_doc::ConfigDocument;
use crate::models::status::ConfigMetadata;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl ConfigStore {
    pub fn new(paths: &ZimanPaths) -> Self {
        Self {
            path: paths.config.clone(),
            lock_path: paths.lock.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hold the advisory lock for a read-modify-write cycle.
    pub fn lock(&self) -> Result<FileLock> {
        let lock = FileLock::exclusive(&self.lock_path)?;
        tracing::debug!(lock = %self.lock_path.display(), "config lock acquired");
        Ok(lock)
    }

    pub fn load(&self) -> Result<ConfigDocument> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ZimanError::from_io("read", &self.path, e))?;
        let doc: ConfigDocument =
            serde_json::from_str(&content).map_err(|source| ZimanError::Parse {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(
            path = %self.path.display(),
            credentials = doc.credentials().len(),
            "config loaded"
        );
        Ok(doc)
    }

    /// Write through a temp file in the same directory, then rename over the
    /// target so readers never see a partial document.
    pub fn save(&self, doc: &ConfigDocument) -> Result<()> {
        let content = render(doc).map_err(|source| ZimanError::Parse {
            path: self.path.clone(),
            source,
        })?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::Builder::new()
            .prefix(".config-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| ZimanError::from_io("create temp file in", dir, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| ZimanError::from_io("write", tmp.path(), e))?;

        #[cfg(unix)]
        {
            let mode = fs::metadata(&self.path)
                .map(|m| m.permissions().mode() & 0o777)
                .unwrap_or(constants::CONFIG_FILE_MODE);
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(mode))
                .map_err(|e| ZimanError::from_io("set permissions on", tmp.path(), e))?;
        }

        tmp.persist(&self.path)
            .map_err(|err| ZimanError::from_io("replace", &self.path, err.error))?;
        tracing::debug!(
            path = %self.path.display(),
            credentials = doc.credentials().len(),
            "config saved"
        );
        Ok(())
    }

    pub fn metadata(&self) -> Result<ConfigMetadata> {
        let doc = self.load()?;
        self.metadata_of(&doc)
    }

    /// File facts for a document already loaded from this store.
    pub fn metadata_of(&self, doc: &ConfigDocument) -> Result<ConfigMetadata> {
        let meta =
            fs::metadata(&self.path).map_err(|e| ZimanError::from_io("stat", &self.path, e))?;
        Ok(ConfigMetadata {
            path: self.path.clone(),
            size_bytes: meta.len(),
            last_modified: meta.modified().ok(),
            top_level_keys: doc.top_level_keys(),
        })
    }
}

/// Pretty JSON with two-space indentation and a trailing newline.
fn render(doc: &ConfigDocument) -> std::result::Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(constants::CONFIG_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "listen": ":5667",
  "cert": "/etc/zivpn/zivpn.crt",
  "obfs": "zivpn",
  "server": {"port": 5667, "protocol": "udp", "tuning": {"recv_window": 8388608}},
  "auth": {"method": "passwords", "config": ["alpha", "beta"], "note": "keep me"}
}"#;

    fn store_with(content: Option<&str>) -> (TempDir, ConfigStore) {
        let dir = TempDir::new().unwrap();
        let paths = ZimanPaths::for_config(dir.path().join("config.json"));
        if let Some(content) = content {
            fs::write(&paths.config, content).unwrap();
        }
        (dir, ConfigStore::new(&paths))
    }

    #[test]
    fn test_round_trip_preserves_unknown_keys() {
        let (_dir, store) = store_with(Some(SAMPLE));
        let doc = store.load().unwrap();
        store.save(&doc).unwrap();
        let again = store.load().unwrap();
        assert_eq!(doc, again);

        let on_disk: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let original: Value = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(on_disk, original);
    }

    #[test]
    fn test_save_uses_two_space_indent() {
        let (_dir, store) = store_with(Some(r#"{"auth":{"config":["a"]}}"#));
        let doc = store.load().unwrap();
        store.save(&doc).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "{\n  \"auth\": {\n    \"config\": [\n      \"a\"\n    ]\n  }\n}\n");
    }

    #[test]
    fn test_save_is_deterministic() {
        let (_dir, store) = store_with(Some(SAMPLE));
        let doc = store.load().unwrap();
        store.save(&doc).unwrap();
        let first = fs::read(store.path()).unwrap();
        store.save(&store.load().unwrap()).unwrap();
        let second = fs::read(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (dir, store) = store_with(Some(SAMPLE));
        store.save(&store.load().unwrap()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["config.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_existing_mode() {
        let (_dir, store) = store_with(Some(SAMPLE));
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();
        store.save(&store.load().unwrap()).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let (_dir, store) = store_with(None);
        assert!(matches!(store.load(), Err(ZimanError::NotFound { .. })));
        assert!(matches!(store.metadata(), Err(ZimanError::NotFound { .. })));
    }

    #[test]
    fn test_load_malformed_is_parse_error() {
        let (_dir, store) = store_with(Some("{ not json"));
        assert!(matches!(store.load(), Err(ZimanError::Parse { .. })));
    }

    #[test]
    fn test_load_wrong_shape_is_parse_error() {
        let (_dir, store) = store_with(Some(r#"{"auth": {"config": [1, 2]}}"#));
        assert!(matches!(store.load(), Err(ZimanError::Parse { .. })));
    }

    #[test]
    fn test_metadata() {
        let (_dir, store) = store_with(Some(SAMPLE));
        let meta = store.metadata().unwrap();
        assert_eq!(meta.path, store.path());
        assert_eq!(meta.size_bytes, SAMPLE.len() as u64);
        assert!(meta.last_modified.is_some());
        assert_eq!(
            meta.top_level_keys,
            vec!["auth", "listen", "cert", "obfs", "server"]
        );
    }

    #[test]
    fn test_round_trip_keeps_null_values() {
        let raw = r#"{"server": null, "auth": {"method": null, "config": ["a"]}, "obfs": "x"}"#;
        let (_dir, store) = store_with(Some(raw));
        store.save(&store.load().unwrap()).unwrap();

        let on_disk: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(on_disk, original);
    }

    #[test]
    fn test_round_trip_keeps_null_sections() {
        for raw in [r#"{"auth": null, "obfs": "x"}"#, r#"{"auth": {"config": null}}"#] {
            let (_dir, store) = store_with(Some(raw));
            store.save(&store.load().unwrap()).unwrap();
            let on_disk: Value =
                serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
            assert_eq!(on_disk, serde_json::from_str::<Value>(raw).unwrap(), "{}", raw);
        }
    }

    #[test]
    fn test_non_object_server_loads() {
        let (_dir, store) = store_with(Some(r#"{"server": "udp", "auth": {"config": []}}"#));
        let doc = store.load().unwrap();
        assert_eq!(doc.server(), Some(&Value::from("udp")));
    }
}
