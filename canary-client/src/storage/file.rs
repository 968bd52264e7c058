use super::KeyValueStore;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::sync::Mutex;

/// JSON-file store. Every batch rewrites the whole file through a uniquely
/// named temporary file and a rename, so readers see either the old or the
/// new contents. On unix the file is readable by its owner only.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> ClientResult<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Credential file is corrupt, treating it as empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        let body = serde_json::to_vec_pretty(entries)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_replacing(&path, &body))
            .await
            .map_err(|e| ClientError::Storage(format!("credential write task failed: {}", e)))?
    }
}

/// `NamedTempFile` is created with mode 0600 and a random name in the target
/// directory, then renamed over `path`.
fn write_replacing(path: &Path, body: &[u8]) -> ClientResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut file = NamedTempFile::new_in(&dir)?;
    file.write_all(body)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> ClientResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut current = self.load().await?;
        for (key, value) in entries {
            current.insert((*key).to_string(), value.clone());
        }
        self.persist(&current).await
    }

    async fn remove_many(&self, keys: &[&str]) -> ClientResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut current = self.load().await?;
        let before = current.len();
        for key in keys {
            current.remove(*key);
        }

        if current.len() == before {
            return Ok(());
        }
        self.persist(&current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileStore::new(&path);
        store
            .set_many(&[("authToken", "t1".to_string()), ("user", "{}".to_string())])
            .await
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("authToken").await.unwrap().as_deref(), Some("t1"));
        assert_eq!(reopened.get("user").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));

        assert_eq!(store.get("authToken").await.unwrap(), None);
        store.remove_many(&["authToken"]).await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("authToken").await.unwrap(), None);

        store.set_many(&[("authToken", "t2".to_string())]).await.unwrap();
        assert_eq!(store.get("authToken").await.unwrap().as_deref(), Some("t2"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_credential_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileStore::new(&path);
        store
            .set_many(&[("authToken", "secret".to_string())])
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[tokio::test]
    async fn test_no_temporary_files_are_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("credentials.json"));

        store.set_many(&[("authToken", "t1".to_string())]).await.unwrap();
        store.set_many(&[("user", "{}".to_string())]).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("credentials.json")]);
    }

    #[tokio::test]
    async fn test_remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("credentials.json"));
        store
            .set_many(&[
                ("authToken", "t".to_string()),
                ("user", "{}".to_string()),
                ("theme", "dark".to_string()),
            ])
            .await
            .unwrap();

        store.remove_many(&["authToken", "user"]).await.unwrap();

        assert_eq!(store.get("authToken").await.unwrap(), None);
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
    }
}
