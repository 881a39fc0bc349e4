//! Local filesystem storage implementation.
//!
//! Each file is written atomically (temp file, then rename), so a crash
//! mid-write leaves the previous version intact.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{PathsConfig, SeenSet, ThreadRegistry};
use crate::storage::StateStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    seen_file: PathBuf,
    threads_file: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage for the given file locations.
    pub fn new(seen_file: impl Into<PathBuf>, threads_file: impl Into<PathBuf>) -> Self {
        Self {
            seen_file: seen_file.into(),
            threads_file: threads_file.into(),
        }
    }

    /// Create a LocalStorage from the configured paths.
    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self::new(&paths.seen_file, &paths.threads_file)
    }

    pub fn seen_file(&self) -> &Path {
        &self.seen_file
    }

    pub fn threads_file(&self) -> &Path {
        &self.threads_file
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Sibling temp file: the full file name plus `.tmp`.
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
        Self::ensure_dir(path).await?;

        let tmp = Self::temp_path(path);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(
        path: &Path,
        value: &T,
        pretty: bool,
    ) -> Result<()> {
        let bytes = if pretty {
            serde_json::to_vec_pretty(value)?
        } else {
            serde_json::to_vec(value)?
        };
        Self::write_bytes(path, &bytes)
            .await
            .map_err(|e| AppError::store(path.display().to_string(), e))
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        match Self::read_bytes(path).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read JSON data, degrading to the default value on any failure.
    async fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
        match Self::read_json(path).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                log::info!("No state file at {}, starting empty", path.display());
                T::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable state file {}: {}", path.display(), e);
                T::default()
            }
        }
    }
}

#[async_trait]
impl StateStore for LocalStorage {
    async fn load_seen(&self) -> SeenSet {
        let ids: Vec<String> = Self::read_json_or_default(&self.seen_file).await;
        ids.into_iter().collect()
    }

    async fn save_seen(&self, seen: &SeenSet) -> Result<()> {
        let mut ids: Vec<&str> = seen.iter().map(String::as_str).collect();
        ids.sort_unstable(); // Deterministic output
        Self::write_json(&self.seen_file, &ids, false).await
    }

    async fn load_threads(&self) -> ThreadRegistry {
        Self::read_json_or_default(&self.threads_file).await
    }

    async fn save_threads(&self, threads: &ThreadRegistry) -> Result<()> {
        Self::write_json(&self.threads_file, threads, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThreadLinks;
    use tempfile::TempDir;

    fn storage_in(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(
            tmp.path().join("seen_posts.json"),
            tmp.path().join("monitored_threads.json"),
        )
    }

    #[tokio::test]
    async fn test_seen_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        let seen: SeenSet = ["post-3", "post-1", "post-2"]
            .into_iter()
            .map(String::from)
            .collect();
        storage.save_seen(&seen).await.unwrap();

        assert_eq!(storage.load_seen().await, seen);
    }

    #[tokio::test]
    async fn test_seen_round_trip_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        storage.save_seen(&SeenSet::new()).await.unwrap();

        assert!(tmp.path().join("seen_posts.json").exists());
        assert!(storage.load_seen().await.is_empty());
    }

    #[tokio::test]
    async fn test_seen_file_is_sorted_array() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        let seen: SeenSet = ["b", "a"].into_iter().map(String::from).collect();
        storage.save_seen(&seen).await.unwrap();

        let raw = std::fs::read_to_string(storage.seen_file()).unwrap();
        assert_eq!(raw, r#"["a","b"]"#);
    }

    #[tokio::test]
    async fn test_missing_files_load_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        assert!(storage.load_seen().await.is_empty());
        assert!(storage.load_threads().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_files_load_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        std::fs::write(storage.seen_file(), b"{not json").unwrap();
        std::fs::write(storage.threads_file(), b"[1, 2, 3]").unwrap();

        assert!(storage.load_seen().await.is_empty());
        assert!(storage.load_threads().await.is_empty());
    }

    #[tokio::test]
    async fn test_threads_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = storage_in(&tmp);

        let mut links = ThreadLinks::new();
        links.insert("https://f.net/thread/1".into(), "Welcome".into());
        links.insert("https://f.net/thread/2".into(), "Rules".into());
        let registry = ThreadRegistry::new(links);

        storage.save_threads(&registry).await.unwrap();
        assert_eq!(storage.load_threads().await, registry);
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(
            tmp.path().join("state/seen.json"),
            tmp.path().join("state/threads.json"),
        );

        storage.save_threads(&ThreadRegistry::default()).await.unwrap();
        assert!(tmp.path().join("state/threads.json").exists());
        assert!(!tmp.path().join("state/threads.json.tmp").exists());
    }

    #[test]
    fn test_temp_path_keeps_full_file_name() {
        assert_eq!(
            LocalStorage::temp_path(Path::new("state/state.json")),
            PathBuf::from("state/state.json.tmp")
        );
        assert_ne!(
            LocalStorage::temp_path(Path::new("state.json")),
            LocalStorage::temp_path(Path::new("state.dat"))
        );
    }

    #[tokio::test]
    async fn test_same_stem_files_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        let storage =
            LocalStorage::new(tmp.path().join("state.seen"), tmp.path().join("state.threads"));

        let seen: SeenSet = ["post-1".to_string()].into_iter().collect();
        storage.save_seen(&seen).await.unwrap();
        storage.save_threads(&ThreadRegistry::default()).await.unwrap();

        assert_eq!(storage.load_seen().await, seen);
        assert!(storage.load_threads().await.is_empty());
        assert!(!tmp.path().join("state.seen.tmp").exists());
    }
}
