//! Asset manifest entries and the in-memory store the Preload scene fills.
//!
//! Assets are kept as raw bytes keyed by manifest key. Decoding happens at
//! the consumer: the renderer decodes images into GPU textures, the terrain
//! builder parses maps, the audio system decodes sounds. A failed read is
//! recorded so the consumer can fall back instead of retrying.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Map,
    Audio,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub key: String,
    pub kind: AssetKind,
    pub path: String,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset '{key}' from {path}: {source}")]
    Read {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("asset '{key}' at {path} is empty")]
    Empty { key: String, path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub kind: AssetKind,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Default)]
pub struct AssetStore {
    loaded: HashMap<String, LoadedAsset>,
    failed: HashSet<String>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one manifest entry from disk. Already-loaded keys are not re-read.
    pub fn load(&mut self, entry: &AssetEntry) -> Result<(), AssetError> {
        if self.loaded.contains_key(&entry.key) {
            return Ok(());
        }
        let path = PathBuf::from(&entry.path);
        let result = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => Err(AssetError::Empty {
                key: entry.key.clone(),
                path,
            }),
            Ok(bytes) => {
                self.insert(&entry.key, entry.kind, bytes);
                Ok(())
            }
            Err(source) => Err(AssetError::Read {
                key: entry.key.clone(),
                path,
                source,
            }),
        };
        if result.is_err() {
            self.failed.insert(entry.key.clone());
        }
        result
    }

    pub fn insert(&mut self, key: &str, kind: AssetKind, bytes: Vec<u8>) {
        self.failed.remove(key);
        self.loaded.insert(
            key.to_string(),
            LoadedAsset {
                kind,
                bytes: Arc::from(bytes),
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&LoadedAsset> {
        self.loaded.get(key)
    }

    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        self.loaded.get(key).map(|asset| &*asset.bytes)
    }

    pub fn has(&self, key: &str, kind: AssetKind) -> bool {
        self.loaded.get(key).is_some_and(|asset| asset.kind == kind)
    }

    pub fn has_failed(&self, key: &str) -> bool {
        self.failed.contains(key)
    }

    /// Keys of every loaded asset of `kind`, in no particular order.
    pub fn keys_of(&self, kind: AssetKind) -> impl Iterator<Item = &str> {
        self.loaded
            .iter()
            .filter(move |(_, asset)| asset.kind == kind)
            .map(|(key, _)| key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "ow_asset_test_{}_{}_{}.bin",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn entry(key: &str, kind: AssetKind, path: &std::path::Path) -> AssetEntry {
        AssetEntry {
            key: key.to_string(),
            kind,
            path: path.to_string_lossy().to_string(),
        }
    }

    #[test]
    fn load_reads_bytes_from_disk() {
        let path = temp_file_path("ok");
        fs::write(&path, b"tile bytes").expect("write temp file");

        let mut store = AssetStore::new();
        store
            .load(&entry("grass", AssetKind::Image, &path))
            .expect("existing file should load");
        assert_eq!(store.bytes("grass"), Some(&b"tile bytes"[..]));
        assert!(store.has("grass", AssetKind::Image));
        assert!(!store.has("grass", AssetKind::Audio));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_recorded_as_failed() {
        let path = temp_file_path("missing");
        let mut store = AssetStore::new();
        let err = store
            .load(&entry("hit", AssetKind::Audio, &path))
            .expect_err("missing file should fail");
        assert!(matches!(err, AssetError::Read { .. }));
        assert!(store.has_failed("hit"));
        assert!(store.get("hit").is_none());
    }

    #[test]
    fn empty_file_is_rejected() {
        let path = temp_file_path("empty");
        fs::write(&path, b"").expect("write temp file");
        let mut store = AssetStore::new();
        let err = store
            .load(&entry("map", AssetKind::Map, &path))
            .expect_err("empty file should fail");
        assert!(err.to_string().contains("is empty"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn keys_of_filters_by_kind() {
        let mut store = AssetStore::new();
        store.insert("grass", AssetKind::Image, vec![1]);
        store.insert("sand", AssetKind::Image, vec![2]);
        store.insert("hit", AssetKind::Audio, vec![3]);
        let mut images: Vec<&str> = store.keys_of(AssetKind::Image).collect();
        images.sort_unstable();
        assert_eq!(images, vec!["grass", "sand"]);
    }
}
