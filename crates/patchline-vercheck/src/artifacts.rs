//! Artifact store interface and filesystem implementation.
//!
//! The core needs exactly two things from the store holding patch payloads:
//! an existence check and a readable byte stream. How the bytes got there
//! (seeding, mirroring, manual deployment) is not its concern.

use crate::catalog::{Family, Version};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

/// Boxed payload byte stream returned by a store.
pub type ArtifactReader = Box<dyn AsyncRead + Send + Unpin>;

/// External store of release payload artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Check whether the payload for a release is present.
    async fn exists(&self, family: Family, version: &Version) -> bool;

    /// Open the payload for a release for reading.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the artifact cannot be opened.
    async fn open(&self, family: Family, version: &Version) -> std::io::Result<ArtifactReader>;
}

/// Derived metainfo location for a release.
///
/// This is deterministic, never stored: `<family-hash>/metainfo/D<version>.<ext>`.
/// The same string is used as the relative on-disk path and as the segment
/// `Content-Location` in update manifests.
#[must_use]
pub fn metainfo_location(family: Family, version: &Version, extension: &str) -> String {
    format!(
        "{}/metainfo/D{version}.{extension}",
        family.repository_hash()
    )
}

/// Artifact store backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    /// Root directory holding per-family artifact trees
    root: PathBuf,

    /// File extension of artifact files (without the dot)
    extension: String,
}

impl FsArtifactStore {
    /// Create a store rooted at `root` serving `*.extension` artifacts.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Absolute path of the artifact backing a release.
    #[must_use]
    pub fn artifact_path(&self, family: Family, version: &Version) -> PathBuf {
        self.root
            .join(metainfo_location(family, version, &self.extension))
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn exists(&self, family: Family, version: &Version) -> bool {
        tokio::fs::metadata(self.artifact_path(family, version))
            .await
            .is_ok_and(|metadata| metadata.is_file())
    }

    async fn open(&self, family: Family, version: &Version) -> std::io::Result<ArtifactReader> {
        let path = self.artifact_path(family, version);
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::new(file))
    }
}

/// In-memory artifact store for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryArtifactStore {
    artifacts: std::collections::HashMap<(Family, Version), Vec<u8>>,
}

impl MemoryArtifactStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert payload bytes for a release.
    pub fn insert(&mut self, family: Family, version: Version, payload: impl Into<Vec<u8>>) {
        self.artifacts.insert((family, version), payload.into());
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn exists(&self, family: Family, version: &Version) -> bool {
        self.artifacts.contains_key(&(family, version.clone()))
    }

    async fn open(&self, family: Family, version: &Version) -> std::io::Result<ArtifactReader> {
        let payload = self
            .artifacts
            .get(&(family, version.clone()))
            .cloned()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no artifact for {family} {version}"),
                )
            })?;
        Ok(Box::new(std::io::Cursor::new(payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn version(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_metainfo_location_shape() {
        let location = metainfo_location(Family::Game, &version("2010.09.19.0000"), "torrent");
        assert_eq!(
            location,
            format!(
                "{}/metainfo/D2010.09.19.0000.torrent",
                Family::Game.repository_hash()
            )
        );
    }

    #[tokio::test]
    async fn test_fs_store_paths_and_existence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path(), "torrent");
        let v = version("2010.09.19.0000");

        assert!(!store.exists(Family::Game, &v).await);

        let path = store.artifact_path(Family::Game, &v);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"payload").unwrap();

        assert!(store.exists(Family::Game, &v).await);
        assert!(!store.exists(Family::Boot, &v).await);
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let mut store = MemoryArtifactStore::new();
        let v = version("1.0");
        store.insert(Family::Boot, v.clone(), b"bytes".to_vec());

        let mut reader = store.open(Family::Boot, &v).await.unwrap();
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"bytes");

        assert!(store.open(Family::Game, &v).await.is_err());
    }
}
