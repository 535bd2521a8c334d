//! Binary patch engine.
//!
//! Applies the one-time correction a file's content hash calls for, writing
//! the result next to the source under the engine's canonical destination
//! filename. Repeat invocations reuse a correct destination and regenerate a
//! corrupt one.

use crate::descriptor::DescriptorTable;
use crate::digest::Sha256Digest;
use crate::error::EngineError;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Hash-addressed binary patch engine.
///
/// Thread-safe: invocations targeting the same destination path are
/// serialized through a per-path lock; distinct paths proceed independently.
#[derive(Debug)]
pub struct PatchEngine {
    /// Static descriptor table, keyed by source content hash
    table: DescriptorTable,

    /// Canonical filename of patched outputs
    destination_name: String,

    /// Per-destination locks guarding hash/copy/rewrite sequences
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PatchEngine {
    /// Create an engine writing patched files as `destination_name`.
    pub fn new(table: DescriptorTable, destination_name: impl Into<String>) -> Self {
        Self {
            table,
            destination_name: destination_name.into(),
            locks: DashMap::new(),
        }
    }

    /// Canonical filename of patched outputs.
    #[must_use]
    pub fn destination_name(&self) -> &str {
        &self.destination_name
    }

    /// Ensure the executable at `path` is safe to run, returning the path to
    /// launch.
    ///
    /// The file's content hash decides everything:
    /// - no descriptor matches: `path` is returned unchanged, nothing is
    ///   copied
    /// - a descriptor matches: the correction is applied to a copy placed in
    ///   the same directory under the canonical destination filename, and
    ///   that path is returned
    ///
    /// An existing destination hashing to the descriptor's result is reused
    /// without rewriting; one with any other content is discarded and
    /// regenerated (self-healing after an interrupted patch). Files already
    /// named like the destination are exempt and pass through unchanged.
    ///
    /// After success, re-hashing the returned file yields exactly the
    /// descriptor's result hash.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::SourceMissing` if `path` does not exist, or an
    /// I/O error from hashing, copying, or rewriting.
    pub fn ensure_patched(&self, path: &Path) -> Result<PathBuf, EngineError> {
        if !path.is_file() {
            return Err(EngineError::SourceMissing(path.to_path_buf()));
        }

        // The destination file itself is never a patch source
        if path.file_name() == Some(OsStr::new(&self.destination_name)) {
            return Ok(path.to_path_buf());
        }

        let hash = Sha256Digest::of_file(path)?;

        let Some(descriptor) = self.table.find(&hash) else {
            debug!(path = %path.display(), %hash, "no correction required");
            return Ok(path.to_path_buf());
        };

        let Some(directory) = path.parent() else {
            return Ok(path.to_path_buf());
        };
        let destination = directory.join(&self.destination_name);

        let lock = self.destination_lock(&destination);
        let _guard = lock.lock();

        if destination.is_file() {
            if Sha256Digest::of_file(&destination)? == descriptor.result_hash {
                debug!(destination = %destination.display(), "existing patched file reused");
                return Ok(destination);
            }

            // Stale or half-written result from an earlier run
            fs::remove_file(&destination)?;
        }

        fs::copy(path, &destination)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&destination)?;
        file.seek(SeekFrom::Start(descriptor.offset))?;
        file.write_all(&descriptor.replacement)?;
        file.sync_all()?;

        info!(
            source = %path.display(),
            destination = %destination.display(),
            offset = descriptor.offset,
            "applied binary correction"
        );

        Ok(destination)
    }

    /// Get (or create) the lock guarding a destination path.
    fn destination_lock(&self, destination: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(destination.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
