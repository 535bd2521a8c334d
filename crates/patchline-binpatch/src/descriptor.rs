//! Patch descriptor table.
//!
//! Each descriptor maps one exact file content (by SHA-256) to a one-time
//! byte-level correction and its verified result. The table is static
//! deployment data: loaded once, immutable for the process lifetime.

use crate::digest::Sha256Digest;
use crate::error::TableError;
use std::collections::HashMap;

/// A rule rewriting one byte range of a file with known content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDescriptor {
    /// Digest of the file this correction applies to
    pub source_hash: Sha256Digest,

    /// Digest the patched file must hash to
    pub result_hash: Sha256Digest,

    /// Byte offset at which the replacement is written
    pub offset: u64,

    /// Replacement bytes written at `offset`
    pub replacement: Vec<u8>,
}

/// Static set of patch descriptors, looked up by source content hash.
#[derive(Debug, Clone, Default)]
pub struct DescriptorTable {
    by_source: HashMap<Sha256Digest, PatchDescriptor>,
}

impl DescriptorTable {
    /// Create an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from descriptors.
    ///
    /// # Errors
    ///
    /// Returns `TableError::DuplicateSource` if two descriptors share a
    /// source hash. Precedence between duplicates would be arbitrary, so a
    /// table containing them is rejected at load time.
    pub fn new(descriptors: Vec<PatchDescriptor>) -> Result<Self, TableError> {
        let mut by_source = HashMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let source = descriptor.source_hash;
            if by_source.insert(source, descriptor).is_some() {
                return Err(TableError::DuplicateSource(source.to_string()));
            }
        }

        Ok(Self { by_source })
    }

    /// The built-in table of known client executable corrections.
    #[must_use]
    pub fn builtin() -> Self {
        let mut table = Self::empty();

        // 2010.07.10.0000 bootstrapper
        table.add_from_hex(
            "A5A8F843389D97A2DDAA081B1D571ABE0E7BAAD24FA55B87660B7321ACF5ED35",
            "8C9A9A8580FA429238CAEB63F31B3221A1AF9B4E6F6E935DA6D3345A9F03F6B7",
            0x5DF64,
            vec![0x01],
        );

        // 2010.09.18.0000 bootstrapper
        table.add_from_hex(
            "6A18533D4C3B296CCDEDD84C81A3EB99AE5DDB47C3416DE60E3414983783EFEF",
            "E0531FA034B2A38138930131184C80C6CC57618468AE40E258C73223F54948F1",
            0x646EF,
            vec![0x19],
        );

        table
    }

    /// Add a descriptor from hex digests (internal helper).
    fn add_from_hex(&mut self, source: &str, result: &str, offset: u64, replacement: Vec<u8>) {
        if let (Ok(source_hash), Ok(result_hash)) =
            (Sha256Digest::from_hex(source), Sha256Digest::from_hex(result))
        {
            self.by_source.insert(
                source_hash,
                PatchDescriptor {
                    source_hash,
                    result_hash,
                    offset,
                    replacement,
                },
            );
        }
    }

    /// Exact-match lookup by source content hash.
    #[must_use]
    pub fn find(&self, hash: &Sha256Digest) -> Option<&PatchDescriptor> {
        self.by_source.get(hash)
    }

    /// Number of descriptors in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    /// Check whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}
