//! Content-hash-addressed binary patch engine.
//!
//! Some shipped client executables carry known single-range defects that
//! must be corrected before launch. This crate identifies such files purely
//! by their SHA-256 content digest and applies the one registered correction,
//! writing the result next to the source under a canonical filename. The
//! original file is never modified.
//!
//! # Architecture
//!
//! - [`Sha256Digest`] - content digests, the sole addressing key
//! - [`DescriptorTable`] - static map from source digest to correction
//! - [`PatchEngine`] - applies corrections idempotently and self-heals
//!   interrupted runs
//!
//! # Example
//!
//! ```no_run
//! use patchline_binpatch::{DescriptorTable, PatchEngine};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = PatchEngine::new(DescriptorTable::builtin(), "clientpatch.exe");
//!
//! // Returns the path to launch: the original if no correction applies,
//! // otherwise the patched copy.
//! let launch_path = engine.ensure_patched(Path::new("C:/game/client.exe"))?;
//! # let _ = launch_path;
//! # Ok(())
//! # }
//! ```
//!
//! # Guarantees
//!
//! - Lookup is by content only; filename and location are irrelevant
//! - The source file is read, never written
//! - A successful call leaves the destination hashing to the descriptor's
//!   result digest
//! - Concurrent calls targeting the same destination are serialized

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod descriptor;
pub mod digest;
pub mod engine;
pub mod error;

pub use descriptor::{DescriptorTable, PatchDescriptor};
pub use digest::Sha256Digest;
pub use engine::PatchEngine;
pub use error::{DigestError, EngineError, TableError};
