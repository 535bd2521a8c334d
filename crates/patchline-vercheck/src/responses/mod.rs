//! Response generation for the version-check protocol.
//!
//! The interesting piece is the update manifest: a multipart stream of one
//! framed segment per release the client still has to apply.

pub mod manifest;

pub use manifest::{MULTIPART_BOUNDARY, ManifestOptions, manifest_body};
