//! Version-check server implementation.
//!
//! This crate resolves a client's reported (family, version) against an
//! immutable release catalog and, when the client is behind, streams a
//! multipart update manifest naming every release it still has to apply.
//!
//! # Architecture
//!
//! The server uses a library-first design with the following components:
//! - `server`: State management and orchestration
//! - `config`: Configuration loading and validation
//! - `catalog`: Release catalog loading and resolution queries
//! - `resolve`: Version resolution with the all-or-nothing artifact check
//! - `artifacts`: Artifact store seam (filesystem and in-memory)
//! - `responses`: Update manifest streaming
//! - `http`: HTTP server and handlers
//!
//! # Example
//!
//! ```no_run
//! use patchline_vercheck::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Initialize logging
//!     tracing_subscriber::fmt::init();
//!
//!     // Load configuration from CLI args and environment
//!     let config = ServerConfig::from_args();
//!     config.validate()?;
//!
//!     // Create and run server
//!     let server = Server::new(config)?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Guarantees
//!
//! - Catalog and artifact layout invariants are validated once, at load
//!   time; request handling never observes a half-checked catalog.
//! - A manifest is only streamed after every release in the chain has been
//!   verified to have a backing artifact: clients never see a partial set.
//! - Payload bytes are copied through in chunks, never buffered whole.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Module declarations
pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod resolve;
pub mod responses;
pub mod server;

// Re-exports for public API
pub use artifacts::{ArtifactStore, FsArtifactStore, MemoryArtifactStore};
pub use catalog::{Family, ReleaseCatalog, ReleaseRecord, Version};
pub use config::{RepositoryConfig, ServerConfig};
pub use error::{CatalogError, ConfigError, ResolveError, ServerError};
pub use resolve::{Resolution, resolve};
pub use server::{AppState, Server};
