//! Error types for the version-check server.
//!
//! All errors use thiserror for consistent error handling across the codebase.

use crate::catalog::{Family, Version};
use std::path::PathBuf;
use thiserror::Error;

/// Catalog loading and query errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read the releases JSON file
    #[error("Failed to load releases from {path}: {source}")]
    LoadFailed {
        /// Path to the releases.json file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON format in releases file
    #[error("Invalid JSON in releases file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Empty catalog (no releases loaded)
    #[error("Catalog is empty: no releases loaded")]
    EmptyCatalog,

    /// Version token is not dot-delimited numeric groups
    #[error("Invalid version token: '{0}'")]
    InvalidVersion(String),

    /// Invalid field value in a release record
    #[error("Invalid {family} release {version}: {reason}")]
    InvalidRecord {
        /// Family of the offending record
        family: Family,
        /// Version of the offending record
        version: Version,
        /// Reason for validation failure
        reason: String,
    },

    /// Two records share the same (family, version) pair
    #[error("Duplicate release: {family} {version}")]
    DuplicateRelease {
        /// Family of the duplicated record
        family: Family,
        /// Version that appears more than once
        version: Version,
    },

    /// Two records in one family share a build timestamp
    #[error("Duplicate build time in {family}: {build_time}")]
    DuplicateBuildTime {
        /// Family of the colliding records
        family: Family,
        /// Build timestamp that appears more than once
        build_time: String,
    },

    /// Build-time order disagrees with version order within a family
    #[error("Version order inconsistent in {family}: {earlier} builds before {later}")]
    OrderInconsistent {
        /// Family of the offending records
        family: Family,
        /// Version with the earlier build time but larger version token
        earlier: Version,
        /// Version with the later build time but smaller version token
        later: Version,
    },

    /// Family name is unknown or the family has no records
    #[error("No releases found for family: {0}")]
    UnknownFamily(String),

    /// (family, version) pair is not present in the catalog
    #[error("Unknown version {version} for family {family}")]
    UnknownVersion {
        /// Queried family
        family: Family,
        /// Queried version
        version: Version,
    },
}

/// Version resolution errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A release in the update chain has no backing artifact.
    ///
    /// Operational/configuration defect: the catalog names a release whose
    /// payload is not present in the artifact store. No manifest bytes may
    /// be written once this is detected.
    #[error("Artifact for {family} release {version} is missing")]
    IncompleteCatalog {
        /// Family of the release lacking a payload
        family: Family,
        /// Release version lacking a payload
        version: Version,
    },

    /// Catalog query failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration value
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Field name that failed validation
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Server runtime errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind HTTP server
    #[error("Failed to bind HTTP server to {addr}: {source}")]
    HttpBindFailed {
        /// Address that failed to bind
        addr: std::net::SocketAddr,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server shutdown error
    #[error("Server shutdown error: {0}")]
    Shutdown(String),
}
