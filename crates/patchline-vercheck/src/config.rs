//! Server configuration management.
//!
//! Configuration is loaded from CLI arguments and environment variables and
//! validated for consistency before the server starts.
//!
//! # Example
//!
//! ```no_run
//! use patchline_vercheck::ServerConfig;
//!
//! let config = ServerConfig::from_args();
//! config.validate().expect("Invalid configuration");
//!
//! println!("HTTP server will bind to: {}", config.http_bind);
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Static signature token emitted in manifest segments when none is configured.
const DEFAULT_SIGNATURE: &str = "jqxmt9WQH1aXptNju6CmCdztFdaKbyOAVjdGw_DJvRiBJhnQL6UlDUcqxg2DeiIKhVzkjUm3hFXOVUFjygxCoPUmCwnbCaryNqVk_oTk_aZE4HGWNOEcAdBwf0Gb2SzwAtk69zs_5dLAtZ0mPpMuxWJiaNSvWjEmQ925BFwd7Vk=";

/// Server configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "patchline-vercheck",
    about = "Version-check server streaming incremental update manifests",
    version
)]
pub struct ServerConfig {
    /// HTTP bind address
    #[arg(
        long,
        env = "PATCHLINE_VERCHECK_HTTP_BIND",
        default_value = "0.0.0.0:8080"
    )]
    pub http_bind: SocketAddr,

    /// Path to the releases JSON catalog
    #[arg(
        long,
        env = "PATCHLINE_VERCHECK_RELEASES",
        default_value = "./releases.json"
    )]
    pub releases: PathBuf,

    /// Root directory of the artifact store
    #[arg(
        long,
        env = "PATCHLINE_VERCHECK_ARTIFACTS",
        default_value = "./patchdata"
    )]
    pub artifacts: PathBuf,

    /// File extension of artifact files (without the dot)
    #[arg(
        long,
        env = "PATCHLINE_VERCHECK_ARTIFACT_EXT",
        default_value = "torrent"
    )]
    pub artifact_extension: String,

    /// Repository prefix reported in the X-Repository header
    #[arg(
        long,
        env = "PATCHLINE_VERCHECK_REPOSITORY",
        default_value = "client/win32/release"
    )]
    pub repository: String,

    /// Patch container module name reported in the X-Patch-Module header
    #[arg(
        long,
        env = "PATCHLINE_VERCHECK_PATCH_MODULE",
        default_value = "ZiPatch"
    )]
    pub patch_module: String,

    /// Payload transfer protocol reported in the X-Protocol header
    #[arg(long, env = "PATCHLINE_VERCHECK_PROTOCOL", default_value = "torrent")]
    pub protocol: String,

    /// Informational URL reported in the X-Info-Url header
    #[arg(
        long,
        env = "PATCHLINE_VERCHECK_INFO_URL",
        default_value = "http://example.com"
    )]
    pub info_url: String,

    /// Opaque signature token emitted in every manifest segment
    #[arg(
        long,
        env = "PATCHLINE_VERCHECK_SIGNATURE",
        default_value = DEFAULT_SIGNATURE
    )]
    pub signature: String,
}

impl ServerConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Get the repository configuration for responses.
    #[must_use]
    pub fn repository_config(&self) -> RepositoryConfig {
        RepositoryConfig {
            repository: self.repository.clone(),
            patch_module: self.patch_module.clone(),
            protocol: self.protocol.clone(),
            info_url: self.info_url.clone(),
            signature: self.signature.clone(),
            artifact_extension: self.artifact_extension.clone(),
        }
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the releases file doesn't exist or a header
    /// value is empty.
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        if !self.releases.exists() {
            return Err(ConfigError::MissingRequired(format!(
                "releases file not found: {}",
                self.releases.display()
            )));
        }

        for (field, value) in [
            ("repository", &self.repository),
            ("patch-module", &self.patch_module),
            ("protocol", &self.protocol),
            ("artifact-extension", &self.artifact_extension),
        ] {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "value cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Repository metadata reported in version-check responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Prefix of the X-Repository header (family name is appended)
    pub repository: String,

    /// Patch container module name (X-Patch-Module)
    pub patch_module: String,

    /// Payload transfer protocol (X-Protocol)
    pub protocol: String,

    /// Informational URL (X-Info-Url)
    pub info_url: String,

    /// Opaque segment signature token (X-Signature)
    pub signature: String,

    /// Artifact file extension used in segment locations
    pub artifact_extension: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            repository: "client/win32/release".to_string(),
            patch_module: "ZiPatch".to_string(),
            protocol: "torrent".to_string(),
            info_url: "http://example.com".to_string(),
            signature: DEFAULT_SIGNATURE.to_string(),
            artifact_extension: "torrent".to_string(),
        }
    }
}
