//! Server state management and orchestration.
//!
//! Holds the shared immutable state (catalog, artifact store, repository
//! metadata) behind the HTTP serving layer.

use crate::artifacts::{ArtifactStore, FsArtifactStore};
use crate::catalog::ReleaseCatalog;
use crate::config::{RepositoryConfig, ServerConfig};
use crate::error::ServerError;
use std::sync::Arc;

/// Shared application state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Release catalog (loaded once at startup, immutable)
    catalog: Arc<ReleaseCatalog>,

    /// Artifact store backing manifest payloads
    artifacts: Arc<dyn ArtifactStore>,

    /// Repository metadata for response headers
    repository: RepositoryConfig,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the catalog cannot be loaded.
    pub fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        tracing::info!("Loading release catalog from {:?}", config.releases);

        let catalog = ReleaseCatalog::from_file(&config.releases)?;

        tracing::info!(
            "Loaded {} releases for {} families",
            catalog.total_releases(),
            catalog.families().len()
        );

        let artifacts = FsArtifactStore::new(&config.artifacts, &config.artifact_extension);

        Ok(Self {
            catalog: Arc::new(catalog),
            artifacts: Arc::new(artifacts),
            repository: config.repository_config(),
        })
    }

    /// Create application state from preconstructed parts.
    ///
    /// Useful for tests and embedding with a non-filesystem artifact store.
    pub fn from_parts(
        catalog: ReleaseCatalog,
        artifacts: Arc<dyn ArtifactStore>,
        repository: RepositoryConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            artifacts,
            repository,
        }
    }

    /// Get reference to the release catalog.
    #[must_use]
    pub fn catalog(&self) -> &ReleaseCatalog {
        &self.catalog
    }

    /// Get the shared artifact store.
    #[must_use]
    pub fn artifacts(&self) -> &Arc<dyn ArtifactStore> {
        &self.artifacts
    }

    /// Get repository metadata for response headers.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryConfig {
        &self.repository
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog)
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

/// Server orchestration.
pub struct Server {
    /// Shared application state
    state: Arc<AppState>,
    /// Server configuration
    config: ServerConfig,
}

impl Server {
    /// Create a new server with configuration.
    ///
    /// Loads the release catalog and prepares shared state.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the catalog cannot be loaded.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let state = AppState::new(&config)?;

        tracing::info!(
            "Server initialized with {} releases across {} families",
            state.catalog().total_releases(),
            state.catalog().families().len()
        );

        Ok(Self {
            state: Arc::new(state),
            config,
        })
    }

    /// Run the server until interrupted.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or shutdown goes wrong.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting Patchline version-check server");
        tracing::info!("HTTP server binding to: {}", self.config.http_bind);
        tracing::info!("Artifact store root: {:?}", self.config.artifacts);

        crate::http::start_server(self.config.http_bind, self.state).await
    }

    /// Get shared application state (for testing).
    #[cfg(test)]
    #[must_use]
    pub const fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}
