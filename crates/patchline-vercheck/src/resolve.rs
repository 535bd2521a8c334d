//! Version resolution: "is this client current, and if not, what must it apply?"

use crate::artifacts::ArtifactStore;
use crate::catalog::{Family, ReleaseCatalog, ReleaseRecord, Version};
use crate::error::ResolveError;

/// Outcome of resolving a client's reported (family, version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The reported (family, version) pair is unknown to the catalog
    NotFound,

    /// The client is already on the latest release of its family
    UpToDate {
        /// The latest version (equal to the queried version)
        latest: Version,
    },

    /// The client must obtain the releases in `chain`, in order
    NeedsUpdate {
        /// Releases newer than the client's, ascending by build time
        chain: Vec<ReleaseRecord>,
        /// The latest version of the family
        latest: Version,
    },
}

/// Resolve a client's reported version against the catalog.
///
/// Before returning [`Resolution::NeedsUpdate`] this verifies that every
/// release in the chain has a backing artifact. The check is all-or-nothing:
/// the manifest wire format is consumed as a complete set, so a partially
/// emittable chain must fail here, before any response byte is written.
///
/// # Errors
///
/// Returns [`ResolveError::IncompleteCatalog`] if any chain release lacks a
/// backing artifact, or a catalog error on fatal configuration defects.
pub async fn resolve(
    catalog: &ReleaseCatalog,
    artifacts: &dyn ArtifactStore,
    family: Family,
    version: &Version,
) -> Result<Resolution, ResolveError> {
    if !catalog.exists(family, version) {
        return Ok(Resolution::NotFound);
    }

    let latest = catalog.latest(family)?;

    if latest.version == *version {
        return Ok(Resolution::UpToDate {
            latest: latest.version.clone(),
        });
    }

    let chain = catalog.updates_after(family, version)?;

    for release in &chain {
        if !artifacts.exists(family, &release.version).await {
            tracing::error!(
                %family,
                version = %release.version,
                "artifact for chain release is missing, refusing to emit manifest"
            );
            return Err(ResolveError::IncompleteCatalog {
                family,
                version: release.version.clone(),
            });
        }
    }

    Ok(Resolution::NeedsUpdate {
        chain: chain.into_iter().cloned().collect(),
        latest: latest.version.clone(),
    })
}
