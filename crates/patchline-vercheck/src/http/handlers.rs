//! HTTP request handlers for the version-check endpoint.

use crate::catalog::{Family, Version};
use crate::error::ResolveError;
use crate::resolve::{Resolution, resolve};
use crate::responses::{MULTIPART_BOUNDARY, ManifestOptions, manifest_body};
use crate::server::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Handle GET /patch/vercheck/:family/:version.
///
/// Response shape:
/// - up to date: 204, `X-Latest-Version` header, no body
/// - unknown (family, version): 404, empty body
/// - missing backing artifact: 500, empty body, zero manifest bytes
/// - behind: 200 with repository headers and a streamed multipart manifest
///
/// # Errors
///
/// Returns `AppError` for the 404 and 500 cases above.
pub async fn handle_vercheck(
    Path((family, version)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    tracing::debug!("Handling vercheck request for {family} {version}");

    let family: Family = family
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown family: {family}")))?;
    let version: Version = version
        .parse()
        .map_err(|_| AppError::NotFound(format!("Invalid version token: {version}")))?;

    let resolution = resolve(
        state.catalog(),
        state.artifacts().as_ref(),
        family,
        &version,
    )
    .await?;

    match resolution {
        Resolution::NotFound => Err(AppError::NotFound(format!(
            "Unknown release: {family} {version}"
        ))),

        Resolution::UpToDate { latest } => Ok((
            StatusCode::NO_CONTENT,
            [("x-latest-version", latest.to_string())],
        )
            .into_response()),

        Resolution::NeedsUpdate { chain, latest } => {
            let repository = state.repository();

            let headers = [
                (
                    "content-type",
                    format!("multipart/mixed; boundary={MULTIPART_BOUNDARY}"),
                ),
                (
                    "content-location",
                    format!("{}/vercheck.dat", family.repository_hash()),
                ),
                (
                    "x-repository",
                    format!("{}/{family}", repository.repository),
                ),
                ("x-patch-module", repository.patch_module.clone()),
                ("x-protocol", repository.protocol.clone()),
                ("x-info-url", repository.info_url.clone()),
                ("x-latest-version", latest.to_string()),
            ];

            let options = ManifestOptions {
                extension: repository.artifact_extension.clone(),
                signature: repository.signature.clone(),
            };
            let body = Body::from_stream(manifest_body(
                state.artifacts().clone(),
                family,
                chain,
                options,
            ));

            Ok((StatusCode::OK, headers, body).into_response())
        }
    }
}

/// Application-level error type for HTTP handlers.
///
/// Both variants map to empty response bodies: the client protocol carries
/// failure in the status code alone.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404)
    NotFound(String),
    /// Resolution failed server-side (500)
    Resolve(ResolveError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotFound(reason) => {
                tracing::debug!("vercheck not found: {reason}");
                StatusCode::NOT_FOUND
            }
            Self::Resolve(err) => {
                tracing::error!("vercheck resolution failed: {err}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        status.into_response()
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        Self::Resolve(err)
    }
}
