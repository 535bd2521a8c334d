//! Update manifest streaming.
//!
//! A manifest is a multipart byte stream: for every release in the update
//! chain, a framed segment (content-type marker, derived location, payload
//! length, signature, then the raw artifact bytes), closed by a terminator
//! frame. Segments are emitted strictly in chain order and payload bytes are
//! copied through in fixed-size chunks, never materialized whole (payloads
//! can run to hundreds of megabytes).
//!
//! All preconditions (artifact existence for the entire chain) are checked
//! by [`crate::resolve::resolve`] before this stream is constructed, so a
//! consumer that sees the first byte is guaranteed the set is complete.

use crate::artifacts::{ArtifactReader, ArtifactStore, metainfo_location};
use crate::catalog::{Family, ReleaseRecord};
use bytes::{Bytes, BytesMut};
use futures::Stream;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Fixed multipart boundary token expected by clients.
pub const MULTIPART_BOUNDARY: &str = "477D80B1_38BC_41d4_8B48_5273ADB89CAC";

/// Final frame closing a manifest stream.
const MULTIPART_TERMINATOR: &str = "--477D80B1_38BC_41d4_8B48_5273ADB89CAC--\r\n\r\n";

/// Chunk size for copying payload bytes from the artifact store.
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Per-response constants carried into every segment.
#[derive(Debug, Clone)]
pub struct ManifestOptions {
    /// Artifact file extension used in segment locations
    pub extension: String,

    /// Opaque authenticity token emitted as `X-Signature`
    pub signature: String,
}

/// Format the framing header of one manifest segment.
fn segment_header(family: Family, release: &ReleaseRecord, options: &ManifestOptions) -> String {
    format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Type: application/octet-stream\r\n\
         Content-Location: {}\r\n\
         X-Patch-Length: {}\r\n\
         X-Signature: {}\r\n\
         \r\n",
        metainfo_location(family, &release.version, &options.extension),
        release.payload_length,
        options.signature,
    )
}

/// Streaming position within the manifest.
enum StreamState {
    /// About to emit the header of segment `i`, or the terminator past the end
    Segment(usize),
    /// Copying payload bytes of segment `i`
    Payload(usize, ArtifactReader),
    /// Terminator emitted, stream exhausted
    Finished,
}

struct StreamCtx {
    artifacts: Arc<dyn ArtifactStore>,
    family: Family,
    chain: Vec<ReleaseRecord>,
    options: ManifestOptions,
    state: StreamState,
}

/// Build the manifest body stream for a resolved update chain.
///
/// Yields the framed segments in chain order (ascending build time), one
/// chunk at a time. An I/O failure while copying payload bytes surfaces as a
/// stream error, aborting the response mid-body; existence of every artifact
/// must already have been verified.
pub fn manifest_body(
    artifacts: Arc<dyn ArtifactStore>,
    family: Family,
    chain: Vec<ReleaseRecord>,
    options: ManifestOptions,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send {
    let ctx = StreamCtx {
        artifacts,
        family,
        chain,
        options,
        state: StreamState::Segment(0),
    };

    futures::stream::try_unfold(ctx, |mut ctx| async move {
        loop {
            match std::mem::replace(&mut ctx.state, StreamState::Finished) {
                StreamState::Segment(index) if index < ctx.chain.len() => {
                    let release = &ctx.chain[index];
                    let header = segment_header(ctx.family, release, &ctx.options);
                    let reader = ctx.artifacts.open(ctx.family, &release.version).await?;

                    ctx.state = StreamState::Payload(index, reader);
                    return Ok(Some((Bytes::from(header), ctx)));
                }
                StreamState::Segment(_) => {
                    // Past the last segment: close the stream
                    return Ok(Some((
                        Bytes::from_static(MULTIPART_TERMINATOR.as_bytes()),
                        ctx,
                    )));
                }
                StreamState::Payload(index, mut reader) => {
                    let mut chunk = BytesMut::with_capacity(COPY_CHUNK_SIZE);
                    let read = reader.read_buf(&mut chunk).await?;

                    if read == 0 {
                        ctx.state = StreamState::Segment(index + 1);
                        continue;
                    }

                    ctx.state = StreamState::Payload(index, reader);
                    return Ok(Some((chunk.freeze(), ctx)));
                }
                StreamState::Finished => return Ok(None),
            }
        }
    })
}
