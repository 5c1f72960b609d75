//! Object-store client seam.
//!
//! The pipeline depends only on this trait's shape (a resumable multipart
//! transfer with fractional progress and a public-URL scheme), not on any
//! specific provider. Production deployments back it with an OSS/S3-style
//! client; tests back it with an in-memory fake.

use async_trait::async_trait;

use crate::error::UploadError;
use crate::model::UploadTarget;

/// Fractional progress of one multipart transfer, `0.0..=1.0`.
///
/// Invoked on the transfer's own cadence; the pipeline re-emits each tick
/// as an `Uploading` progress event.
pub type TransferProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// Outcome of a multipart transfer that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Final transport status code. `200` is the only success value.
    pub status: u16,
}

/// A client for one object-storage bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Run a multipart transfer of `target.payload` to `target.path`.
    /// `target.content_hint` may become the object's content type.
    ///
    /// `on_progress` receives fractional ticks while bytes move. Returns a
    /// receipt once the transport finishes; a non-200 receipt is not an
    /// `Err` at this level; the pipeline turns it into
    /// [`UploadError::Transfer`]. `Err` is reserved for failures before a
    /// transport status exists (connection refused, credential rejection).
    async fn multipart_upload(
        &self,
        target: &UploadTarget,
        on_progress: TransferProgressFn<'_>,
    ) -> Result<TransferReceipt, UploadError>;

    /// The public URL an object at `path` is served from.
    fn public_url(&self, path: &str) -> String;
}
