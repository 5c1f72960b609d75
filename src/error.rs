//! Error types for the whiteboard-uploader library.
//!
//! One enum covers every failure the pipeline can surface to a caller.
//! The taxonomy follows the pipeline's abort semantics:
//!
//! * Upload, task submission, and conversion failures are **fatal**: they
//!   abort the enclosing pipeline before any scene state is committed, so a
//!   failed `convert_file` never leaves a partial document behind.
//!
//! * Cover-thumbnail fetch failure is **absorbed**: the pipeline falls back
//!   to the bundled default cover and the caller never sees an error. That
//!   failure mode therefore has no variant here.
//!
//! * A batch image upload fails as a whole if any one transfer fails.
//!   Placeholder shapes already inserted into the canvas stay unresolved;
//!   there is no compensating rollback.

use thiserror::Error;

/// All errors returned by the whiteboard-uploader library.
#[derive(Debug, Error)]
pub enum UploadError {
    // ── Transfer errors ───────────────────────────────────────────────────
    /// The object store finished the multipart transfer with a non-200
    /// transport status. The upload is not retried.
    #[error("object store transfer failed for '{path}': status {status}")]
    Transfer { path: String, status: u16 },

    /// The object store client failed before a transport status was
    /// available (connection refused, credentials rejected, ...).
    #[error("object store client error for '{path}': {detail}")]
    StoreClient { path: String, detail: String },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// Registering the conversion job with the task service failed.
    #[error("conversion task submission failed for '{url}': {detail}")]
    TaskSubmission { url: String, detail: String },

    /// The conversion service reported the job as failed.
    #[error("conversion failed for job '{job_id}'{}", detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    ConversionFailed {
        job_id: String,
        detail: Option<String>,
    },

    /// The conversion did not reach a terminal state within the polling
    /// ceiling. Equivalent to a conversion failure for the caller.
    #[error("conversion timed out after {secs}s for job '{job_id}'")]
    ConversionTimeout { job_id: String, secs: u64 },

    /// Polling the conversion service failed at the transport level.
    #[error("conversion poll failed for job '{job_id}': {detail}")]
    ConversionPoll { job_id: String, detail: String },

    /// The conversion finished but produced no scenes; there is nothing to
    /// commit and no first scene to activate.
    #[error("conversion for job '{job_id}' produced an empty scene list")]
    EmptySceneList { job_id: String },

    // ── State commit errors ───────────────────────────────────────────────
    /// Writing whiteboard state failed.
    #[error("whiteboard state commit failed: {detail}")]
    StateCommit { detail: String },

    // ── Image errors ──────────────────────────────────────────────────────
    /// An image file could not be decoded to obtain pixel dimensions.
    #[error("failed to decode image '{name}': {detail}")]
    ImageDecode { name: String, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_display_carries_status() {
        let e = UploadError::Transfer {
            path: "/room1/abc.pdf".into(),
            status: 503,
        };
        let msg = e.to_string();
        assert!(msg.contains("503"), "got: {msg}");
        assert!(msg.contains("/room1/abc.pdf"));
    }

    #[test]
    fn conversion_failed_display_with_and_without_detail() {
        let with = UploadError::ConversionFailed {
            job_id: "job-1".into(),
            detail: Some("renderer crashed".into()),
        };
        assert!(with.to_string().contains("renderer crashed"));

        let without = UploadError::ConversionFailed {
            job_id: "job-1".into(),
            detail: None,
        };
        assert!(without.to_string().ends_with("'job-1'"));
    }

    #[test]
    fn timeout_display() {
        let e = UploadError::ConversionTimeout {
            job_id: "job-2".into(),
            secs: 1200,
        };
        assert!(e.to_string().contains("1200s"));
    }
}
