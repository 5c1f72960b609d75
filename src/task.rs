//! Conversion-task service client.
//!
//! Two operations against the whiteboard platform's HTTP API: register a
//! conversion job for an uploaded document, and request a thumbnail
//! ("cover") screenshot of a committed scene. [`TaskOperator`] is the seam
//! the pipeline depends on; [`HttpTaskOperator`] is the reqwest-backed
//! production implementation.
//!
//! Cover fetches are best-effort by design: the pipeline swallows
//! [`CoverFetchError`] and falls back to the bundled default cover, so that
//! error type never reaches the library's public error surface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::UploadError;
use crate::model::ConversionJob;

/// A fetched cover thumbnail.
#[derive(Debug, Clone, Deserialize)]
pub struct Cover {
    pub url: String,
}

/// Non-fatal failure of a cover fetch. Absorbed inside the pipeline.
#[derive(Debug, Error)]
#[error("cover fetch failed for '{scene_path}': {detail}")]
pub struct CoverFetchError {
    pub scene_path: String,
    pub detail: String,
}

/// Client for the conversion-task service.
#[async_trait]
pub trait TaskOperator: Send + Sync {
    /// Register a conversion job for the document at `document_url`.
    async fn create_task(&self, document_url: &str) -> Result<ConversionJob, UploadError>;

    /// Request a `width`×`height` screenshot of `scene_path` in the room
    /// owned by `owner_id`, authorised by `room_token`.
    async fn get_cover(
        &self,
        owner_id: &str,
        scene_path: &str,
        width: u32,
        height: u32,
        room_token: &str,
    ) -> Result<Cover, CoverFetchError>;
}

// ── HTTP implementation ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest<'a> {
    resource: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskResponse {
    uuid: String,
    task_token: String,
}

#[derive(Debug, Serialize)]
struct CoverRequest<'a> {
    path: &'a str,
    width: u32,
    height: u32,
}

/// [`TaskOperator`] backed by the platform's HTTP API.
pub struct HttpTaskOperator {
    client: reqwest::Client,
    api_origin: String,
    region: Option<String>,
}

impl HttpTaskOperator {
    pub fn new(api_origin: impl Into<String>, region: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_origin: api_origin.into(),
            region,
        }
    }
}

#[async_trait]
impl TaskOperator for HttpTaskOperator {
    async fn create_task(&self, document_url: &str) -> Result<ConversionJob, UploadError> {
        let endpoint = format!("{}/services/conversion/tasks", self.api_origin);
        let body = CreateTaskRequest {
            resource: document_url,
            region: self.region.as_deref(),
        };

        let submission_err = |detail: String| UploadError::TaskSubmission {
            url: document_url.to_string(),
            detail,
        };

        let response = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| submission_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(submission_err(format!("HTTP {status}")));
        }

        let parsed: CreateTaskResponse = response
            .json()
            .await
            .map_err(|e| submission_err(format!("malformed response: {e}")))?;

        debug!(job_id = %parsed.uuid, "conversion task registered");
        Ok(ConversionJob {
            job_id: parsed.uuid,
            access_token: parsed.task_token,
        })
    }

    async fn get_cover(
        &self,
        owner_id: &str,
        scene_path: &str,
        width: u32,
        height: u32,
        room_token: &str,
    ) -> Result<Cover, CoverFetchError> {
        let endpoint = format!("{}/services/rooms/{owner_id}/screenshots", self.api_origin);
        let body = CoverRequest {
            path: scene_path,
            width,
            height,
        };

        let fetch_err = |detail: String| CoverFetchError {
            scene_path: scene_path.to_string(),
            detail,
        };

        let response = self
            .client
            .post(&endpoint)
            .header("token", room_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| fetch_err(format!("malformed response: {e}")))
    }
}
