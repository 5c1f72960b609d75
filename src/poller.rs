//! Conversion polling: wait for a registered job to reach a terminal state.
//!
//! [`ConversionPoller`] is the seam the pipeline blocks on. Native progress
//! arrives through a plain callback carrying the service's fractional value;
//! success, failure, and timeout are expressed through the returned
//! `Result`; the pipeline translates both into observer events.
//!
//! [`HttpConversionPoller`] is the production implementation: a bounded
//! polling loop against the conversion service with a hard wall-clock
//! ceiling (20 minutes by default, set at construction). Exceeding the
//! ceiling is terminal and indistinguishable from a conversion failure as
//! far as progress reporting is concerned.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::UploadError;
use crate::model::{ConversionJob, DocumentKind, SceneDefinition, ScenePpt};

/// Native conversion progress, `0.0..=1.0`.
pub type ConversionProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// Blocks until a conversion job reaches a terminal state.
#[async_trait]
pub trait ConversionPoller: Send + Sync {
    /// Wait for `job` to finish, invoking `on_progress` with each native
    /// progress value observed along the way.
    ///
    /// Returns the finished document's scene list on success. Failure and
    /// timeout surface as [`UploadError::ConversionFailed`] and
    /// [`UploadError::ConversionTimeout`].
    async fn wait_until_terminal(
        &self,
        job: &ConversionJob,
        kind: DocumentKind,
        on_progress: ConversionProgressFn<'_>,
    ) -> Result<Vec<SceneDefinition>, UploadError>;
}

// ── HTTP implementation ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskStatusResponse {
    status: TaskStatus,
    #[serde(default)]
    failed_reason: Option<String>,
    #[serde(default)]
    progress: Option<TaskProgress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum TaskStatus {
    Waiting,
    Converting,
    Finished,
    Fail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskProgress {
    #[serde(default)]
    converted_percentage: f64,
    #[serde(default)]
    converted_file_list: Vec<ConvertedFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertedFile {
    width: f64,
    height: f64,
    conversion_file_url: String,
}

/// [`ConversionPoller`] backed by the conversion service's status endpoint.
pub struct HttpConversionPoller {
    client: reqwest::Client,
    api_origin: String,
    region: Option<String>,
    ceiling: Duration,
    poll_interval: Duration,
}

impl HttpConversionPoller {
    pub fn new(
        api_origin: impl Into<String>,
        region: Option<String>,
        ceiling: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_origin: api_origin.into(),
            region,
            ceiling,
            poll_interval,
        }
    }

    async fn fetch_status(
        &self,
        job: &ConversionJob,
        kind: DocumentKind,
    ) -> Result<TaskStatusResponse, UploadError> {
        let kind_param = match kind {
            DocumentKind::Static => "static",
            DocumentKind::Dynamic => "dynamic",
        };
        let mut endpoint = format!(
            "{}/services/conversion/tasks/{}?type={kind_param}",
            self.api_origin, job.job_id
        );
        if let Some(ref region) = self.region {
            endpoint.push_str(&format!("&region={region}"));
        }

        let poll_err = |detail: String| UploadError::ConversionPoll {
            job_id: job.job_id.clone(),
            detail,
        };

        let response = self
            .client
            .get(&endpoint)
            .header("token", &job.access_token)
            .send()
            .await
            .map_err(|e| poll_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(poll_err(format!("HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| poll_err(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl ConversionPoller for HttpConversionPoller {
    async fn wait_until_terminal(
        &self,
        job: &ConversionJob,
        kind: DocumentKind,
        on_progress: ConversionProgressFn<'_>,
    ) -> Result<Vec<SceneDefinition>, UploadError> {
        let started = Instant::now();

        loop {
            let snapshot = self.fetch_status(job, kind).await?;

            if let Some(ref progress) = snapshot.progress {
                on_progress(progress_fraction(progress.converted_percentage));
            }

            match snapshot.status {
                TaskStatus::Finished => {
                    let files = snapshot
                        .progress
                        .map(|p| p.converted_file_list)
                        .unwrap_or_default();
                    debug!(job_id = %job.job_id, scenes = files.len(), "conversion finished");
                    return Ok(scenes_from_files(files));
                }
                TaskStatus::Fail => {
                    warn!(job_id = %job.job_id, "conversion reported failure");
                    return Err(UploadError::ConversionFailed {
                        job_id: job.job_id.clone(),
                        detail: snapshot.failed_reason,
                    });
                }
                TaskStatus::Waiting | TaskStatus::Converting => {}
            }

            if started.elapsed() >= self.ceiling {
                return Err(UploadError::ConversionTimeout {
                    job_id: job.job_id.clone(),
                    secs: self.ceiling.as_secs(),
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// The service reports percentages; observers get a fraction in `0..=1`
/// even when the reported value strays outside `0..=100`.
fn progress_fraction(percentage: f64) -> f64 {
    (percentage / 100.0).clamp(0.0, 1.0)
}

/// One scene per converted page, named by 1-based page number.
fn scenes_from_files(files: Vec<ConvertedFile>) -> Vec<SceneDefinition> {
    files
        .into_iter()
        .enumerate()
        .map(|(index, file)| SceneDefinition {
            name: (index + 1).to_string(),
            ppt: Some(ScenePpt {
                src: file.conversion_file_url,
                width: file.width,
                height: file.height,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_parses_terminal_failure() {
        let parsed: TaskStatusResponse = serde_json::from_str(
            r#"{"status":"Fail","failedReason":"password protected"}"#,
        )
        .unwrap();
        assert_eq!(parsed.status, TaskStatus::Fail);
        assert_eq!(parsed.failed_reason.as_deref(), Some("password protected"));
    }

    #[test]
    fn status_response_parses_finished_file_list() {
        let parsed: TaskStatusResponse = serde_json::from_str(
            r#"{
                "status": "Finished",
                "progress": {
                    "convertedPercentage": 100,
                    "convertedFileList": [
                        {"width": 1280, "height": 720, "conversionFileUrl": "https://cdn/1.png"},
                        {"width": 1280, "height": 720, "conversionFileUrl": "https://cdn/2.png"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let files = parsed.progress.unwrap().converted_file_list;
        let scenes = scenes_from_files(files);
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].name, "1");
        assert_eq!(scenes[1].name, "2");
        assert_eq!(scenes[0].ppt.as_ref().unwrap().src, "https://cdn/1.png");
    }

    #[test]
    fn out_of_range_percentage_is_clamped_to_unit_fraction() {
        let parsed: TaskStatusResponse = serde_json::from_str(
            r#"{"status":"Converting","progress":{"convertedPercentage":120}}"#,
        )
        .unwrap();
        let pct = parsed.progress.unwrap().converted_percentage;
        assert_eq!(progress_fraction(pct), 1.0);

        assert_eq!(progress_fraction(-5.0), 0.0);
        assert_eq!(progress_fraction(45.0), 0.45);
    }
}
