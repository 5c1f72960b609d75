//! Configuration for the upload manager.
//!
//! Every knob lives in [`UploadConfig`], built via its builder. Callers set
//! only what they care about; the defaults match the platform's production
//! values (20-minute conversion ceiling, 192×144 covers).

use std::time::Duration;

use crate::error::UploadError;

/// Hard wall-clock ceiling on one conversion wait.
pub const DEFAULT_CONVERSION_CEILING: Duration = Duration::from_secs(20 * 60);

/// Cover thumbnails are requested at this size.
pub const COVER_WIDTH: u32 = 192;
/// See [`COVER_WIDTH`].
pub const COVER_HEIGHT: u32 = 144;

/// Configuration for an [`crate::manager::UploadManager`].
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Origin of the conversion-task API, e.g. `https://api.example.com/v5`.
    pub api_origin: String,

    /// Optional region hint forwarded to the conversion service.
    pub region: Option<String>,

    /// Wall-clock ceiling on one conversion wait. Default: 20 minutes.
    ///
    /// Conversions that outlive the ceiling are terminal failures; the
    /// service may still finish the job server-side, but this pipeline run
    /// will never observe it.
    pub conversion_ceiling: Duration,

    /// Interval between conversion status polls. Default: 2 seconds.
    pub poll_interval: Duration,

    /// How many times a document-list commit is reapplied after a version
    /// conflict before giving up. Default: 3.
    ///
    /// This bounds the optimistic-concurrency loop only; network operations
    /// are never retried.
    pub commit_conflict_retries: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            api_origin: String::new(),
            region: None,
            conversion_ceiling: DEFAULT_CONVERSION_CEILING,
            poll_interval: Duration::from_secs(2),
            commit_conflict_retries: 3,
        }
    }
}

impl UploadConfig {
    /// Create a builder with `api_origin` set.
    pub fn builder(api_origin: impl Into<String>) -> UploadConfigBuilder {
        UploadConfigBuilder {
            config: UploadConfig {
                api_origin: api_origin.into(),
                ..Self::default()
            },
        }
    }
}

/// Builder for [`UploadConfig`].
#[derive(Debug)]
pub struct UploadConfigBuilder {
    config: UploadConfig,
}

impl UploadConfigBuilder {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = Some(region.into());
        self
    }

    pub fn conversion_ceiling(mut self, ceiling: Duration) -> Self {
        self.config.conversion_ceiling = ceiling;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn commit_conflict_retries(mut self, retries: u32) -> Self {
        self.config.commit_conflict_retries = retries;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<UploadConfig, UploadError> {
        let c = &self.config;
        if c.api_origin.is_empty() {
            return Err(UploadError::InvalidConfig("api_origin must be set".into()));
        }
        if c.conversion_ceiling.is_zero() {
            return Err(UploadError::InvalidConfig(
                "conversion_ceiling must be positive".into(),
            ));
        }
        if c.poll_interval.is_zero() {
            return Err(UploadError::InvalidConfig(
                "poll_interval must be positive".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = UploadConfig::builder("https://api.example.com/v5")
            .build()
            .unwrap();
        assert_eq!(config.conversion_ceiling, Duration::from_secs(1200));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.commit_conflict_retries, 3);
        assert!(config.region.is_none());
    }

    #[test]
    fn builder_rejects_empty_origin() {
        assert!(UploadConfig::builder("").build().is_err());
    }

    #[test]
    fn builder_rejects_zero_ceiling() {
        let result = UploadConfig::builder("https://api.example.com")
            .conversion_ceiling(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_sets_region() {
        let config = UploadConfig::builder("https://api.example.com")
            .region("cn-hz")
            .build()
            .unwrap();
        assert_eq!(config.region.as_deref(), Some("cn-hz"));
    }
}
