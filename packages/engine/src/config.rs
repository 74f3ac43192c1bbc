use std::time::Duration;

pub const DEFAULT_ALLOWED_PERMISSION_LEVELS: &[&str] = &["write", "admin"];
pub const DEFAULT_REVIEW_APP_LABEL_NAME: &str = "review-app";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Pipeline id must not be empty")]
    EmptyPipelineId,

    #[error("Max poll attempts must be at least 1")]
    ZeroPollAttempts,

    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("At least one allowed permission level is required")]
    EmptyAllowList,
}

/// Settings for one reconciliation run.
///
/// Built once per invocation and handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub pipeline_id: String,
    pub allowed_permission_levels: Vec<String>,
    pub review_app_label_name: String,
    pub poll_interval: Duration,
    /// How many non-terminal observations the poll loop tolerates before
    /// giving up.
    pub max_poll_attempts: u32,
}

impl EngineConfig {
    #[must_use]
    pub fn new(pipeline_id: String, max_poll_attempts: u32) -> Self {
        Self {
            pipeline_id,
            allowed_permission_levels: DEFAULT_ALLOWED_PERMISSION_LEVELS
                .iter()
                .map(ToString::to_string)
                .collect(),
            review_app_label_name: DEFAULT_REVIEW_APP_LABEL_NAME.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts,
        }
    }

    #[must_use]
    pub fn with_allowed_permission_levels(mut self, levels: Vec<String>) -> Self {
        self.allowed_permission_levels = levels;
        self
    }

    #[must_use]
    pub fn with_review_app_label_name(mut self, label_name: String) -> Self {
        self.review_app_label_name = label_name;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// # Errors
    ///
    /// * If the pipeline id is blank
    /// * If no poll attempt or a zero poll interval is configured
    /// * If the allow-list has no usable entry
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline_id.trim().is_empty() {
            return Err(ConfigError::EmptyPipelineId);
        }
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::ZeroPollAttempts);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self
            .allowed_permission_levels
            .iter()
            .all(|level| level.trim().is_empty())
        {
            return Err(ConfigError::EmptyAllowList);
        }
        Ok(())
    }
}
