use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use review_app_engine::EngineConfig;

/// Every option is also read from the environment, so the binary runs
/// unchanged as a CI step.
#[derive(Debug, Clone, Parser)]
#[command(name = "review-app")]
#[command(about = "Create, update and delete the review app of a pull request", long_about = None)]
pub struct Cli {
    /// Name of the webhook event that triggered the run.
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: String,

    /// File holding the webhook payload.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: PathBuf,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// Absent in runs triggered by forks, which get no secrets.
    #[arg(long, env = "HEROKU_API_TOKEN", hide_env_values = true)]
    pub heroku_api_token: Option<String>,

    #[arg(long, env = "HEROKU_API_URL", default_value = "https://api.heroku.com")]
    pub heroku_api_url: String,

    #[arg(long, env = "HEROKU_PIPELINE_ID")]
    pub heroku_pipeline_id: String,

    /// Comma separated permission levels allowed to create review apps.
    #[arg(long, env = "COLLABORATOR_PERMISSION", default_value = "write,admin")]
    pub collaborator_permission: String,

    #[arg(long, env = "REVIEW_APP_LABEL_NAME", default_value = "review-app")]
    pub review_app_label_name: String,

    #[arg(long, env = "POLL_INTERVAL_SECONDS", default_value_t = 5)]
    pub poll_interval_seconds: u64,

    #[arg(long, env = "MAX_POLL_ATTEMPTS")]
    pub max_poll_attempts: u32,

    /// Event type used when rerouting fork pull requests.
    #[arg(long, env = "DISPATCH_EVENT_TYPE", default_value = "review-app")]
    pub dispatch_event_type: String,

    /// File that step outputs are appended to.
    #[arg(long = "output-path", env = "GITHUB_OUTPUT")]
    pub output_path: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn allowed_permission_levels(&self) -> Vec<String> {
        parse_permission_levels(&self.collaborator_permission)
    }

    /// # Errors
    ///
    /// * If the resulting configuration is invalid
    pub fn engine_config(&self) -> Result<EngineConfig, review_app_engine::ConfigError> {
        let config = EngineConfig::new(self.heroku_pipeline_id.clone(), self.max_poll_attempts)
            .with_allowed_permission_levels(self.allowed_permission_levels())
            .with_review_app_label_name(self.review_app_label_name.clone())
            .with_poll_interval(Duration::from_secs(self.poll_interval_seconds));
        config.validate()?;
        Ok(config)
    }
}

fn parse_permission_levels(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .map(str::to_string)
        .collect()
}
