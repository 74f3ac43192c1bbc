#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone as _, Utc};
use review_app_engine::{EngineConfig, ReconciliationEngine, Sleeper};
use review_app_platform_models::{Build, BuildStatus, ReviewApp, ReviewAppStatus};
use review_app_testing::{InMemoryDirectory, PullRequestPayloadBuilder, RecordingGitProvider};

pub const OWNER: &str = "acme";
pub const REPO: &str = "shop";
pub const PR_NUMBER: u64 = 12;
pub const SHA: &str = "abc123def456";
pub const MAINTAINER: &str = "maintainer";
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Records requested sleeps instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub struct Harness {
    pub engine: ReconciliationEngine,
    pub directory: Arc<InMemoryDirectory>,
    pub git: Arc<RecordingGitProvider>,
    pub sleeper: Arc<RecordingSleeper>,
}

pub fn harness(directory: InMemoryDirectory) -> Harness {
    harness_with(directory, default_git(), 10)
}

pub fn harness_with(
    directory: InMemoryDirectory,
    git: RecordingGitProvider,
    max_poll_attempts: u32,
) -> Harness {
    let directory = Arc::new(directory);
    let git = Arc::new(git);
    let sleeper = Arc::new(RecordingSleeper::default());
    let config = EngineConfig::new("pipeline-1".to_string(), max_poll_attempts)
        .with_poll_interval(POLL_INTERVAL);

    let engine = ReconciliationEngine::new(config, directory.clone(), git.clone())
        .with_sleeper(sleeper.clone());

    Harness {
        engine,
        directory,
        git,
        sleeper,
    }
}

pub fn default_git() -> RecordingGitProvider {
    RecordingGitProvider::new().with_permission(MAINTAINER, "write")
}

pub fn payload() -> PullRequestPayloadBuilder {
    PullRequestPayloadBuilder::new(OWNER, REPO, PR_NUMBER)
        .with_sha(SHA)
        .with_sender(MAINTAINER)
}

pub fn at(hour: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).single()
}

pub fn review_app(id: &str, status: ReviewAppStatus, app_id: Option<&str>) -> ReviewApp {
    ReviewApp {
        id: id.to_string(),
        pr_number: PR_NUMBER,
        status,
        app_id: app_id.map(str::to_string),
        branch: Some("feature-branch".to_string()),
        message: None,
        error_status: None,
        created_at: at(9),
    }
}

pub fn build(id: &str, app_id: &str, version: &str, status: BuildStatus) -> Build {
    Build {
        id: id.to_string(),
        app_id: app_id.to_string(),
        source_version: Some(version.to_string()),
        status,
        error_detail: None,
        created_at: at(10),
    }
}
