use review_app_platform_models::{DirectoryError, ReviewAppStatus};

/// Every way a reconciliation run can fail.
///
/// Skips are not errors; they are reported through
/// [`crate::Outcome::Skipped`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("GitHub request failed: {0:#}")]
    GitHub(anyhow::Error),

    #[error("Review app {review_app_id} for PR #{pr_number} is being deleted")]
    AppDeleting {
        pr_number: u64,
        review_app_id: String,
    },

    #[error("Review app {review_app_id} for PR #{pr_number} errored: {detail}")]
    AppErrored {
        pr_number: u64,
        review_app_id: String,
        detail: String,
    },

    #[error("Unexpected review app status \"{status}\" for review app {review_app_id}: no app id")]
    MissingAppId {
        review_app_id: String,
        status: ReviewAppStatus,
    },

    #[error("No existing build for app ID {app_id} matches version {commit_sha}")]
    NoMatchingBuild { app_id: String, commit_sha: String },

    #[error("Build {build_id} of version {commit_sha} failed: {detail}")]
    BuildFailed {
        build_id: String,
        commit_sha: String,
        detail: String,
    },

    #[error("Action \"closed\", yet no existing review app for PR #{pr_number}")]
    NoReviewAppToDelete { pr_number: u64 },

    #[error("Creating a review app for PR #{pr_number} reported a conflict, but no app was found")]
    ConflictWithoutApp { pr_number: u64 },

    #[error("Fork PR #{pr_number} must be handled from a privileged context")]
    ForkNotPrivileged { pr_number: u64 },

    #[error("Gave up on PR #{pr_number} after {attempts} poll attempts while {state}")]
    PollAttemptsExhausted {
        pr_number: u64,
        attempts: u32,
        state: &'static str,
    },
}

impl EngineError {
    /// Whether asking the platform again may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Directory(e) if e.is_transient())
    }
}
