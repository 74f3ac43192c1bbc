#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use review_app_platform_models::{
    AppInfo, Build, CreateOutcome, CreateReviewApp, DirectoryError, ReviewApp, ReviewAppStatus,
};

/// Client for the platform side of review apps.
///
/// Every call is a fresh request against the platform, which is the only
/// source of truth. Implementations must not cache between calls.
#[async_trait::async_trait]
pub trait ReviewAppDirectory: Send + Sync {
    async fn list_review_apps(&self, pipeline_id: &str) -> Result<Vec<ReviewApp>, DirectoryError>;

    /// Requests a new review app.
    ///
    /// An "already exists" answer from the platform must come back as
    /// [`CreateOutcome::AlreadyExists`], never as an error.
    async fn create_review_app(
        &self,
        request: &CreateReviewApp,
    ) -> Result<CreateOutcome, DirectoryError>;

    async fn delete_review_app(&self, review_app_id: &str) -> Result<(), DirectoryError>;

    async fn list_builds(&self, app_id: &str) -> Result<Vec<Build>, DirectoryError>;

    async fn get_app(&self, app_id: &str) -> Result<AppInfo, DirectoryError>;

    fn provider_name(&self) -> &str;

    /// Most recent non-deleted review app for `pr_number`, whatever its
    /// status.
    async fn find_review_app(
        &self,
        pipeline_id: &str,
        pr_number: u64,
    ) -> Result<Option<ReviewApp>, DirectoryError> {
        let apps = self.list_review_apps(pipeline_id).await?;
        Ok(latest_for_pr(apps, pr_number))
    }
}

/// Picks the most recently created, non-deleted review app for `pr_number`.
///
/// Records without a creation time sort before dated ones; among equals the
/// later entry in `apps` wins.
#[must_use]
pub fn latest_for_pr(apps: Vec<ReviewApp>, pr_number: u64) -> Option<ReviewApp> {
    apps.into_iter()
        .filter(|app| app.pr_number == pr_number && app.status != ReviewAppStatus::Deleted)
        .max_by_key(|app| app.created_at)
}

/// Picks the most recent build of exactly `version`.
#[must_use]
pub fn latest_build_for_version<'a>(builds: &'a [Build], version: &str) -> Option<&'a Build> {
    builds
        .iter()
        .filter(|build| build.is_for_version(version))
        .max_by_key(|build| build.created_at)
}
