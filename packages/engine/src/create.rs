//! Asking for exactly one review app per pull request.
//!
//! The platform's create endpoint is not exactly-once under retries or
//! concurrent runs. An "already exists" answer is therefore taken as
//! success, and the existing app is adopted. Any other failure is returned
//! as-is and never retried, since a blind retry could create a second app.

use std::collections::BTreeMap;

use review_app_platform_models::{CreateOutcome, CreateReviewApp, ReviewApp, SourceBlob};
use review_app_pr_models::ChangeRequest;

use crate::{EngineError, ReconciliationEngine};

/// Builds the create request for `req`, deploying `archive_url`.
///
/// The commit is both the archive's reference and the version tag, so
/// builds can later be matched back to it.
#[must_use]
pub fn build_create_request(
    req: &ChangeRequest,
    pipeline_id: &str,
    archive_url: String,
) -> CreateReviewApp {
    let environment = req
        .source_repo_url
        .as_ref()
        .map(|url| BTreeMap::from([("GIT_REPO_URL".to_string(), url.clone())]))
        .unwrap_or_default();

    CreateReviewApp {
        branch: req.branch.clone(),
        pipeline: pipeline_id.to_string(),
        source_blob: SourceBlob {
            url: archive_url,
            version: req.commit_sha.clone(),
        },
        fork_repo_id: req.fork_repo_id(),
        pr_number: req.pr_number,
        environment,
    }
}

impl ReconciliationEngine {
    /// Creates the review app for `req`, or adopts the one that already
    /// exists.
    ///
    /// # Errors
    ///
    /// * If `req` comes from a fork and this run has no privileged context
    /// * If the source archive cannot be resolved
    /// * If the platform rejects the create call for any reason other than
    ///   an existing app
    /// * If the platform reported an existing app that cannot be found
    pub async fn create_or_adopt(&self, req: &ChangeRequest) -> Result<ReviewApp, EngineError> {
        if req.is_fork && !req.is_privileged() {
            return Err(EngineError::ForkNotPrivileged {
                pr_number: req.pr_number,
            });
        }

        log::debug!(
            "Fetching archive for {}@{}",
            req.repo.full_name(),
            req.commit_sha
        );
        let archive_url = self
            .git
            .get_tarball_url(&req.repo.owner, &req.repo.name, &req.commit_sha)
            .await
            .map_err(EngineError::GitHub)?;
        log::debug!("Fetched archive OK");

        let request = build_create_request(req, &self.config.pipeline_id, archive_url);
        log::info!(
            "Creating review app for PR #{} at {} on {}",
            req.pr_number,
            req.commit_sha,
            self.directory.provider_name()
        );

        match self.directory.create_review_app(&request).await? {
            CreateOutcome::Created(app) => {
                log::info!("Created review app {} for PR #{}", app.id, req.pr_number);
                Ok(app)
            }
            CreateOutcome::AlreadyExists => {
                log::warn!(
                    "Review app for PR #{} now seems to exist after previously not",
                    req.pr_number
                );
                self.directory
                    .find_review_app(&self.config.pipeline_id, req.pr_number)
                    .await?
                    .ok_or(EngineError::ConflictWithoutApp {
                        pr_number: req.pr_number,
                    })
            }
        }
    }
}
