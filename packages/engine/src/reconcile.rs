//! The decision table and the engine that carries it out.

use std::sync::Arc;

use review_app_git_provider::GitProvider;
use review_app_platform::ReviewAppDirectory;
use review_app_platform_models::{ReviewApp, ReviewAppStatus};
use review_app_pr_models::{ChangeRequest, PrAction};

use crate::{
    AuthorizationDecision, DeployedApp, EngineConfig, EngineError, Sleeper, TokioSleeper, decide,
};

/// What an event asks of the engine, before looking at the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Skip { reason: String },
    /// A fork event arrived in a run without secrets.
    RequirePrivilegedContext,
    /// Ensure an app exists, then wait for the commit to deploy.
    Provision,
    /// Wait for the commit to deploy on the existing app.
    Refresh,
    Teardown,
}

/// Maps an event onto an [`Intent`] without any I/O.
#[must_use]
pub fn classify(req: &ChangeRequest, config: &EngineConfig) -> Intent {
    if req.action == PrAction::Labeled {
        let label = req.label_name.as_deref().unwrap_or_default();
        if label != config.review_app_label_name {
            return Intent::Skip {
                reason: format!(
                    "Checked PR label: \"{label}\", not \"{}\", no action required",
                    config.review_app_label_name
                ),
            };
        }
    }

    if req.is_fork && !req.is_privileged() {
        return Intent::RequirePrivilegedContext;
    }

    match req.action {
        PrAction::Synchronized => Intent::Refresh,
        PrAction::Opened | PrAction::Reopened | PrAction::Labeled => Intent::Provision,
        PrAction::Closed => Intent::Teardown,
    }
}

/// Terminal result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped {
        reason: String,
    },
    /// The event must be re-emitted from a context that has secrets.
    NeedsPrivilegedContext,
    Deployed {
        app: Box<DeployedApp>,
        /// Whether the review app label should be put on the PR.
        label_pr: bool,
    },
    Deleted {
        review_app: ReviewApp,
    },
}

pub struct ReconciliationEngine {
    pub(crate) config: EngineConfig,
    pub(crate) directory: Arc<dyn ReviewAppDirectory>,
    pub(crate) git: Arc<dyn GitProvider>,
    pub(crate) sleeper: Arc<dyn Sleeper>,
}

impl ReconciliationEngine {
    #[must_use]
    pub fn new(
        config: EngineConfig,
        directory: Arc<dyn ReviewAppDirectory>,
        git: Arc<dyn GitProvider>,
    ) -> Self {
        Self {
            config,
            directory,
            git,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Looks up the actor's permission and checks it against the allow-list.
    ///
    /// # Errors
    ///
    /// * If the permission lookup fails
    pub async fn authorize(
        &self,
        req: &ChangeRequest,
    ) -> Result<AuthorizationDecision, EngineError> {
        let permission = self
            .git
            .get_collaborator_permission(&req.repo.owner, &req.repo.name, &req.actor)
            .await
            .map_err(EngineError::GitHub)?;

        let decision = decide(&permission, &self.config.allowed_permission_levels);
        log::debug!(
            "{} has permission \"{}\" on {} (allowed: {})",
            req.actor,
            decision.permission,
            req.repo.full_name(),
            decision.allowed
        );
        Ok(decision)
    }

    /// Brings the platform in line with `req`.
    ///
    /// # Errors
    ///
    /// * If any step of provisioning, polling or teardown fails
    pub async fn reconcile(&self, req: &ChangeRequest) -> Result<Outcome, EngineError> {
        let intent = classify(req, &self.config);
        log::debug!("PR #{} {} -> {intent:?}", req.pr_number, req.action);

        match intent {
            Intent::Skip { reason } => Ok(Outcome::Skipped { reason }),
            Intent::RequirePrivilegedContext => {
                log::info!("No secrets are available for PRs in forked repos.");
                Ok(Outcome::NeedsPrivilegedContext)
            }
            Intent::Teardown => self.teardown(req).await,
            Intent::Provision => match self.deny_reason(req).await? {
                Some(reason) => Ok(Outcome::Skipped { reason }),
                None => self.provision(req).await,
            },
            Intent::Refresh => match self.deny_reason(req).await? {
                Some(reason) => Ok(Outcome::Skipped { reason }),
                None => self.refresh(req).await,
            },
        }
    }

    async fn deny_reason(&self, req: &ChangeRequest) -> Result<Option<String>, EngineError> {
        let decision = self.authorize(req).await?;
        if decision.allowed {
            return Ok(None);
        }
        Ok(Some(format!(
            "{} has permission \"{}\", which is not one of {:?}",
            req.actor, decision.permission, self.config.allowed_permission_levels
        )))
    }

    async fn live_review_app(&self, req: &ChangeRequest) -> Result<Option<ReviewApp>, EngineError> {
        let found = self
            .directory
            .find_review_app(&self.config.pipeline_id, req.pr_number)
            .await?;
        Ok(found.filter(ReviewApp::is_live))
    }

    async fn provision(&self, req: &ChangeRequest) -> Result<Outcome, EngineError> {
        match self.live_review_app(req).await? {
            Some(app) => log::info!(
                "Review app {} for PR #{} already exists ({})",
                app.id,
                req.pr_number,
                app.status
            ),
            None => {
                self.create_or_adopt(req).await?;
            }
        }

        let app = self.await_deployment(req).await?;
        Ok(Outcome::Deployed {
            app: Box::new(app),
            label_pr: matches!(req.action, PrAction::Opened | PrAction::Reopened),
        })
    }

    async fn refresh(&self, req: &ChangeRequest) -> Result<Outcome, EngineError> {
        if self.live_review_app(req).await?.is_none() {
            return Ok(Outcome::Skipped {
                reason: format!("No review app for PR #{}, nothing to update", req.pr_number),
            });
        }

        let app = self.await_deployment(req).await?;
        Ok(Outcome::Deployed {
            app: Box::new(app),
            label_pr: false,
        })
    }

    async fn teardown(&self, req: &ChangeRequest) -> Result<Outcome, EngineError> {
        let Some(app) = self
            .directory
            .find_review_app(&self.config.pipeline_id, req.pr_number)
            .await?
        else {
            return Err(EngineError::NoReviewAppToDelete {
                pr_number: req.pr_number,
            });
        };

        if app.status == ReviewAppStatus::Deleting {
            log::info!("Review app {} is already being deleted", app.id);
            return Ok(Outcome::Deleted { review_app: app });
        }

        log::debug!("PR closed, deleting review app {}...", app.id);
        self.directory.delete_review_app(&app.id).await?;
        log::info!("PR closed, deleted review app {} OK", app.id);

        Ok(Outcome::Deleted { review_app: app })
    }
}
