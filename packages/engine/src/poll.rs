//! Waiting for the requested commit to be deployed.
//!
//! The wait is an explicit state machine. Each [`ReconciliationEngine::poll_step`]
//! issues fresh queries against the directory and returns the next state,
//! plus whether the caller should back off before the next step. Terminal
//! states are reached immediately when the platform reports something that
//! will not resolve by waiting: an app being deleted or errored, a build
//! that failed, or no build at all for the requested commit.

use review_app_platform::latest_build_for_version;
use review_app_platform_models::{AppInfo, Build, BuildStatus, ReviewApp, ReviewAppStatus};
use review_app_pr_models::ChangeRequest;

use crate::{EngineError, ReconciliationEngine};

/// A review app whose build of the requested commit succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedApp {
    pub review_app: ReviewApp,
    pub app: AppInfo,
    pub build: Build,
}

impl DeployedApp {
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app.id
    }

    #[must_use]
    pub fn web_url(&self) -> Option<&str> {
        self.app.web_url.as_deref()
    }
}

#[derive(Debug)]
pub enum PollState {
    /// Waiting for the platform to finish provisioning the review app.
    AwaitingApp,
    /// Waiting for the build of the requested commit.
    AwaitingBuild {
        review_app: ReviewApp,
        app_id: String,
    },
    Done(Result<DeployedApp, EngineError>),
}

impl PollState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AwaitingApp => "awaiting app",
            Self::AwaitingBuild { .. } => "awaiting build",
            Self::Done(_) => "done",
        }
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

#[derive(Debug)]
pub struct PollStep {
    pub state: PollState,
    /// Wait one poll interval before the next step.
    pub backoff: bool,
}

impl PollStep {
    const fn wait(state: PollState) -> Self {
        Self {
            state,
            backoff: true,
        }
    }

    const fn advance(state: PollState) -> Self {
        Self {
            state,
            backoff: false,
        }
    }

    const fn done(result: Result<DeployedApp, EngineError>) -> Self {
        Self {
            state: PollState::Done(result),
            backoff: false,
        }
    }
}

impl ReconciliationEngine {
    /// Blocks until the build of `req.commit_sha` succeeds or fails.
    ///
    /// # Errors
    ///
    /// * If the review app is being deleted or errored
    /// * If no build matches the requested commit, or the build failed
    /// * If the platform keeps failing or the app stays pending for
    ///   `max_poll_attempts` observations
    pub async fn await_deployment(&self, req: &ChangeRequest) -> Result<DeployedApp, EngineError> {
        let mut state = PollState::AwaitingApp;
        let mut attempts = 0_u32;

        loop {
            let step = self.poll_step(req, state).await;
            state = match step.state {
                PollState::Done(result) => return result,
                other => other,
            };

            if !step.backoff {
                continue;
            }

            attempts += 1;
            if attempts >= self.config.max_poll_attempts {
                log::error!(
                    "PR #{} still {} after {attempts} attempts",
                    req.pr_number,
                    state.name()
                );
                return Err(EngineError::PollAttemptsExhausted {
                    pr_number: req.pr_number,
                    attempts,
                    state: state.name(),
                });
            }

            log::debug!(
                "PR #{} {} (attempt {attempts}/{}), retrying in {:?}",
                req.pr_number,
                state.name(),
                self.config.max_poll_attempts,
                self.config.poll_interval
            );
            self.sleeper.sleep(self.config.poll_interval).await;
        }
    }

    /// Runs one transition of the poll state machine.
    ///
    /// `PollState::Done` is absorbing and is returned unchanged.
    pub async fn poll_step(&self, req: &ChangeRequest, state: PollState) -> PollStep {
        match state {
            PollState::AwaitingApp => self.check_app(req).await,
            PollState::AwaitingBuild { review_app, app_id } => {
                self.check_build(req, review_app, app_id).await
            }
            done @ PollState::Done(_) => PollStep::advance(done),
        }
    }

    async fn check_app(&self, req: &ChangeRequest) -> PollStep {
        let found = match self
            .directory
            .find_review_app(&self.config.pipeline_id, req.pr_number)
            .await
        {
            Ok(found) => found,
            Err(e) if e.is_transient() => {
                log::warn!("Listing review apps failed, will retry: {e}");
                return PollStep::wait(PollState::AwaitingApp);
            }
            Err(e) => return PollStep::done(Err(e.into())),
        };

        let Some(app) = found else {
            log::debug!("Review app for PR #{} is not visible yet", req.pr_number);
            return PollStep::wait(PollState::AwaitingApp);
        };

        log::debug!(
            "Review app {} for PR #{} is {}",
            app.id,
            req.pr_number,
            app.status
        );

        match app.status {
            ReviewAppStatus::Pending | ReviewAppStatus::Creating => {
                PollStep::wait(PollState::AwaitingApp)
            }
            ReviewAppStatus::Deleting | ReviewAppStatus::Deleted => {
                PollStep::done(Err(EngineError::AppDeleting {
                    pr_number: req.pr_number,
                    review_app_id: app.id,
                }))
            }
            ReviewAppStatus::Errored => {
                let detail = app
                    .message
                    .clone()
                    .or_else(|| app.error_status.clone())
                    .unwrap_or_else(|| "no error provided".to_string());
                PollStep::done(Err(EngineError::AppErrored {
                    pr_number: req.pr_number,
                    review_app_id: app.id,
                    detail,
                }))
            }
            ReviewAppStatus::Created => match app.app_id.clone() {
                Some(app_id) => PollStep::advance(PollState::AwaitingBuild {
                    review_app: app,
                    app_id,
                }),
                None => PollStep::done(Err(EngineError::MissingAppId {
                    review_app_id: app.id,
                    status: app.status,
                })),
            },
        }
    }

    async fn check_build(
        &self,
        req: &ChangeRequest,
        review_app: ReviewApp,
        app_id: String,
    ) -> PollStep {
        let builds = match self.directory.list_builds(&app_id).await {
            Ok(builds) => builds,
            Err(e) if e.is_transient() => {
                log::warn!("Listing builds for app {app_id} failed, will retry: {e}");
                return PollStep::wait(PollState::AwaitingBuild { review_app, app_id });
            }
            Err(e) => return PollStep::done(Err(e.into())),
        };

        let Some(build) = latest_build_for_version(&builds, &req.commit_sha).cloned() else {
            log::error!(
                "Could not find build matching version {} among {} builds",
                req.commit_sha,
                builds.len()
            );
            return PollStep::done(Err(EngineError::NoMatchingBuild {
                app_id,
                commit_sha: req.commit_sha.clone(),
            }));
        };

        log::debug!(
            "Found build {} matching version {}: {}",
            build.id,
            req.commit_sha,
            build.status
        );

        match build.status {
            BuildStatus::Pending => {
                PollStep::wait(PollState::AwaitingBuild { review_app, app_id })
            }
            BuildStatus::Failed => PollStep::done(Err(EngineError::BuildFailed {
                build_id: build.id,
                commit_sha: req.commit_sha.clone(),
                detail: build
                    .error_detail
                    .unwrap_or_else(|| "no error provided".to_string()),
            })),
            BuildStatus::Succeeded => match self.directory.get_app(&app_id).await {
                Ok(app) => {
                    log::info!(
                        "Build {} of {} deployed to app {}",
                        build.id,
                        req.commit_sha,
                        app.id
                    );
                    PollStep::done(Ok(DeployedApp {
                        review_app,
                        app,
                        build,
                    }))
                }
                Err(e) if e.is_transient() => {
                    log::warn!("Fetching app {app_id} failed, will retry: {e}");
                    PollStep::wait(PollState::AwaitingBuild { review_app, app_id })
                }
                Err(e) => PollStep::done(Err(e.into())),
            },
        }
    }
}
