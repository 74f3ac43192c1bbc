//! An in-memory review app directory.
//!
//! Apps and builds live in a shared store guarded by a mutex, so concurrent
//! creates race exactly like they would against the platform: the first one
//! wins and the others get [`CreateOutcome::AlreadyExists`]. Responses can
//! also be scripted per call to simulate an app or build progressing.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use review_app_platform::ReviewAppDirectory;
use review_app_platform_models::{
    AppInfo, Build, BuildStatus, CreateOutcome, CreateReviewApp, DirectoryError, ReviewApp,
    ReviewAppStatus,
};

/// A call made against [`InMemoryDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    List { pipeline_id: String },
    Create { request: CreateReviewApp },
    Delete { review_app_id: String },
    ListBuilds { app_id: String },
    GetApp { app_id: String },
}

#[derive(Default)]
struct State {
    apps: Vec<ReviewApp>,
    infos: BTreeMap<String, AppInfo>,
    builds: BTreeMap<String, Vec<Build>>,
    scripted_lists: VecDeque<Result<Vec<ReviewApp>, DirectoryError>>,
    scripted_builds: BTreeMap<String, VecDeque<Result<Vec<Build>, DirectoryError>>>,
    create_error: Option<DirectoryError>,
    build_on_create: Option<BuildStatus>,
    calls: Vec<DirectoryCall>,
}

#[derive(Default)]
pub struct InMemoryDirectory {
    state: Mutex<State>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an existing review app, plus its application if it has one.
    #[must_use]
    pub fn with_review_app(self, app: ReviewApp) -> Self {
        {
            let mut state = self.state();
            if let Some(app_id) = &app.app_id {
                state
                    .infos
                    .insert(app_id.clone(), app_info(app_id, app.pr_number));
            }
            state.apps.push(app);
        }
        self
    }

    #[must_use]
    pub fn with_builds(self, app_id: &str, builds: Vec<Build>) -> Self {
        self.state().builds.insert(app_id.to_string(), builds);
        self
    }

    /// Every create call fails with `error` instead of touching the store.
    #[must_use]
    pub fn with_create_error(self, error: DirectoryError) -> Self {
        self.state().create_error = Some(error);
        self
    }

    /// Newly created apps immediately get a build of the requested version
    /// with `status`.
    #[must_use]
    pub fn with_build_on_create(self, status: BuildStatus) -> Self {
        self.state().build_on_create = Some(status);
        self
    }

    /// Queues the answer to one `list_review_apps` call. Once the queue is
    /// drained, the store answers again.
    pub fn push_list_response(&self, response: Result<Vec<ReviewApp>, DirectoryError>) {
        self.state().scripted_lists.push_back(response);
    }

    /// Queues the answer to one `list_builds` call for `app_id`.
    pub fn push_builds_response(&self, app_id: &str, response: Result<Vec<Build>, DirectoryError>) {
        self.state()
            .scripted_builds
            .entry(app_id.to_string())
            .or_default()
            .push_back(response);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.state().calls.clone()
    }

    #[must_use]
    pub fn create_calls(&self) -> Vec<CreateReviewApp> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                DirectoryCall::Create { request } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn review_apps(&self) -> Vec<ReviewApp> {
        self.state().apps.clone()
    }

    /// Review apps for `pr_number` that are not errored or going away.
    #[must_use]
    pub fn live_review_apps(&self, pr_number: u64) -> Vec<ReviewApp> {
        self.state()
            .apps
            .iter()
            .filter(|app| app.pr_number == pr_number && app.is_live())
            .cloned()
            .collect()
    }
}

fn app_info(app_id: &str, pr_number: u64) -> AppInfo {
    let name = format!("review-pr-{pr_number}");
    AppInfo {
        id: app_id.to_string(),
        web_url: Some(format!("https://{name}.example.com/")),
        name,
    }
}

#[async_trait::async_trait]
impl ReviewAppDirectory for InMemoryDirectory {
    async fn list_review_apps(&self, pipeline_id: &str) -> Result<Vec<ReviewApp>, DirectoryError> {
        let mut state = self.state();
        state.calls.push(DirectoryCall::List {
            pipeline_id: pipeline_id.to_string(),
        });

        match state.scripted_lists.pop_front() {
            Some(response) => response,
            None => Ok(state.apps.clone()),
        }
    }

    async fn create_review_app(
        &self,
        request: &CreateReviewApp,
    ) -> Result<CreateOutcome, DirectoryError> {
        let mut state = self.state();
        state.calls.push(DirectoryCall::Create {
            request: request.clone(),
        });

        if let Some(error) = state.create_error.clone() {
            return Err(error);
        }

        if state
            .apps
            .iter()
            .any(|app| app.pr_number == request.pr_number && app.is_live())
        {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let app_id = uuid::Uuid::new_v4().to_string();
        let app = ReviewApp {
            id: uuid::Uuid::new_v4().to_string(),
            pr_number: request.pr_number,
            status: ReviewAppStatus::Created,
            app_id: Some(app_id.clone()),
            branch: Some(request.branch.clone()),
            message: None,
            error_status: None,
            created_at: Some(Utc::now()),
        };

        state
            .infos
            .insert(app_id.clone(), app_info(&app_id, request.pr_number));
        if let Some(status) = state.build_on_create {
            let build = Build {
                id: uuid::Uuid::new_v4().to_string(),
                app_id: app_id.clone(),
                source_version: Some(request.source_blob.version.clone()),
                status,
                error_detail: None,
                created_at: Some(Utc::now()),
            };
            state.builds.entry(app_id).or_default().push(build);
        }
        state.apps.push(app.clone());

        Ok(CreateOutcome::Created(app))
    }

    async fn delete_review_app(&self, review_app_id: &str) -> Result<(), DirectoryError> {
        let mut state = self.state();
        state.calls.push(DirectoryCall::Delete {
            review_app_id: review_app_id.to_string(),
        });

        let app = state
            .apps
            .iter_mut()
            .find(|app| app.id == review_app_id)
            .ok_or_else(|| DirectoryError::NotFound(format!("review app {review_app_id}")))?;
        app.status = ReviewAppStatus::Deleting;

        Ok(())
    }

    async fn list_builds(&self, app_id: &str) -> Result<Vec<Build>, DirectoryError> {
        let mut state = self.state();
        state.calls.push(DirectoryCall::ListBuilds {
            app_id: app_id.to_string(),
        });

        if let Some(response) = state
            .scripted_builds
            .get_mut(app_id)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }

        Ok(state.builds.get(app_id).cloned().unwrap_or_default())
    }

    async fn get_app(&self, app_id: &str) -> Result<AppInfo, DirectoryError> {
        let mut state = self.state();
        state.calls.push(DirectoryCall::GetApp {
            app_id: app_id.to_string(),
        });

        state
            .infos
            .get(app_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("app {app_id}")))
    }

    fn provider_name(&self) -> &str {
        "in-memory"
    }
}
