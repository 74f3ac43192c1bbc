use review_app_platform::ReviewAppDirectory;
use review_app_platform_models::{
    AppInfo, Build, CreateOutcome, CreateReviewApp, DirectoryError, ReviewApp,
};

use crate::models::{HerokuApp, HerokuBuild, HerokuReviewApp};

const ACCEPT: &str = "application/vnd.heroku+json; version=3";

pub struct HerokuDirectory {
    http_client: reqwest::Client,
    auth_token: Option<String>,
    base_url: String,
}

impl HerokuDirectory {
    /// Create a new Heroku directory without authentication.
    ///
    /// # Errors
    ///
    /// * If the `reqwest::Client` fails to build.
    pub fn new() -> Result<Self, DirectoryError> {
        let http_client = reqwest::Client::builder()
            .user_agent("review-app")
            .build()
            .map_err(|e| DirectoryError::Fatal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            auth_token: None,
            base_url: "https://api.heroku.com".to_string(),
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .http_client
            .request(method, url)
            .header("Accept", ACCEPT);

        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, DirectoryError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::error!("Heroku API error: {body}");
        Err(status_error(status, &body))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, DirectoryError> {
        log::debug!("GET {url}");
        let response = self.send(self.request(reqwest::Method::GET, url)).await?;
        response.json().await.map_err(transport_error)
    }
}

fn status_error(status: reqwest::StatusCode, body: &str) -> DirectoryError {
    let message = if body.is_empty() {
        format!("Heroku API error: {status}")
    } else {
        format!("Heroku API error: {status}: {body}")
    };

    match status.as_u16() {
        404 => DirectoryError::NotFound(message),
        409 => DirectoryError::Conflict(message),
        408 | 429 | 500..=599 => DirectoryError::Transient(message),
        _ => DirectoryError::Fatal(message),
    }
}

fn transport_error(error: reqwest::Error) -> DirectoryError {
    if error.is_decode() {
        DirectoryError::Fatal(format!("Unexpected Heroku API response: {error}"))
    } else if error.is_builder() {
        DirectoryError::Fatal(format!("Invalid Heroku API request: {error}"))
    } else {
        DirectoryError::Transient(format!("Heroku API request failed: {error}"))
    }
}

#[async_trait::async_trait]
impl ReviewAppDirectory for HerokuDirectory {
    async fn list_review_apps(&self, pipeline_id: &str) -> Result<Vec<ReviewApp>, DirectoryError> {
        let url = format!("{}/pipelines/{}/review-apps", self.base_url, pipeline_id);
        let apps: Vec<HerokuReviewApp> = self.get_json(&url).await?;
        log::debug!("Listed {} review apps for pipeline {pipeline_id}", apps.len());

        apps.into_iter().map(ReviewApp::try_from).collect()
    }

    async fn create_review_app(
        &self,
        request: &CreateReviewApp,
    ) -> Result<CreateOutcome, DirectoryError> {
        let url = format!("{}/review-apps", self.base_url);
        log::debug!("POST {url}");

        let result = self
            .send(self.request(reqwest::Method::POST, &url).json(request))
            .await;

        match result {
            Ok(response) => {
                let app: HerokuReviewApp = response.json().await.map_err(transport_error)?;
                Ok(CreateOutcome::Created(ReviewApp::try_from(app)?))
            }
            Err(DirectoryError::Conflict(message)) => {
                log::debug!("Review app for PR #{} already exists: {message}", request.pr_number);
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_review_app(&self, review_app_id: &str) -> Result<(), DirectoryError> {
        let url = format!("{}/review-apps/{}", self.base_url, review_app_id);
        log::debug!("DELETE {url}");

        self.send(self.request(reqwest::Method::DELETE, &url))
            .await
            .map(|_| ())
    }

    async fn list_builds(&self, app_id: &str) -> Result<Vec<Build>, DirectoryError> {
        let url = format!("{}/apps/{}/builds", self.base_url, app_id);
        let builds: Vec<HerokuBuild> = self.get_json(&url).await?;
        log::debug!("Listed {} builds for app {app_id}", builds.len());

        builds.into_iter().map(Build::try_from).collect()
    }

    async fn get_app(&self, app_id: &str) -> Result<AppInfo, DirectoryError> {
        let url = format!("{}/apps/{}", self.base_url, app_id);
        let app: HerokuApp = self.get_json(&url).await?;

        Ok(app.into())
    }

    fn provider_name(&self) -> &str {
        "heroku"
    }
}
