use anyhow::{Context as _, Result};
use review_app_git_provider::GitProvider;
use review_app_github_models::{
    AddLabelsRequest, CollaboratorPermissionResponse, DispatchRequest,
};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

pub struct GitHubProvider {
    http_client: reqwest::Client,
    auth_token: Option<String>,
    base_url: String,
}

impl GitHubProvider {
    /// Create a new GitHub provider without authentication.
    ///
    /// Redirects are not followed: the tarball endpoint answers with a
    /// redirect whose target is the archive URL we want to hand out.
    ///
    /// # Errors
    ///
    /// * If the `reqwest::Client` fails to build.
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent("review-app")
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            http_client,
            auth_token: None,
            base_url: "https://api.github.com".to_string(),
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
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl GitProvider for GitHubProvider {
    async fn get_collaborator_permission(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}/collaborators/{}/permission",
            self.base_url,
            owner,
            repo,
            urlencoding::encode(username)
        );
        log::debug!("GET {url}");

        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            log::debug!("{username} is not a collaborator on {owner}/{repo}");
            return Ok("none".to_string());
        }

        if !status.is_success() {
            log::error!("GitHub API error: {}", response.text().await?);
            anyhow::bail!("GitHub API error: {status}");
        }

        let body: CollaboratorPermissionResponse = response.json().await?;
        Ok(body.permission)
    }

    async fn get_tarball_url(&self, owner: &str, repo: &str, sha: &str) -> Result<String> {
        let url = format!("{}/repos/{}/{}/tarball/{}", self.base_url, owner, repo, sha);
        log::debug!("GET {url}");

        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .context("Tarball redirect without a Location header")?
                .to_str()
                .context("Tarball Location header is not valid UTF-8")?;
            return Ok(location.to_string());
        }

        if !status.is_success() {
            log::error!("GitHub API error: {}", response.text().await?);
            anyhow::bail!("GitHub API error: {status}");
        }

        // Something in between already followed the redirect.
        Ok(response.url().to_string())
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/labels",
            self.base_url, owner, repo, number
        );
        log::debug!("POST {url}");

        let body = AddLabelsRequest {
            labels: labels.to_vec(),
        };
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            log::error!("GitHub API error: {}", response.text().await?);
            anyhow::bail!("GitHub API error: {status}");
        }

        Ok(())
    }

    async fn dispatch(
        &self,
        owner: &str,
        repo: &str,
        event_type: &str,
        client_payload: serde_json::Value,
    ) -> Result<()> {
        let url = format!("{}/repos/{}/{}/dispatches", self.base_url, owner, repo);
        log::debug!("POST {url}");

        let body = DispatchRequest {
            event_type: event_type.to_string(),
            client_payload,
        };
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            log::error!("GitHub API error: {}", response.text().await?);
            anyhow::bail!("GitHub API error: {status}");
        }

        Ok(())
    }

    fn provider_name(&self) -> &str {
        "github"
    }
}
