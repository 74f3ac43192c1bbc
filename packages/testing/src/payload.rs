use review_app_pr_models::{ChangeRequest, PrAction, RepoCoordinates, TriggerKind};
use serde_json::json;

const BASE_REPO_ID: u64 = 1000;
const FORK_REPO_ID: u64 = 2000;

/// Builds pull request webhook payloads, and the [`ChangeRequest`] they
/// normalize into.
#[derive(Debug, Clone)]
pub struct PullRequestPayloadBuilder {
    owner: String,
    repo: String,
    pr_number: u64,
    sender: String,
    branch: String,
    sha: String,
    fork_owner: Option<String>,
    label: Option<String>,
}

impl PullRequestPayloadBuilder {
    #[must_use]
    pub fn new(owner: &str, repo: &str, pr_number: u64) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            pr_number,
            sender: "test-user".to_string(),
            branch: "feature-branch".to_string(),
            sha: "abc123def456".to_string(),
            fork_owner: None,
            label: None,
        }
    }

    #[must_use]
    pub fn with_sha(mut self, sha: &str) -> Self {
        self.sha = sha.to_string();
        self
    }

    #[must_use]
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    /// Makes the head repository a fork owned by `owner`.
    #[must_use]
    pub fn with_fork(mut self, owner: &str) -> Self {
        self.fork_owner = Some(owner.to_string());
        self
    }

    /// Label carried by `labeled` events.
    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    #[must_use]
    pub fn with_sender(mut self, login: &str) -> Self {
        self.sender = login.to_string();
        self
    }

    #[must_use]
    pub const fn pr_number(&self) -> u64 {
        self.pr_number
    }

    #[must_use]
    pub fn sha(&self) -> &str {
        &self.sha
    }

    /// A `pull_request` webhook body with the given raw `action`.
    #[must_use]
    pub fn build(&self, action: &str) -> serde_json::Value {
        let mut payload = json!({
            "action": action,
            "number": self.pr_number,
            "pull_request": {
                "number": self.pr_number,
                "title": "Test Pull Request",
                "state": if action == "closed" { "closed" } else { "open" },
                "head": {
                    "ref": self.branch,
                    "sha": self.sha,
                    "repo": self.head_repository(),
                },
                "base": {
                    "ref": "main",
                    "sha": "def456abc123",
                    "repo": self.base_repository(),
                },
                "user": self.user(),
            },
            "repository": self.base_repository(),
            "sender": self.user(),
        });

        if let Some(label) = &self.label {
            payload["label"] = json!({ "name": label, "color": "ededed" });
        }

        payload
    }

    /// A `repository_dispatch` body rerouting the `event_name` webhook
    /// built by [`Self::build`].
    #[must_use]
    pub fn build_dispatch(
        &self,
        event_type: &str,
        event_name: &str,
        action: &str,
    ) -> serde_json::Value {
        json!({
            "action": event_type,
            "client_payload": {
                "event_name": event_name,
                "payload": self.build(action),
            },
            "repository": self.base_repository(),
            "sender": self.user(),
        })
    }

    /// The descriptor the normalizer produces for this payload.
    #[must_use]
    pub fn change_request(&self, action: PrAction, trigger: TriggerKind) -> ChangeRequest {
        let head_owner = self.head_owner();
        ChangeRequest {
            action,
            trigger,
            pr_number: self.pr_number,
            branch: self.branch.clone(),
            commit_sha: self.sha.clone(),
            is_fork: self.fork_owner.is_some(),
            source_repo_id: Some(self.head_repo_id()),
            source_repo_url: Some(format!("https://github.com/{head_owner}/{}", self.repo)),
            label_name: match action {
                PrAction::Labeled => self.label.clone(),
                _ => None,
            },
            actor: self.sender.clone(),
            repo: RepoCoordinates::new(self.owner.clone(), self.repo.clone()),
        }
    }

    fn head_owner(&self) -> &str {
        self.fork_owner.as_deref().unwrap_or(&self.owner)
    }

    const fn head_repo_id(&self) -> u64 {
        if self.fork_owner.is_some() {
            FORK_REPO_ID
        } else {
            BASE_REPO_ID
        }
    }

    fn user(&self) -> serde_json::Value {
        json!({ "id": 12345, "login": self.sender })
    }

    fn base_repository(&self) -> serde_json::Value {
        json!({
            "id": BASE_REPO_ID,
            "name": self.repo,
            "full_name": format!("{}/{}", self.owner, self.repo),
            "owner": { "id": 1, "login": self.owner },
            "html_url": format!("https://github.com/{}/{}", self.owner, self.repo),
            "fork": false,
        })
    }

    fn head_repository(&self) -> serde_json::Value {
        let owner = self.head_owner();
        json!({
            "id": self.head_repo_id(),
            "name": self.repo,
            "full_name": format!("{owner}/{}", self.repo),
            "owner": { "id": 2, "login": owner },
            "html_url": format!("https://github.com/{owner}/{}", self.repo),
            "fork": self.fork_owner.is_some(),
        })
    }
}
