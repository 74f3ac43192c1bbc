use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use review_app_git_provider::GitProvider;

#[derive(Default)]
struct Recorded {
    permission_lookups: Vec<String>,
    tarball_requests: Vec<String>,
    labels: Vec<(u64, Vec<String>)>,
    dispatches: Vec<(String, serde_json::Value)>,
}

/// A [`GitProvider`] answering from fixed data and recording every write.
///
/// Actors without a configured permission are reported as `none`, like a
/// non-collaborator on GitHub.
#[derive(Default)]
pub struct RecordingGitProvider {
    permissions: BTreeMap<String, String>,
    tarball_error: Option<String>,
    recorded: Mutex<Recorded>,
}

impl RecordingGitProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_permission(mut self, login: &str, permission: &str) -> Self {
        self.permissions
            .insert(login.to_string(), permission.to_string());
        self
    }

    #[must_use]
    pub fn with_tarball_error(mut self, message: &str) -> Self {
        self.tarball_error = Some(message.to_string());
        self
    }

    /// The archive URL handed out for a commit.
    #[must_use]
    pub fn tarball_url(owner: &str, repo: &str, sha: &str) -> String {
        format!("https://codeload.github.com/{owner}/{repo}/legacy.tar.gz/{sha}")
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn permission_lookups(&self) -> Vec<String> {
        self.recorded().permission_lookups.clone()
    }

    #[must_use]
    pub fn tarball_requests(&self) -> Vec<String> {
        self.recorded().tarball_requests.clone()
    }

    #[must_use]
    pub fn labels(&self) -> Vec<(u64, Vec<String>)> {
        self.recorded().labels.clone()
    }

    #[must_use]
    pub fn dispatches(&self) -> Vec<(String, serde_json::Value)> {
        self.recorded().dispatches.clone()
    }
}

#[async_trait::async_trait]
impl GitProvider for RecordingGitProvider {
    async fn get_collaborator_permission(
        &self,
        _owner: &str,
        _repo: &str,
        username: &str,
    ) -> anyhow::Result<String> {
        self.recorded().permission_lookups.push(username.to_string());
        Ok(self
            .permissions
            .get(username)
            .cloned()
            .unwrap_or_else(|| "none".to_string()))
    }

    async fn get_tarball_url(&self, owner: &str, repo: &str, sha: &str) -> anyhow::Result<String> {
        self.recorded().tarball_requests.push(sha.to_string());
        if let Some(message) = &self.tarball_error {
            anyhow::bail!("{message}");
        }
        Ok(Self::tarball_url(owner, repo, sha))
    }

    async fn add_labels(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        self.recorded().labels.push((number, labels.to_vec()));
        Ok(())
    }

    async fn dispatch(
        &self,
        _owner: &str,
        _repo: &str,
        event_type: &str,
        client_payload: serde_json::Value,
    ) -> anyhow::Result<()> {
        self.recorded()
            .dispatches
            .push((event_type.to_string(), client_payload));
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "recording"
    }
}
