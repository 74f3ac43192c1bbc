#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;

/// The git hosting side of a reconciliation run.
///
/// Covers the collaborators the engine and the outcome reporter talk to:
/// permission lookup, source archive resolution, labeling and dispatch
/// rerouting.
#[async_trait::async_trait]
pub trait GitProvider: Send + Sync {
    /// Collaborator permission level of `username` on the repository, e.g.
    /// `"admin"`, `"write"`, `"read"` or `"none"`.
    async fn get_collaborator_permission(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<String>;

    /// Time-limited download URL of a tarball of the repository at `sha`.
    async fn get_tarball_url(&self, owner: &str, repo: &str, sha: &str) -> Result<String>;

    /// Ensures every label in `labels` is present on issue or PR `number`.
    async fn add_labels(&self, owner: &str, repo: &str, number: u64, labels: &[String])
    -> Result<()>;

    /// Emits a `repository_dispatch` event carrying `client_payload`.
    async fn dispatch(
        &self,
        owner: &str,
        repo: &str,
        event_type: &str,
        client_payload: serde_json::Value,
    ) -> Result<()>;

    fn provider_name(&self) -> &str;
}
