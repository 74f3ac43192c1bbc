use serde::{Deserialize, Serialize};

use crate::action::{PrAction, TriggerKind};

/// Base repository coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
}

impl RepoCoordinates {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Canonical description of one pull request event.
///
/// `commit_sha` is the exact revision that must end up deployed. Anything
/// that polls for a deployment compares against this value, never against
/// whatever happens to be the latest build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeRequest {
    pub action: PrAction,
    pub trigger: TriggerKind,
    pub pr_number: u64,
    pub branch: String,
    pub commit_sha: String,
    pub is_fork: bool,
    pub source_repo_id: Option<u64>,
    pub source_repo_url: Option<String>,
    pub label_name: Option<String>,
    pub actor: String,
    pub repo: RepoCoordinates,
}

impl ChangeRequest {
    /// Head repository id to hand to the platform, only set for forks.
    #[must_use]
    pub const fn fork_repo_id(&self) -> Option<u64> {
        if self.is_fork {
            self.source_repo_id
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.trigger.is_privileged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(is_fork: bool) -> ChangeRequest {
        ChangeRequest {
            action: PrAction::Opened,
            trigger: TriggerKind::PullRequest,
            pr_number: 7,
            branch: "feature".to_string(),
            commit_sha: "abc123".to_string(),
            is_fork,
            source_repo_id: Some(99),
            source_repo_url: Some("https://github.com/someone/repo".to_string()),
            label_name: None,
            actor: "someone".to_string(),
            repo: RepoCoordinates::new("owner", "repo"),
        }
    }

    #[test]
    fn test_fork_repo_id_only_for_forks() {
        assert_eq!(change(true).fork_repo_id(), Some(99));
        assert_eq!(change(false).fork_repo_id(), None);
    }

    #[test]
    fn test_full_name() {
        assert_eq!(RepoCoordinates::new("owner", "repo").full_name(), "owner/repo");
    }
}
