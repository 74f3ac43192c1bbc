use serde::{Deserialize, Serialize};

/// The pull request actions the reconciliation engine reacts to.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrAction {
    Opened,
    Reopened,
    #[serde(rename = "synchronize")]
    #[strum(serialize = "synchronize")]
    Synchronized,
    Labeled,
    Closed,
}

/// How the current invocation was triggered.
///
/// Only privileged triggers run with the deployment credentials, which
/// matters for pull requests opened from forks.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriggerKind {
    PullRequest,
    PullRequestTarget,
    RepositoryDispatch,
}

impl TriggerKind {
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::PullRequestTarget | Self::RepositoryDispatch)
    }
}
