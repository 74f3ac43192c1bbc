use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app::ReviewApp;

/// Deployable artifact: an archive URL plus the version it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBlob {
    pub url: String,
    pub version: String,
}

/// Everything needed to ask the platform for a new review app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReviewApp {
    pub branch: String,
    pub pipeline: String,
    pub source_blob: SourceBlob,
    /// Only set for pull requests from forks. Never used as the app owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fork_repo_id: Option<u64>,
    pub pr_number: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// Result of a create call.
///
/// "Already exists" is a normal answer, not an error: callers adopt the
/// existing app instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(ReviewApp),
    AlreadyExists,
}
