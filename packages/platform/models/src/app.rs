use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle reported by the platform for a review app.
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
pub enum ReviewAppStatus {
    Pending,
    Creating,
    Created,
    Errored,
    Deleting,
    Deleted,
}

impl ReviewAppStatus {
    /// At most one live review app may exist per pull request.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Creating | Self::Created)
    }
}

/// Point-in-time view of a platform-owned review app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewApp {
    pub id: String,
    pub pr_number: u64,
    pub status: ReviewAppStatus,
    /// Id of the underlying application, assigned once provisioning got far
    /// enough to have one.
    pub app_id: Option<String>,
    pub branch: Option<String>,
    pub message: Option<String>,
    pub error_status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ReviewApp {
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.status.is_live()
    }
}

/// Details of the application backing a review app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    pub web_url: Option<String>,
}
