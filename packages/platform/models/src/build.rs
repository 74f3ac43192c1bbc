use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

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
pub enum BuildStatus {
    Pending,
    Succeeded,
    Failed,
}

/// One deployment attempt of a specific source version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: String,
    pub app_id: String,
    pub source_version: Option<String>,
    pub status: BuildStatus,
    pub error_detail: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Build {
    #[must_use]
    pub fn is_for_version(&self, version: &str) -> bool {
        self.source_version.as_deref() == Some(version)
    }
}
