//! Heroku Platform API response bodies and their conversion into the
//! platform-neutral models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use review_app_platform_models::{
    AppInfo, Build, BuildStatus, DirectoryError, ReviewApp, ReviewAppStatus,
};

#[derive(Debug, Deserialize)]
pub struct HerokuRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct HerokuReviewApp {
    pub id: String,
    pub pr_number: u64,
    pub status: String,
    #[serde(default)]
    pub app: Option<HerokuRef>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct HerokuSourceBlob {
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HerokuBuild {
    pub id: String,
    pub app: HerokuRef,
    pub source_blob: HerokuSourceBlob,
    pub status: String,
    #[serde(default)]
    pub output_stream_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct HerokuApp {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl TryFrom<HerokuReviewApp> for ReviewApp {
    type Error = DirectoryError;

    fn try_from(value: HerokuReviewApp) -> Result<Self, Self::Error> {
        let status = ReviewAppStatus::from_str(&value.status).map_err(|_| {
            DirectoryError::Fatal(format!(
                "Unexpected review app status \"{}\" for review app {}",
                value.status, value.id
            ))
        })?;

        Ok(Self {
            id: value.id,
            pr_number: value.pr_number,
            status,
            app_id: value.app.map(|app| app.id),
            branch: value.branch,
            message: value.message,
            error_status: value.error_status,
            created_at: value.created_at,
        })
    }
}

impl TryFrom<HerokuBuild> for Build {
    type Error = DirectoryError;

    fn try_from(value: HerokuBuild) -> Result<Self, Self::Error> {
        let status = BuildStatus::from_str(&value.status).map_err(|_| {
            DirectoryError::Fatal(format!(
                "Unexpected build status \"{}\" for build {}",
                value.status, value.id
            ))
        })?;

        // Heroku keeps failure details in the build log only.
        let error_detail = match status {
            BuildStatus::Failed => Some(value.output_stream_url.map_or_else(
                || "build failed without output".to_string(),
                |url| format!("build output: {url}"),
            )),
            BuildStatus::Pending | BuildStatus::Succeeded => None,
        };

        Ok(Self {
            id: value.id,
            app_id: value.app.id,
            source_version: value.source_blob.version,
            status,
            error_detail,
            created_at: value.created_at,
        })
    }
}

impl From<HerokuApp> for AppInfo {
    fn from(value: HerokuApp) -> Self {
        Self {
            id: value.id,
            name: value.name,
            web_url: value.web_url,
        }
    }
}
