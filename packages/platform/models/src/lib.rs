#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod build;
pub mod create;
pub mod error;

pub use app::{AppInfo, ReviewApp, ReviewAppStatus};
pub use build::{Build, BuildStatus};
pub use create::{CreateOutcome, CreateReviewApp, SourceBlob};
pub use error::DirectoryError;
