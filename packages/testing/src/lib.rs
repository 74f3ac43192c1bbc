#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

pub mod directory;
pub mod git;
pub mod payload;

pub use directory::{DirectoryCall, InMemoryDirectory};
pub use git::RecordingGitProvider;
pub use payload::PullRequestPayloadBuilder;
