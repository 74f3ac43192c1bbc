#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod client;
pub mod normalize;

pub use client::GitHubProvider;
pub use normalize::{NormalizeError, Normalized, normalize};
