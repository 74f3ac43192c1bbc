#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Review app reconciliation.
//!
//! Given a normalized pull request event, decide whether its review app must
//! be created, waited on, or deleted, and carry that out against the
//! platform's review app directory.

pub mod auth;
pub mod config;
pub mod create;
pub mod error;
pub mod poll;
pub mod reconcile;
pub mod sleeper;

pub use auth::{AuthorizationDecision, decide};
pub use config::{ConfigError, EngineConfig};
pub use error::EngineError;
pub use poll::{DeployedApp, PollState, PollStep};
pub use reconcile::{Intent, Outcome, ReconciliationEngine, classify};
pub use sleeper::{Sleeper, TokioSleeper};
