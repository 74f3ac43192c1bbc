#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod action;
pub mod pr;

pub use action::{PrAction, TriggerKind};
pub use pr::{ChangeRequest, RepoCoordinates};
