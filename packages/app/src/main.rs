#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::process::ExitCode;

use clap::Parser as _;
use review_app::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match review_app::run(&cli).await {
        Ok(outcome) => {
            log::info!("Done: {outcome:?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:?}");
            println!("::error::{e:#}");
            ExitCode::FAILURE
        }
    }
}
