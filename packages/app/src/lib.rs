#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod cli;
pub mod report;

use std::sync::Arc;

use anyhow::Context as _;
use review_app_engine::{Outcome, ReconciliationEngine};
use review_app_git_provider::GitProvider;
use review_app_github::{GitHubProvider, Normalized, normalize};
use review_app_heroku::HerokuDirectory;
use review_app_platform::ReviewAppDirectory;

pub use cli::Cli;
pub use report::Reporter;

/// One run: normalize the event, reconcile, report.
pub struct App {
    engine: ReconciliationEngine,
    reporter: Reporter,
}

impl App {
    #[must_use]
    pub const fn new(engine: ReconciliationEngine, reporter: Reporter) -> Self {
        Self { engine, reporter }
    }

    /// Wires the GitHub and Heroku clients described by `cli`.
    ///
    /// # Errors
    ///
    /// * If the configuration is invalid
    /// * If an HTTP client fails to build
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = cli.engine_config()?;

        let git: Arc<dyn GitProvider> = Arc::new(
            GitHubProvider::new()?
                .with_token(cli.github_token.clone())
                .with_base_url(cli.github_api_url.clone()),
        );

        let mut heroku = HerokuDirectory::new()?.with_base_url(cli.heroku_api_url.clone());
        if let Some(token) = &cli.heroku_api_token {
            heroku = heroku.with_token(token.clone());
        }
        let directory: Arc<dyn ReviewAppDirectory> = Arc::new(heroku);

        let reporter = Reporter::new(git.clone(), config.review_app_label_name.clone())
            .with_dispatch_event_type(cli.dispatch_event_type.clone())
            .with_output_path(cli.output_path.clone());

        Ok(Self::new(
            ReconciliationEngine::new(config, directory, git),
            reporter,
        ))
    }

    /// # Errors
    ///
    /// * If the payload cannot be normalized
    /// * If reconciliation fails
    /// * If reporting the outcome fails
    pub async fn handle_event(
        &self,
        event_name: &str,
        payload: &serde_json::Value,
    ) -> anyhow::Result<Outcome> {
        let req = match normalize(event_name, payload)? {
            Normalized::Change(req) => req,
            Normalized::Skip { reason } => {
                log::info!("Skipping: {reason}");
                return Ok(Outcome::Skipped { reason });
            }
        };

        log::info!(
            "Handling \"{}\" for PR #{} of {} at {}",
            req.action,
            req.pr_number,
            req.repo.full_name(),
            req.commit_sha
        );

        let outcome = self.engine.reconcile(&req).await?;
        self.reporter
            .report(&req, event_name, payload, &outcome)
            .await?;

        Ok(outcome)
    }
}

/// Reads the event named by `cli` and handles it.
///
/// # Errors
///
/// * If the event file cannot be read or parsed
/// * If handling the event fails
pub async fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    let app = App::from_cli(cli)?;

    let contents = std::fs::read_to_string(&cli.event_path)
        .with_context(|| format!("Failed to read event file {}", cli.event_path.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse event file {}", cli.event_path.display()))?;

    app.handle_event(&cli.event_name, &payload).await
}
