//! Side effects visible on the GitHub side once the engine is done.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use review_app_engine::Outcome;
use review_app_git_provider::GitProvider;
use review_app_pr_models::ChangeRequest;

pub struct Reporter {
    git: Arc<dyn GitProvider>,
    label_name: String,
    dispatch_event_type: String,
    output_path: Option<PathBuf>,
}

impl Reporter {
    #[must_use]
    pub fn new(git: Arc<dyn GitProvider>, label_name: String) -> Self {
        Self {
            git,
            label_name,
            dispatch_event_type: "review-app".to_string(),
            output_path: None,
        }
    }

    #[must_use]
    pub fn with_dispatch_event_type(mut self, event_type: String) -> Self {
        self.dispatch_event_type = event_type;
        self
    }

    #[must_use]
    pub fn with_output_path(mut self, output_path: Option<PathBuf>) -> Self {
        self.output_path = output_path;
        self
    }

    /// Publishes `outcome` for the event `event_name` carrying `payload`.
    ///
    /// # Errors
    ///
    /// * If labelling the PR or rerouting the event fails
    /// * If the outputs file cannot be written
    pub async fn report(
        &self,
        req: &ChangeRequest,
        event_name: &str,
        payload: &serde_json::Value,
        outcome: &Outcome,
    ) -> anyhow::Result<()> {
        match outcome {
            Outcome::Skipped { reason } => log::info!("Skipping: {reason}"),
            Outcome::NeedsPrivilegedContext => {
                log::info!(
                    "Rerouting PR #{} as a \"{}\" repository dispatch",
                    req.pr_number,
                    self.dispatch_event_type
                );
                let client_payload = serde_json::json!({
                    "event_name": event_name,
                    "payload": payload,
                });
                self.git
                    .dispatch(
                        &req.repo.owner,
                        &req.repo.name,
                        &self.dispatch_event_type,
                        client_payload,
                    )
                    .await
                    .context("Failed to reroute fork pull request")?;
            }
            Outcome::Deployed { app, label_pr } => {
                log::info!(
                    "Review app {} for PR #{} is up at {}",
                    app.review_app.id,
                    req.pr_number,
                    app.web_url().unwrap_or("<no web url>")
                );
                self.write_outputs(&[
                    ("app_id", app.app_id()),
                    ("app_web_url", app.web_url().unwrap_or_default()),
                    ("review_app_id", app.review_app.id.as_str()),
                ])?;

                if *label_pr {
                    log::debug!("Adding label \"{}\" to PR...", self.label_name);
                    self.git
                        .add_labels(
                            &req.repo.owner,
                            &req.repo.name,
                            req.pr_number,
                            std::slice::from_ref(&self.label_name),
                        )
                        .await
                        .context("Failed to label pull request")?;
                    log::info!("Added label \"{}\" to PR OK", self.label_name);
                }
            }
            Outcome::Deleted { review_app } => {
                log::info!(
                    "Review app {} for PR #{} deleted",
                    review_app.id,
                    req.pr_number
                );
            }
        }

        Ok(())
    }

    fn write_outputs(&self, outputs: &[(&str, &str)]) -> anyhow::Result<()> {
        let Some(path) = &self.output_path else {
            for (key, value) in outputs {
                log::info!("Output {key}={value}");
            }
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open outputs file {}", path.display()))?;
        for (key, value) in outputs {
            writeln!(file, "{key}={value}")
                .with_context(|| format!("Failed to write outputs file {}", path.display()))?;
        }

        Ok(())
    }
}
