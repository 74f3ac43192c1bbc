//! Turns whichever webhook delivered the run into a [`ChangeRequest`].
//!
//! This is the only place that looks at raw payloads. The engine works on
//! the normalized descriptor alone.

use std::str::FromStr;

use review_app_github_models::{PullRequestEventPayload, RepositoryDispatchPayload, ReroutedEvent};
use review_app_pr_models::{ChangeRequest, PrAction, RepoCoordinates, TriggerKind};

/// Pull request actions GitHub sends that never affect a review app.
const IGNORED_PR_ACTIONS: &[&str] = &[
    "assigned",
    "unassigned",
    "edited",
    "unlabeled",
    "review_requested",
    "review_request_removed",
    "ready_for_review",
    "converted_to_draft",
    "locked",
    "unlocked",
    "milestoned",
    "demilestoned",
    "auto_merge_enabled",
    "auto_merge_disabled",
    "enqueued",
    "dequeued",
];

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Malformed {event_name} payload: {source}")]
    Malformed {
        event_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected pull request action: {0}")]
    UnexpectedAction(String),

    #[error("Missing `{0}` in pull request payload")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Change(Box<ChangeRequest>),
    Skip { reason: String },
}

impl Normalized {
    fn skip(reason: impl Into<String>) -> Self {
        Self::Skip {
            reason: reason.into(),
        }
    }
}

/// # Errors
///
/// * If the payload does not have the shape of `event_name`
/// * If the pull request action is not one GitHub documents
/// * If a field the action requires is absent
pub fn normalize(
    event_name: &str,
    payload: &serde_json::Value,
) -> Result<Normalized, NormalizeError> {
    match event_name {
        "pull_request" => normalize_pull_request(TriggerKind::PullRequest, event_name, payload),
        "pull_request_target" => {
            normalize_pull_request(TriggerKind::PullRequestTarget, event_name, payload)
        }
        "repository_dispatch" => normalize_dispatch(payload),
        other => Ok(Normalized::skip(format!(
            "Not a pull request event: {other}"
        ))),
    }
}

fn normalize_dispatch(payload: &serde_json::Value) -> Result<Normalized, NormalizeError> {
    let dispatch: RepositoryDispatchPayload =
        serde_json::from_value(payload.clone()).map_err(|source| NormalizeError::Malformed {
            event_name: "repository_dispatch".to_string(),
            source,
        })?;

    let Ok(rerouted) = serde_json::from_value::<ReroutedEvent>(dispatch.client_payload) else {
        return Ok(Normalized::skip(format!(
            "repository_dispatch '{}' does not carry a pull request event",
            dispatch.action
        )));
    };

    match rerouted.event_name.as_str() {
        "pull_request" | "pull_request_target" => normalize_pull_request(
            TriggerKind::RepositoryDispatch,
            &rerouted.event_name,
            &rerouted.payload,
        ),
        other => Ok(Normalized::skip(format!(
            "repository_dispatch carries a non pull request event: {other}"
        ))),
    }
}

fn normalize_pull_request(
    trigger: TriggerKind,
    event_name: &str,
    payload: &serde_json::Value,
) -> Result<Normalized, NormalizeError> {
    let event: PullRequestEventPayload =
        serde_json::from_value(payload.clone()).map_err(|source| NormalizeError::Malformed {
            event_name: event_name.to_string(),
            source,
        })?;

    let action = match PrAction::from_str(&event.action) {
        Ok(action) => action,
        Err(_) if IGNORED_PR_ACTIONS.contains(&event.action.as_str()) => {
            return Ok(Normalized::skip(format!(
                "Pull request action '{}' does not affect review apps",
                event.action
            )));
        }
        Err(_) => return Err(NormalizeError::UnexpectedAction(event.action)),
    };

    let label_name = match action {
        PrAction::Labeled => Some(
            event
                .label
                .as_ref()
                .map(|label| label.name.clone())
                .ok_or(NormalizeError::MissingField("label"))?,
        ),
        _ => None,
    };

    let actor = event
        .sender
        .as_ref()
        .or(event.pull_request.user.as_ref())
        .map(|user| user.login.clone())
        .ok_or(NormalizeError::MissingField("sender"))?;

    let head = &event.pull_request.head;
    let base_repo_id = event.repository.id;
    // A deleted fork leaves `head.repo` null; treat it as untrusted.
    let is_fork = head
        .repo
        .as_ref()
        .is_none_or(|repo| repo.id != base_repo_id);

    if head.sha.is_empty() {
        return Err(NormalizeError::MissingField("pull_request.head.sha"));
    }

    let change = ChangeRequest {
        action,
        trigger,
        pr_number: event.number.unwrap_or(event.pull_request.number),
        branch: head.ref_name.clone(),
        commit_sha: head.sha.clone(),
        is_fork,
        source_repo_id: head.repo.as_ref().map(|repo| repo.id),
        source_repo_url: head.repo.as_ref().and_then(|repo| repo.html_url.clone()),
        label_name,
        actor,
        repo: RepoCoordinates::new(
            event.repository.owner.login.clone(),
            event.repository.name.clone(),
        ),
    };

    log::debug!(
        "Normalized {event_name} ({trigger}) into {} for PR #{} at {}",
        change.action,
        change.pr_number,
        change.commit_sha
    );

    Ok(Normalized::Change(Box::new(change)))
}
