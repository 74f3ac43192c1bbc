use std::sync::Arc;
use std::time::Duration;

use review_app::{App, Reporter};
use review_app_engine::{EngineConfig, Outcome, ReconciliationEngine};
use review_app_platform_models::{BuildStatus, ReviewApp, ReviewAppStatus};
use review_app_testing::{InMemoryDirectory, PullRequestPayloadBuilder, RecordingGitProvider};

struct Fixture {
    app: App,
    directory: Arc<InMemoryDirectory>,
    git: Arc<RecordingGitProvider>,
    outputs: tempfile::NamedTempFile,
}

fn fixture(directory: InMemoryDirectory) -> Fixture {
    let directory = Arc::new(directory);
    let git = Arc::new(RecordingGitProvider::new().with_permission("maintainer", "admin"));
    let outputs = tempfile::NamedTempFile::new().unwrap();

    let config = EngineConfig::new("pipeline-1".to_string(), 3)
        .with_poll_interval(Duration::from_millis(1));
    let engine = ReconciliationEngine::new(config, directory.clone(), git.clone());
    let reporter = Reporter::new(git.clone(), "review-app".to_string())
        .with_output_path(Some(outputs.path().to_path_buf()));

    Fixture {
        app: App::new(engine, reporter),
        directory,
        git,
        outputs,
    }
}

fn payload() -> PullRequestPayloadBuilder {
    PullRequestPayloadBuilder::new("acme", "shop", 12).with_sender("maintainer")
}

#[test_log::test(tokio::test)]
async fn test_opened_writes_outputs_and_labels() {
    let f = fixture(InMemoryDirectory::new().with_build_on_create(BuildStatus::Succeeded));

    let outcome = f
        .app
        .handle_event("pull_request", &payload().build("opened"))
        .await
        .unwrap();

    let Outcome::Deployed { app, .. } = outcome else {
        panic!("expected a deployment");
    };
    let outputs = std::fs::read_to_string(f.outputs.path()).unwrap();
    assert!(outputs.contains(&format!("app_id={}\n", app.app_id())));
    assert!(outputs.contains("app_web_url=https://review-pr-12.example.com/\n"));
    assert!(outputs.contains(&format!("review_app_id={}\n", app.review_app.id)));
    assert_eq!(f.git.labels(), vec![(12, vec!["review-app".to_string()])]);
    assert_eq!(f.directory.create_calls().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_synchronize_does_not_label() {
    let f = fixture(InMemoryDirectory::new().with_build_on_create(BuildStatus::Succeeded));
    f.app
        .handle_event("pull_request", &payload().build("opened"))
        .await
        .unwrap();

    let outcome = f
        .app
        .handle_event("pull_request", &payload().build("synchronize"))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Deployed { label_pr: false, .. }));
    assert_eq!(f.git.labels().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_fork_is_rerouted_then_created_from_dispatch() {
    let f = fixture(InMemoryDirectory::new().with_build_on_create(BuildStatus::Succeeded));
    let builder = payload().with_fork("stranger");
    let original = builder.build("opened");

    let outcome = f.app.handle_event("pull_request", &original).await.unwrap();

    assert_eq!(outcome, Outcome::NeedsPrivilegedContext);
    assert!(f.directory.calls().is_empty());
    let dispatches = f.git.dispatches();
    assert_eq!(dispatches.len(), 1);
    assert_eq!(dispatches[0].0, "review-app");
    assert_eq!(
        dispatches[0].1,
        serde_json::json!({ "event_name": "pull_request", "payload": original })
    );

    let rerouted = builder.build_dispatch("review-app", "pull_request", "opened");
    let outcome = f
        .app
        .handle_event("repository_dispatch", &rerouted)
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Deployed { .. }));
    let creates = f.directory.create_calls();
    assert_eq!(creates.len(), 1);
    assert!(creates[0].fork_repo_id.is_some());
}

#[test_log::test(tokio::test)]
async fn test_irrelevant_events_are_skipped() {
    let f = fixture(InMemoryDirectory::new());

    let push = f
        .app
        .handle_event("push", &serde_json::json!({ "ref": "refs/heads/main" }))
        .await
        .unwrap();
    let edited = f
        .app
        .handle_event("pull_request", &payload().build("edited"))
        .await
        .unwrap();

    assert!(matches!(push, Outcome::Skipped { .. }));
    assert!(matches!(edited, Outcome::Skipped { .. }));
    assert!(f.directory.calls().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_unknown_action_fails() {
    let f = fixture(InMemoryDirectory::new());

    let result = f
        .app
        .handle_event("pull_request", &payload().build("exploded"))
        .await;

    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_closed_deletes_review_app() {
    let f = fixture(InMemoryDirectory::new().with_review_app(ReviewApp {
        id: "A1".to_string(),
        pr_number: 12,
        status: ReviewAppStatus::Created,
        app_id: Some("app-1".to_string()),
        branch: None,
        message: None,
        error_status: None,
        created_at: None,
    }));

    let outcome = f
        .app
        .handle_event("pull_request", &payload().build("closed"))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Deleted { .. }));
    assert!(f.directory.live_review_apps(12).is_empty());
}

#[test_log::test(tokio::test)]
async fn test_fork_close_is_rerouted_then_deleted_from_dispatch() {
    let f = fixture(InMemoryDirectory::new().with_review_app(ReviewApp {
        id: "A1".to_string(),
        pr_number: 12,
        status: ReviewAppStatus::Created,
        app_id: Some("app-1".to_string()),
        branch: None,
        message: None,
        error_status: None,
        created_at: None,
    }));
    let builder = payload().with_fork("stranger");

    let outcome = f
        .app
        .handle_event("pull_request", &builder.build("closed"))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::NeedsPrivilegedContext);
    assert!(f.directory.calls().is_empty());
    assert_eq!(f.git.dispatches().len(), 1);

    let rerouted = builder.build_dispatch("review-app", "pull_request", "closed");
    let outcome = f
        .app
        .handle_event("repository_dispatch", &rerouted)
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Deleted { .. }));
    assert!(f.directory.live_review_apps(12).is_empty());
}

#[test_log::test(tokio::test)]
async fn test_closed_without_app_fails_with_message() {
    let f = fixture(InMemoryDirectory::new());

    let error = f
        .app
        .handle_event("pull_request", &payload().build("closed"))
        .await
        .unwrap_err();

    assert_eq!(
        format!("{error:#}"),
        "Action \"closed\", yet no existing review app for PR #12"
    );
}
