mod helpers;

use helpers::{
    POLL_INTERVAL, SHA, at, build, default_git, harness, harness_with, payload, review_app,
};
use review_app_engine::{EngineError, PollState};
use review_app_platform_models::{BuildStatus, DirectoryError, ReviewAppStatus};
use review_app_pr_models::{ChangeRequest, PrAction, TriggerKind};
use review_app_testing::{DirectoryCall, InMemoryDirectory};

fn request() -> ChangeRequest {
    payload().change_request(PrAction::Synchronized, TriggerKind::PullRequest)
}

fn created_app_directory() -> InMemoryDirectory {
    InMemoryDirectory::new().with_review_app(review_app(
        "A1",
        ReviewAppStatus::Created,
        Some("app-1"),
    ))
}

#[test_log::test(tokio::test)]
async fn test_waits_through_provisioning_and_pending_build() {
    let directory = created_app_directory().with_builds(
        "app-1",
        vec![build("b1", "app-1", SHA, BuildStatus::Succeeded)],
    );
    directory.push_list_response(Ok(vec![review_app("A1", ReviewAppStatus::Creating, None)]));
    directory.push_list_response(Ok(vec![review_app("A1", ReviewAppStatus::Pending, None)]));
    directory.push_builds_response(
        "app-1",
        Ok(vec![build("b1", "app-1", SHA, BuildStatus::Pending)]),
    );
    let h = harness(directory);

    let deployed = h.engine.await_deployment(&request()).await.unwrap();

    assert_eq!(deployed.app_id(), "app-1");
    assert_eq!(deployed.build.status, BuildStatus::Succeeded);
    assert_eq!(h.sleeper.sleeps(), vec![POLL_INTERVAL; 3]);
}

#[test_log::test(tokio::test)]
async fn test_failed_build_terminates_with_detail() {
    let mut failed = build("b1", "app-1", SHA, BuildStatus::Failed);
    failed.error_detail = Some("build output: https://example.com/output".to_string());
    let h = harness(created_app_directory().with_builds("app-1", vec![failed]));

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    let EngineError::BuildFailed { build_id, detail, .. } = error else {
        panic!("expected a failed build");
    };
    assert_eq!(build_id, "b1");
    assert!(detail.contains("https://example.com/output"));
    assert!(h.sleeper.sleeps().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_no_matching_build_fails_without_polling() {
    let directory = created_app_directory().with_builds(
        "app-1",
        vec![build("b0", "app-1", "some-other-sha", BuildStatus::Pending)],
    );
    let h = harness(directory);

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    assert!(matches!(error, EngineError::NoMatchingBuild { .. }));
    assert!(h.sleeper.sleeps().is_empty());
    let build_lookups = h
        .directory
        .calls()
        .into_iter()
        .filter(|call| matches!(call, DirectoryCall::ListBuilds { .. }))
        .count();
    assert_eq!(build_lookups, 1);
}

#[test_log::test(tokio::test)]
async fn test_deleting_app_fails_fast() {
    let h = harness(InMemoryDirectory::new().with_review_app(review_app(
        "A1",
        ReviewAppStatus::Deleting,
        Some("app-1"),
    )));

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    assert!(matches!(error, EngineError::AppDeleting { .. }));
    assert!(h.sleeper.sleeps().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_errored_app_fails_fast_with_message() {
    let mut errored = review_app("A1", ReviewAppStatus::Errored, None);
    errored.message = Some("Pipeline is missing a test app".to_string());
    let h = harness(InMemoryDirectory::new().with_review_app(errored));

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    let EngineError::AppErrored { detail, .. } = error else {
        panic!("expected an errored app");
    };
    assert_eq!(detail, "Pipeline is missing a test app");
    assert!(h.sleeper.sleeps().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_created_without_app_id_fails() {
    let h = harness(InMemoryDirectory::new().with_review_app(review_app(
        "A1",
        ReviewAppStatus::Created,
        None,
    )));

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    assert!(matches!(error, EngineError::MissingAppId { .. }));
}

#[test_log::test(tokio::test)]
async fn test_app_not_visible_yet_is_retried() {
    let directory = created_app_directory().with_builds(
        "app-1",
        vec![build("b1", "app-1", SHA, BuildStatus::Succeeded)],
    );
    directory.push_list_response(Ok(vec![]));
    let h = harness(directory);

    h.engine.await_deployment(&request()).await.unwrap();

    assert_eq!(h.sleeper.sleeps().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_transient_faults_are_retried() {
    let directory = created_app_directory().with_builds(
        "app-1",
        vec![build("b1", "app-1", SHA, BuildStatus::Succeeded)],
    );
    directory.push_list_response(Err(DirectoryError::Transient("503".to_string())));
    directory.push_builds_response(
        "app-1",
        Err(DirectoryError::Transient("connection reset".to_string())),
    );
    let h = harness(directory);

    h.engine.await_deployment(&request()).await.unwrap();

    assert_eq!(h.sleeper.sleeps().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_fatal_fault_is_not_retried() {
    let directory = created_app_directory();
    directory.push_list_response(Err(DirectoryError::Fatal("401 Unauthorized".to_string())));
    let h = harness(directory);

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    assert!(matches!(error, EngineError::Directory(DirectoryError::Fatal(_))));
    assert!(h.sleeper.sleeps().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_gives_up_after_max_attempts() {
    let directory = InMemoryDirectory::new().with_review_app(review_app(
        "A1",
        ReviewAppStatus::Creating,
        None,
    ));
    let h = harness_with(directory, default_git(), 3);

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    assert!(matches!(
        error,
        EngineError::PollAttemptsExhausted {
            attempts: 3,
            state: "awaiting app",
            ..
        }
    ));
    assert_eq!(h.sleeper.sleeps().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_persistent_listing_faults_exhaust_attempts() {
    let directory = created_app_directory();
    for _ in 0..3 {
        directory.push_list_response(Err(DirectoryError::Transient("503".to_string())));
    }
    let h = harness_with(directory, default_git(), 3);

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    assert!(matches!(
        error,
        EngineError::PollAttemptsExhausted {
            attempts: 3,
            state: "awaiting app",
            ..
        }
    ));
    assert_eq!(h.sleeper.sleeps(), vec![POLL_INTERVAL; 2]);
    assert_eq!(h.directory.calls().len(), 3);
}

#[test_log::test(tokio::test)]
async fn test_persistent_build_faults_exhaust_attempts() {
    let directory = created_app_directory().with_builds(
        "app-1",
        vec![build("b1", "app-1", SHA, BuildStatus::Succeeded)],
    );
    for _ in 0..3 {
        directory.push_builds_response(
            "app-1",
            Err(DirectoryError::Transient("connection reset".to_string())),
        );
    }
    let h = harness_with(directory, default_git(), 3);

    let error = h.engine.await_deployment(&request()).await.unwrap_err();

    assert!(matches!(
        error,
        EngineError::PollAttemptsExhausted {
            attempts: 3,
            state: "awaiting build",
            ..
        }
    ));
    assert_eq!(h.sleeper.sleeps(), vec![POLL_INTERVAL; 2]);
    let build_listings = h
        .directory
        .calls()
        .into_iter()
        .filter(|call| matches!(call, DirectoryCall::ListBuilds { .. }))
        .count();
    assert_eq!(build_listings, 3);
}

#[test_log::test(tokio::test)]
async fn test_latest_build_for_commit_wins() {
    let mut retried = build("b2", "app-1", SHA, BuildStatus::Succeeded);
    retried.created_at = at(11);
    let directory = created_app_directory().with_builds(
        "app-1",
        vec![build("b1", "app-1", SHA, BuildStatus::Failed), retried],
    );
    let h = harness(directory);

    let deployed = h.engine.await_deployment(&request()).await.unwrap();

    assert_eq!(deployed.build.id, "b2");
}

#[test_log::test(tokio::test)]
async fn test_poll_step_advances_to_build_without_backoff() {
    let h = harness(created_app_directory());

    let step = h.engine.poll_step(&request(), PollState::AwaitingApp).await;

    assert!(!step.backoff);
    match step.state {
        PollState::AwaitingBuild { review_app, app_id } => {
            assert_eq!(review_app.id, "A1");
            assert_eq!(app_id, "app-1");
        }
        other => panic!("expected to await the build, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_poll_step_leaves_done_untouched() {
    let h = harness(created_app_directory());
    let done = PollState::Done(Err(EngineError::NoMatchingBuild {
        app_id: "app-1".to_string(),
        commit_sha: SHA.to_string(),
    }));

    let step = h.engine.poll_step(&request(), done).await;

    assert!(!step.backoff);
    assert!(matches!(
        step.state,
        PollState::Done(Err(EngineError::NoMatchingBuild { .. }))
    ));
    assert!(h.directory.calls().is_empty());
}
