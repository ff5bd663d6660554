mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fixture;
use serde_json::json;
use vlab_lms::errors::LmsError;
use vlab_lms::models::lab_sessions::entities::{SessionStatus, StopReason};
use vlab_lms::worksheet::{RunnerOptions, StorageSink, WorksheetPhase, WorksheetRunner};

fn fast_options() -> RunnerOptions {
    RunnerOptions {
        tick: Duration::from_millis(20),
        autosave_interval: Duration::from_millis(100),
    }
}

/// 轮询直到条件成立，最多等待 5 秒
async fn wait_until(runner: &WorksheetRunner, check: impl Fn(&vlab_lms::worksheet::WorksheetState) -> bool) {
    for _ in 0..250 {
        if check(&runner.state()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached, state: {:?}", runner.state());
}

#[tokio::test]
async fn runner_autosaves_and_submits_through_storage() {
    let f = fixture().await;
    let sink = Arc::new(StorageSink::new(f.storage.clone(), f.student.id, 3));
    let mut runner = WorksheetRunner::new(sink, f.lab.id, fast_options());

    let started = runner.start().await.unwrap();
    assert!(!started.is_resuming);
    assert_eq!(runner.state().phase, WorksheetPhase::InProgress);

    runner.set_response("length_m", json!("0.75"));
    wait_until(&runner, |s| !s.is_dirty() && s.last_saved_at.is_some()).await;

    // 自动保存的内容在恢复会话时返回
    let resumed = f
        .storage
        .start_session(f.lab.id, f.student.id, 3)
        .await
        .unwrap();
    assert!(resumed.is_resuming);
    assert_eq!(resumed.session.id, started.session.id);
    assert_eq!(resumed.autosave_data, Some(json!({"length_m": "0.75"})));

    runner.set_response("period_s", json!("1.74"));
    let submitted = runner.submit().await.unwrap();
    assert_eq!(submitted.session.status, SessionStatus::Submitted);
    assert_eq!(
        submitted.submission.responses,
        Some(json!({"length_m": "0.75", "period_s": "1.74"}))
    );

    let state = runner.state();
    assert_eq!(state.phase, WorksheetPhase::Submitted);
    assert!(!state.timer_active);

    // 提交后会话已以 submission 原因结束
    let stopped = f
        .storage
        .stop_session(
            f.lab.id,
            f.student.id,
            Some(started.session.id),
            StopReason::Manual,
        )
        .await
        .unwrap();
    assert!(stopped.already_ended);
    assert!(stopped.has_submission);

    let err = runner.submit().await.unwrap_err();
    assert!(matches!(err, LmsError::Conflict(_)));
}

#[tokio::test]
async fn runner_stop_keeps_session_resumable() {
    let f = fixture().await;
    let sink = Arc::new(StorageSink::new(f.storage.clone(), f.student.id, 3));
    let mut runner = WorksheetRunner::new(sink.clone(), f.lab.id, fast_options());

    let started = runner.start().await.unwrap();
    let stopped = runner.stop(StopReason::Navigation).await.unwrap();
    assert!(!stopped.already_ended);
    assert_eq!(stopped.session.status, SessionStatus::InProgress);
    assert_eq!(runner.state().phase, WorksheetPhase::Stopped);

    let mut again = WorksheetRunner::new(sink, f.lab.id, fast_options());
    let resumed = again.start().await.unwrap();
    assert!(resumed.is_resuming);
    assert_eq!(resumed.session.id, started.session.id);
    assert!(again.state().is_resuming);
}

#[tokio::test]
async fn runner_start_surfaces_enrollment_errors() {
    let f = fixture().await;
    let sink = Arc::new(StorageSink::new(f.storage.clone(), f.teacher.id, 3));
    let mut runner = WorksheetRunner::new(sink, f.lab.id, fast_options());

    let err = runner.start().await.unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));
    assert_eq!(runner.state().phase, WorksheetPhase::NotStarted);
}
