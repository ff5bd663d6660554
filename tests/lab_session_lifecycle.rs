mod common;

use common::{create_lab, create_user, file_storage, fixture, fixture_on};
use serde_json::json;
use vlab_lms::errors::LmsError;
use vlab_lms::models::courses::entities::EnrollmentStatus;
use vlab_lms::models::lab_sessions::{
    entities::{SessionStatus, StopReason},
    requests::SubmitParams,
};
use vlab_lms::models::users::entities::UserRole;

const DEFAULT_MAX_ATTEMPTS: i32 = 3;

fn params(responses: serde_json::Value, is_autosave: bool, elapsed: Option<i64>) -> SubmitParams {
    SubmitParams {
        responses,
        is_autosave,
        session_id: None,
        elapsed_seconds: elapsed,
    }
}

#[tokio::test]
async fn start_twice_resumes_the_same_session() {
    let f = fixture().await;

    let first = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();
    assert!(!first.is_resuming);
    assert_eq!(first.attempts_used, 1);
    assert_eq!(first.max_attempts, 2);
    assert_eq!(first.session.status, SessionStatus::InProgress);

    f.storage
        .submit_session(
            f.lab.id,
            f.student.id,
            params(json!({"period": "1.42"}), true, Some(30)),
        )
        .await
        .unwrap();

    let again = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();
    assert!(again.is_resuming);
    assert_eq!(again.session.id, first.session.id);
    assert_eq!(again.attempts_used, 1);
    assert_eq!(again.autosave_data, Some(json!({"period": "1.42"})));
}

#[tokio::test]
async fn autosave_keeps_session_open_and_submit_closes_it() {
    let f = fixture().await;
    let started = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();

    let saved = f
        .storage
        .submit_session(f.lab.id, f.student.id, params(json!({"q1": "a"}), true, Some(60)))
        .await
        .unwrap();
    assert!(saved.is_autosave);
    assert_eq!(saved.session.status, SessionStatus::InProgress);
    assert_eq!(saved.submission.autosave_data, Some(json!({"q1": "a"})));
    assert!(saved.submission.submitted_at.is_none());

    let submitted = f
        .storage
        .submit_session(
            f.lab.id,
            f.student.id,
            SubmitParams {
                session_id: Some(started.session.id),
                ..params(json!({"q1": "b"}), false, Some(90))
            },
        )
        .await
        .unwrap();
    assert!(!submitted.is_autosave);
    assert_eq!(submitted.session.status, SessionStatus::Submitted);
    assert_eq!(submitted.submission.id, saved.submission.id);
    assert_eq!(submitted.submission.responses, Some(json!({"q1": "b"})));
    assert!(submitted.submission.submitted_at.is_some());

    // 已提交的会话不能再次提交
    let err = f
        .storage
        .submit_session(
            f.lab.id,
            f.student.id,
            SubmitParams {
                session_id: Some(started.session.id),
                ..params(json!({"q1": "c"}), false, None)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Conflict(_)));

    // 没有进行中的会话
    let err = f
        .storage
        .submit_session(f.lab.id, f.student.id, params(json!({}), true, None))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Validation(_)));

    let progress = f
        .storage
        .get_course_progress(f.student.id, f.course.id)
        .await
        .unwrap()
        .expect("progress row");
    assert_eq!(progress.completed_labs, 1);
}

#[tokio::test]
async fn elapsed_seconds_never_go_backwards() {
    let f = fixture().await;
    f.storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();

    let saved = f
        .storage
        .submit_session(f.lab.id, f.student.id, params(json!({}), true, Some(120)))
        .await
        .unwrap();
    assert_eq!(saved.session.elapsed_seconds, 120);

    let saved = f
        .storage
        .submit_session(f.lab.id, f.student.id, params(json!({}), true, Some(30)))
        .await
        .unwrap();
    assert_eq!(saved.session.elapsed_seconds, 120);

    let saved = f
        .storage
        .submit_session(f.lab.id, f.student.id, params(json!({}), true, Some(150)))
        .await
        .unwrap();
    assert_eq!(saved.session.elapsed_seconds, 150);
}

#[tokio::test]
async fn attempts_are_limited_per_lab() {
    let f = fixture().await;

    for _ in 0..2 {
        let started = f
            .storage
            .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
            .await
            .unwrap();
        assert!(!started.is_resuming);
        f.storage
            .submit_session(f.lab.id, f.student.id, params(json!({"q": 1}), false, None))
            .await
            .unwrap();
    }

    let err = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap_err();
    match err {
        LmsError::Validation(msg) => {
            assert_eq!(msg, "Maximum attempts (2) reached for this lab")
        }
        other => panic!("unexpected error: {other}"),
    }

    let progress = f
        .storage
        .get_course_progress(f.student.id, f.course.id)
        .await
        .unwrap()
        .expect("progress row");
    assert_eq!(progress.completed_labs, 2);
}

#[tokio::test]
async fn stop_records_time_and_start_resumes() {
    let f = fixture().await;
    let started = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();

    let stopped = f
        .storage
        .stop_session(f.lab.id, f.student.id, None, StopReason::Navigation)
        .await
        .unwrap();
    assert!(!stopped.already_ended);
    assert!(!stopped.has_submission);
    assert_eq!(stopped.reason, StopReason::Navigation);
    assert_eq!(stopped.session.status, SessionStatus::InProgress);
    assert!(stopped.session.end_time.is_some());
    assert_eq!(stopped.session.duration_minutes, Some(0));

    // 重复 stop 不会再次累计时长
    let again = f
        .storage
        .stop_session(
            f.lab.id,
            f.student.id,
            Some(started.session.id),
            StopReason::Manual,
        )
        .await
        .unwrap();
    assert!(again.already_ended);

    let resumed = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();
    assert!(resumed.is_resuming);
    assert_eq!(resumed.session.id, started.session.id);
    assert!(resumed.session.end_time.is_none());
    assert_eq!(resumed.session.duration_minutes, Some(0));

    let progress = f
        .storage
        .get_course_progress(f.student.id, f.course.id)
        .await
        .unwrap()
        .expect("progress row");
    assert_eq!(progress.time_spent_minutes, 0);
    assert_eq!(progress.completed_labs, 0);
}

#[tokio::test]
async fn stop_after_submit_reports_submission() {
    let f = fixture().await;
    let started = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();
    f.storage
        .submit_session(f.lab.id, f.student.id, params(json!({"q": 1}), false, None))
        .await
        .unwrap();

    let stopped = f
        .storage
        .stop_session(
            f.lab.id,
            f.student.id,
            Some(started.session.id),
            StopReason::Submission,
        )
        .await
        .unwrap();
    assert!(stopped.has_submission);
    assert_eq!(stopped.session.status, SessionStatus::Submitted);

    // 没有指定会话且没有进行中的会话
    let err = f
        .storage
        .stop_session(f.lab.id, f.student.id, None, StopReason::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Validation(_)));
}

#[tokio::test]
async fn sessions_belong_to_their_student() {
    let f = fixture().await;
    let started = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();

    let classmate = create_user(&f.storage, "wanda", UserRole::Student).await;
    f.storage
        .enroll_student(f.course.id, classmate.id, EnrollmentStatus::Enrolled)
        .await
        .unwrap();

    let err = f
        .storage
        .submit_session(
            f.lab.id,
            classmate.id,
            SubmitParams {
                session_id: Some(started.session.id),
                ..params(json!({}), true, None)
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::NotFound(_)));

    let err = f
        .storage
        .stop_session(
            f.lab.id,
            classmate.id,
            Some(started.session.id),
            StopReason::Manual,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::NotFound(_)));
}

#[tokio::test]
async fn access_requires_enrollment_and_published_lab() {
    let f = fixture().await;

    let outsider = create_user(&f.storage, "keesha", UserRole::Student).await;
    let err = f
        .storage
        .start_session(f.lab.id, outsider.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));

    f.storage
        .enroll_student(f.course.id, outsider.id, EnrollmentStatus::Dropped)
        .await
        .unwrap();
    let err = f
        .storage
        .start_session(f.lab.id, outsider.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));

    let draft = create_lab(&f.storage, &f.course, &f.teacher, "Draft", false).await;
    let err = f
        .storage
        .start_session(draft.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_starts_open_one_session() {
    let path = std::env::temp_dir().join(format!(
        "vlab-lms-concurrent-start-{}-{}.db",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    let f = fixture_on(file_storage(&path).await).await;

    let (a, b) = tokio::join!(
        f.storage.start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS),
        f.storage.start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS),
    );
    // SQLite 可能让输掉写锁的一方直接报错，但不能出现两条新会话
    let started: Vec<_> = [a, b].into_iter().filter_map(|r| r.ok()).collect();
    assert!(!started.is_empty());
    assert_eq!(started.iter().filter(|s| !s.is_resuming).count(), 1);
    assert!(started.iter().all(|s| s.session.id == started[0].session.id));

    let again = f
        .storage
        .start_session(f.lab.id, f.student.id, DEFAULT_MAX_ATTEMPTS)
        .await
        .unwrap();
    assert!(again.is_resuming);
    assert_eq!(again.session.id, started[0].session.id);
    assert_eq!(again.attempts_used, 1);

    drop(f);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
