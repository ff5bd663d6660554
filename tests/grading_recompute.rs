mod common;

use common::{add_criterion, create_lab, fixture};
use vlab_lms::errors::LmsError;
use vlab_lms::models::lab_scores::requests::{AnnotationPatch, AnnotationUpsert};

fn upsert(criterion_id: i64, points: f64, comment: &str) -> AnnotationUpsert {
    AnnotationUpsert {
        criterion_id,
        points_awarded: points,
        teacher_comment: comment.to_string(),
        annotation_type: "feedback".to_string(),
    }
}

#[tokio::test]
async fn rubric_scenario_recomputes_totals() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Data table", 5.0).await;
    let b = add_criterion(&f.storage, &f.lab, "Analysis", 10.0).await;

    f.storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(a.id, 4.0, "units missing"))
        .await
        .unwrap();
    let result = f
        .storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(b.id, 7.0, "good"))
        .await
        .unwrap();

    assert_eq!(result.total_score, 11.0);
    assert_eq!(result.rubric_breakdown[&a.id].percentage, 80.0);
    assert_eq!(result.rubric_breakdown[&b.id].percentage, 70.0);
    assert_eq!(result.annotation.criterion_name, "Analysis");
    assert_eq!(result.annotation.criterion_max_points, 10.0);

    // 覆盖同一细则的批注，而不是新增一条
    let result = f
        .storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(a.id, 5.0, "fixed"))
        .await
        .unwrap();
    assert_eq!(result.total_score, 12.0);
    assert_eq!(result.rubric_breakdown[&a.id].percentage, 100.0);
    assert_eq!(result.rubric_breakdown[&b.id].percentage, 70.0);

    // 不改任何字段再重算一次，结果不变
    let again = f
        .storage
        .update_annotation(
            &f.teacher,
            f.lab.id,
            f.student.id,
            AnnotationPatch {
                annotation_id: result.annotation.annotation.id,
                points_awarded: None,
                teacher_comment: None,
                annotation_type: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(again.total_score, 12.0);
    assert_eq!(again.rubric_breakdown, result.rubric_breakdown);

    let score = f
        .storage
        .get_lab_score(f.lab.id, f.student.id)
        .await
        .unwrap()
        .expect("score row");
    assert_eq!(score.manual_score, 12.0);
    assert_eq!(score.rubric_breakdown.len(), 2);
    assert_eq!(score.graded_by, Some(f.teacher.id));
    assert!(score.graded_at.is_some());

    let view = f
        .storage
        .get_annotations(&f.student, f.lab.id, f.student.id)
        .await
        .unwrap();
    assert_eq!(view.annotations.len(), 2);
    assert_eq!(view.annotations[0].criterion_name, "Data table");
    assert_eq!(view.annotations[0].annotation.points_awarded, 5.0);
    assert_eq!(view.criteria.len(), 2);
}

#[tokio::test]
async fn update_by_id_matches_upsert() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Hypothesis", 5.0).await;
    let b = add_criterion(&f.storage, &f.lab, "Conclusion", 10.0).await;

    let first = f
        .storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(a.id, 4.0, "ok"))
        .await
        .unwrap();
    f.storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(b.id, 7.0, "ok"))
        .await
        .unwrap();

    let patched = f
        .storage
        .update_annotation(
            &f.teacher,
            f.lab.id,
            f.student.id,
            AnnotationPatch {
                annotation_id: first.annotation.annotation.id,
                points_awarded: Some(5.0),
                teacher_comment: None,
                annotation_type: None,
            },
        )
        .await
        .unwrap();

    // 省略的字段保留原值
    assert_eq!(patched.annotation.annotation.teacher_comment, "ok");
    assert_eq!(patched.total_score, 12.0);

    let upserted = f
        .storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(a.id, 5.0, "ok"))
        .await
        .unwrap();
    assert_eq!(upserted.total_score, patched.total_score);
    assert_eq!(upserted.rubric_breakdown, patched.rubric_breakdown);
}

#[tokio::test]
async fn out_of_range_points_leave_score_unchanged() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Precision", 5.0).await;

    f.storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(a.id, 3.0, "ok"))
        .await
        .unwrap();
    let before = f.storage.get_lab_score(f.lab.id, f.student.id).await.unwrap();

    for bad in [5.5, -1.0, f64::NAN, f64::INFINITY] {
        let err = f
            .storage
            .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(a.id, bad, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, LmsError::Validation(_)), "{bad}: {err}");
    }

    let after = f.storage.get_lab_score(f.lab.id, f.student.id).await.unwrap();
    assert_eq!(before, after);

    // 边界值可以接受
    let result = f
        .storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(a.id, 5.0, "max"))
        .await
        .unwrap();
    assert_eq!(result.total_score, 5.0);
}

#[tokio::test]
async fn first_grade_out_of_range_creates_no_score() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Precision", 5.0).await;

    let err = f
        .storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(a.id, 6.0, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Validation(_)));
    assert!(f.storage.get_lab_score(f.lab.id, f.student.id).await.unwrap().is_none());
    assert!(!f.storage.lab_has_scores(f.lab.id).await.unwrap());
}

#[tokio::test]
async fn criterion_from_another_lab_is_not_found() {
    let f = fixture().await;
    let other_lab = create_lab(&f.storage, &f.course, &f.teacher, "Projectile Motion", true).await;
    let foreign = add_criterion(&f.storage, &other_lab, "Trajectory", 10.0).await;

    let err = f
        .storage
        .upsert_annotation(&f.teacher, f.lab.id, f.student.id, upsert(foreign.id, 2.0, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::NotFound(_)));
    assert!(f.storage.get_lab_score(f.lab.id, f.student.id).await.unwrap().is_none());
}

#[tokio::test]
async fn only_course_writers_can_grade() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Method", 5.0).await;

    let err = f
        .storage
        .upsert_annotation(&f.other_teacher, f.lab.id, f.student.id, upsert(a.id, 2.0, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));

    // 管理员不是授课教师也可以评分
    f.storage
        .upsert_annotation(&f.admin, f.lab.id, f.student.id, upsert(a.id, 2.0, "x"))
        .await
        .unwrap();

    let err = f
        .storage
        .get_annotations(&f.other_teacher, f.lab.id, f.student.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Forbidden(_)));
}

#[tokio::test]
async fn unknown_lab_or_student_is_not_found() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Method", 5.0).await;

    let err = f
        .storage
        .upsert_annotation(&f.teacher, 9_999, f.student.id, upsert(a.id, 1.0, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::NotFound(_)));

    let err = f
        .storage
        .upsert_annotation(&f.teacher, f.lab.id, 9_999, upsert(a.id, 1.0, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::NotFound(_)));
}

#[tokio::test]
async fn students_cannot_read_annotations_of_draft_labs() {
    let f = fixture().await;
    let draft = create_lab(&f.storage, &f.course, &f.teacher, "Free Fall", false).await;

    let err = f
        .storage
        .get_annotations(&f.student, draft.id, f.student.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::NotFound(_)));

    // 授课教师仍然可以看
    let view = f
        .storage
        .get_annotations(&f.teacher, draft.id, f.student.id)
        .await
        .unwrap();
    assert!(view.annotations.is_empty());
    assert!(view.score.is_none());
}
