mod common;

use common::{add_criterion, fixture};
use vlab_lms::errors::LmsError;
use vlab_lms::models::lab_scores::{breakdown::summarize, requests::AnnotationUpsert};
use vlab_lms::models::labs::requests::CreateCriterionRequest;

#[tokio::test]
async fn criteria_are_ordered_and_locked_after_grading() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Setup", 4.0).await;
    let b = add_criterion(&f.storage, &f.lab, "Results", 6.0).await;
    assert_eq!(a.order_index, 0);
    assert_eq!(b.order_index, 1);

    let criteria = f.storage.list_criteria(f.lab.id).await.unwrap();
    assert_eq!(
        criteria.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![a.id, b.id]
    );
    assert!(!f.storage.lab_has_scores(f.lab.id).await.unwrap());

    f.storage
        .upsert_annotation(
            &f.teacher,
            f.lab.id,
            f.student.id,
            AnnotationUpsert {
                criterion_id: b.id,
                points_awarded: 3.0,
                teacher_comment: "half".into(),
                annotation_type: "feedback".into(),
            },
        )
        .await
        .unwrap();
    assert!(f.storage.lab_has_scores(f.lab.id).await.unwrap());

    let err = f
        .storage
        .create_criterion(
            f.lab.id,
            CreateCriterionRequest {
                criterion_name: "Late addition".into(),
                criterion_description: None,
                max_points: 2.0,
                order_index: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LmsError::Conflict(_)));
    assert_eq!(f.storage.list_criteria(f.lab.id).await.unwrap().len(), 2);

    let scores = f.storage.list_lab_scores(f.lab.id).await.unwrap();
    let summary = summarize(f.lab.id, &criteria, &scores);
    assert_eq!(summary.graded_count, 1);
    assert_eq!(summary.average_score, Some(3.0));
    assert_eq!(summary.criteria[0].annotated_count, 0);
    assert_eq!(summary.criteria[1].average_percentage, Some(50.0));
}
