mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use common::{add_criterion, fixture};
use serde_json::{Value, json};
use vlab_lms::cache::{ObjectCache, object_cache::moka::MokaCacheWrapper};
use vlab_lms::models::users::entities::User;
use vlab_lms::routes;
use vlab_lms::utils::{json_error_handler, jwt::JwtUtils};

macro_rules! lab_app {
    ($storage:expr) => {
        test::init_service(
            App::new()
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::Data::new($storage.clone()))
                .app_data(web::Data::new(
                    Arc::new(MokaCacheWrapper::with_capacity(1_000, 300)) as Arc<dyn ObjectCache>
                ))
                .configure(routes::configure_lab_routes),
        )
        .await
    };
}

fn bearer(user: &User) -> (&'static str, String) {
    let token = JwtUtils::generate_access_token(user.id, &user.role.to_string()).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn annotate_post_and_put_recompute_over_http() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Data table", 5.0).await;
    let b = add_criterion(&f.storage, &f.lab, "Analysis", 10.0).await;
    let app = lab_app!(f.storage);
    let uri = format!("/api/v1/labs/{}/annotate/{}", f.lab.id, f.student.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&f.teacher))
        .set_json(json!({
            "criterion_id": a.id,
            "points_awarded": 4,
            "teacher_comment": "units missing",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total_score"], json!(4.0));
    assert_eq!(body["data"]["annotation"]["annotation_type"], "feedback");
    let annotation_id = body["data"]["annotation"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&f.teacher))
        .set_json(json!({
            "criterion_id": b.id,
            "points_awarded": 7,
            "teacher_comment": "good",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&f.teacher))
        .set_json(json!({
            "annotation_id": annotation_id,
            "points_awarded": 5,
            "annotation_type": "  rubric ",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["total_score"], json!(12.0));
    assert_eq!(body["data"]["annotation"]["annotation_type"], "rubric");
    assert_eq!(body["data"]["annotation"]["teacher_comment"], "units missing");

    // 缺少必填字段
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&f.teacher))
        .set_json(json!({"criterion_id": a.id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 学生不能评分，但可以读自己的批注
    let req = test::TestRequest::post()
        .uri(&uri)
        .insert_header(bearer(&f.student))
        .set_json(json!({
            "criterion_id": a.id,
            "points_awarded": 5,
            "teacher_comment": "self",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&f.student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["annotations"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn submit_distinguishes_autosave_from_final_over_http() {
    let f = fixture().await;
    let app = lab_app!(f.storage);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/labs/{}/start", f.lab.id))
        .insert_header(bearer(&f.student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let session_id = body["data"]["session"]["id"].as_i64().unwrap();

    let submit_uri = format!("/api/v1/labs/{}/submit", f.lab.id);

    // 前端发来的 camelCase 自动保存不能变成最终提交
    let req = test::TestRequest::post()
        .uri(&submit_uri)
        .insert_header(bearer(&f.student))
        .set_json(json!({
            "responses": {"period": "1.4"},
            "isAutosave": true,
            "sessionId": session_id,
            "elapsedSeconds": 30,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["is_autosave"], json!(true));
    assert_eq!(body["data"]["session"]["status"], "in_progress");
    assert_eq!(body["data"]["session"]["elapsed_seconds"], json!(30));

    // 写错字段名直接拒绝
    let req = test::TestRequest::post()
        .uri(&submit_uri)
        .insert_header(bearer(&f.student))
        .set_json(json!({"responses": {"period": "1.4"}, "autosave": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let session = f
        .storage
        .start_session(f.lab.id, f.student.id, 3)
        .await
        .unwrap();
    assert!(session.is_resuming);
    assert_eq!(session.autosave_data, Some(json!({"period": "1.4"})));

    let req = test::TestRequest::post()
        .uri(&submit_uri)
        .insert_header(bearer(&f.student))
        .set_json(json!({
            "responses": {"period": "1.42"},
            "is_autosave": false,
            "session_id": session_id,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["is_autosave"], json!(false));
    assert_eq!(body["data"]["session"]["status"], "submitted");
}

#[actix_web::test]
async fn score_roster_lists_each_graded_student() {
    let f = fixture().await;
    let a = add_criterion(&f.storage, &f.lab, "Method", 5.0).await;
    let app = lab_app!(f.storage);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/labs/{}/annotate/{}", f.lab.id, f.student.id))
        .insert_header(bearer(&f.teacher))
        .set_json(json!({
            "criterion_id": a.id,
            "points_awarded": 3,
            "teacher_comment": "ok",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let uri = format!("/api/v1/labs/{}/scores", f.lab.id);
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&f.teacher))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let roster = body["data"].as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["student_id"], json!(f.student.id));
    assert_eq!(roster[0]["manual_score"], json!(3.0));

    // 非授课教师和学生都看不到
    for user in [&f.other_teacher, &f.student] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(user))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
