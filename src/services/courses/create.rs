use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::entities::NewActivityLog,
    common::response::error_response,
    courses::requests::CreateCourseRequest,
};
use crate::services::{activity::record_activity, missing_claims};

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    mut course_data: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    course_data.title = course_data.title.trim().to_string();
    let title_len = course_data.title.chars().count();
    if title_len == 0 || title_len > 200 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
            ErrorCode::BadRequest,
            "Title length must be between 1 and 200 characters",
        )));
    }

    // 教师只能为自己建课；管理员可指定授课教师
    let instructor_id = match course_data.instructor_id {
        Some(id) if user.role.is_admin() && id != user.id => {
            match storage.get_user_by_id(id).await {
                Ok(Some(instructor)) if instructor.role.can_grade() => instructor.id,
                Ok(Some(_)) => {
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                        ErrorCode::BadRequest,
                        "Instructor must be a teacher or admin",
                    )));
                }
                Ok(None) => {
                    return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                        ErrorCode::UserNotFound,
                        "Instructor not found",
                    )));
                }
                Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
            }
        }
        _ => user.id,
    };

    match storage.create_course(instructor_id, course_data).await {
        Ok(course) => {
            record_activity(
                &storage,
                NewActivityLog::new(user.id, "course_management", "create")
                    .details(serde_json::json!({
                        "title": course.title,
                        "instructorId": course.instructor_id,
                        "createdByRole": user.role.to_string(),
                    }))
                    .resource("courses", course.id),
            )
            .await;

            tracing::info!("Course {} created by user {}", course.id, user.id);

            Ok(HttpResponse::Created().json(ApiResponse::success(course, "课程创建成功")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
