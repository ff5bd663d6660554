use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::entities::NewActivityLog,
    common::response::error_response,
    courses::{entities::EnrollmentStatus, requests::EnrollStudentRequest},
    users::entities::UserRole,
};
use crate::services::{activity::record_activity, missing_claims};

pub async fn enroll_student(
    service: &CourseService,
    request: &HttpRequest,
    course_id: i64,
    enroll_data: EnrollStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };

    if !course.can_write(&user) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::<()>::error_empty(
            ErrorCode::CoursePermissionDenied,
            "You do not have permission to manage this course",
        )));
    }

    match storage.get_user_by_id(enroll_data.student_id).await {
        Ok(Some(student)) if student.role == UserRole::Student => {}
        Ok(Some(_)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                ErrorCode::EnrollmentFailed,
                "Only students can be enrolled",
            )));
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                ErrorCode::UserNotFound,
                "Student not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    }

    let status = enroll_data.status.unwrap_or(EnrollmentStatus::Enrolled);
    match storage
        .enroll_student(course_id, enroll_data.student_id, status)
        .await
    {
        Ok(enrollment) => {
            record_activity(
                &storage,
                NewActivityLog::new(user.id, "course_management", "enroll")
                    .details(serde_json::json!({
                        "courseId": course_id,
                        "studentId": enrollment.student_id,
                        "status": enrollment.status.to_string(),
                    }))
                    .resource("courses", course_id),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(enrollment, "选课成功")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::EnrollmentFailed)),
    }
}
