use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LabService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::entities::NewActivityLog,
    common::response::error_response,
    labs::requests::CreateLabRequest,
};
use crate::services::{activity::record_activity, missing_claims};

pub async fn create_lab(
    service: &LabService,
    request: &HttpRequest,
    mut lab_data: CreateLabRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    lab_data.title = lab_data.title.trim().to_string();
    if let Err(e) = lab_data.validate() {
        return Ok(error_response(&e, ErrorCode::BadRequest));
    }

    let course = match storage.get_course_by_id(lab_data.course_id).await {
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
            "You do not have permission to add labs to this course",
        )));
    }

    match storage.create_lab(user.id, lab_data).await {
        Ok(lab) => {
            record_activity(
                &storage,
                NewActivityLog::new(user.id, "lab_management", "create")
                    .details(serde_json::json!({
                        "courseId": lab.course_id,
                        "title": lab.title,
                        "isPublished": lab.is_published,
                    }))
                    .resource("labs", lab.id),
            )
            .await;
            Ok(HttpResponse::Created().json(ApiResponse::success(lab, "实验创建成功")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
