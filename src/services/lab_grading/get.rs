use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LabGradingService;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{ErrorCodes, missing_claims};

pub async fn get_annotations(
    service: &LabGradingService,
    request: &HttpRequest,
    lab_id: i64,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let Some(viewer) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    let storage = service.get_storage(request);
    let codes = ErrorCodes {
        not_found: ErrorCode::LabNotFound,
        ..Default::default()
    };

    // 学生本人或课程的管理者可以查看
    match storage.get_annotations(&viewer, lab_id, student_id).await {
        Ok(annotations) => Ok(HttpResponse::Ok().json(ApiResponse::success(annotations, "查询成功"))),
        Err(e) => Ok(codes.respond(&e)),
    }
}
