use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LabGradingService, annotate_activity, require_grader};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, common::response::error_response,
    lab_scores::requests::UpdateAnnotationRequest,
};
use crate::services::{ErrorCodes, activity::record_activity, missing_claims};

pub async fn update_annotation(
    service: &LabGradingService,
    request: &HttpRequest,
    lab_id: i64,
    student_id: i64,
    update_data: UpdateAnnotationRequest,
) -> ActixResult<HttpResponse> {
    let Some(grader) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };
    if let Err(resp) = require_grader(&grader) {
        return Ok(resp);
    }

    let patch = match update_data.into_patch() {
        Ok(patch) => patch,
        Err(e) => return Ok(error_response(&e, ErrorCode::BadRequest)),
    };

    let storage = service.get_storage(request);
    let codes = ErrorCodes {
        not_found: ErrorCode::AnnotationNotFound,
        forbidden: ErrorCode::CoursePermissionDenied,
        validation: ErrorCode::PointsOutOfRange,
        ..Default::default()
    };

    match storage
        .update_annotation(&grader, lab_id, student_id, patch)
        .await
    {
        Ok(result) => {
            record_activity(
                &storage,
                annotate_activity(grader.id, lab_id, student_id, &result),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "批注更新成功")))
        }
        Err(e) => Ok(codes.respond(&e)),
    }
}
