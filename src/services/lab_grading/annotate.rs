use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{LabGradingService, annotate_activity, require_grader};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, common::response::error_response,
    lab_scores::requests::AnnotateRequest,
};
use crate::services::{ErrorCodes, activity::record_activity, missing_claims};

pub async fn annotate(
    service: &LabGradingService,
    request: &HttpRequest,
    lab_id: i64,
    student_id: i64,
    annotate_data: AnnotateRequest,
) -> ActixResult<HttpResponse> {
    let Some(grader) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };
    if let Err(resp) = require_grader(&grader) {
        return Ok(resp);
    }

    let upsert = match annotate_data.into_upsert() {
        Ok(upsert) => upsert,
        Err(e) => return Ok(error_response(&e, ErrorCode::BadRequest)),
    };

    let storage = service.get_storage(request);
    let codes = ErrorCodes {
        not_found: ErrorCode::LabNotFound,
        forbidden: ErrorCode::CoursePermissionDenied,
        validation: ErrorCode::PointsOutOfRange,
        ..Default::default()
    };

    match storage
        .upsert_annotation(&grader, lab_id, student_id, upsert)
        .await
    {
        Ok(result) => {
            info!(
                "Lab {} student {} annotated by {}, total score {}",
                lab_id, student_id, grader.id, result.total_score
            );
            record_activity(
                &storage,
                annotate_activity(grader.id, lab_id, student_id, &result),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "批注保存成功")))
        }
        Err(e) => Ok(codes.respond(&e)),
    }
}
