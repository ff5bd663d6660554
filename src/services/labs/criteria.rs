use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LabService, load_lab};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::entities::NewActivityLog,
    common::response::error_response,
    labs::{requests::CreateCriterionRequest, responses::CriteriaListResponse},
};
use crate::services::{ErrorCodes, activity::record_activity, missing_claims};

pub async fn list_criteria(
    service: &LabService,
    request: &HttpRequest,
    lab_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    if let Err(resp) = load_lab(&storage, &user, lab_id, false).await {
        return Ok(resp);
    }

    let items = match storage.list_criteria(lab_id).await {
        Ok(items) => items,
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };
    let locked = match storage.lab_has_scores(lab_id).await {
        Ok(locked) => locked,
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CriteriaListResponse { items, locked },
        "查询成功",
    )))
}

pub async fn create_criterion(
    service: &LabService,
    request: &HttpRequest,
    lab_id: i64,
    mut criterion_data: CreateCriterionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    criterion_data.criterion_name = criterion_data.criterion_name.trim().to_string();
    if let Err(e) = criterion_data.validate() {
        return Ok(error_response(&e, ErrorCode::BadRequest));
    }

    if let Err(resp) = load_lab(&storage, &user, lab_id, true).await {
        return Ok(resp);
    }

    let codes = ErrorCodes {
        not_found: ErrorCode::LabNotFound,
        conflict: ErrorCode::CriteriaLocked,
        ..Default::default()
    };

    match storage.create_criterion(lab_id, criterion_data).await {
        Ok(criterion) => {
            record_activity(
                &storage,
                NewActivityLog::new(user.id, "lab_management", "add_criterion")
                    .details(serde_json::json!({
                        "criterionId": criterion.id,
                        "criterionName": criterion.criterion_name,
                        "maxPoints": criterion.max_points,
                    }))
                    .resource("labs", lab_id),
            )
            .await;
            Ok(HttpResponse::Created().json(ApiResponse::success(criterion, "评分细则创建成功")))
        }
        Err(e) => Ok(codes.respond(&e)),
    }
}
