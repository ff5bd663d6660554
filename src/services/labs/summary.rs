use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LabService, load_lab};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, common::response::error_response, lab_scores::breakdown::summarize,
};
use crate::services::missing_claims;

pub async fn get_score_summary(
    service: &LabService,
    request: &HttpRequest,
    lab_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    if let Err(resp) = load_lab(&storage, &user, lab_id, true).await {
        return Ok(resp);
    }

    let criteria = match storage.list_criteria(lab_id).await {
        Ok(criteria) => criteria,
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };
    let scores = match storage.list_lab_scores(lab_id).await {
        Ok(scores) => scores,
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        summarize(lab_id, &criteria, &scores),
        "查询成功",
    )))
}

// 按学生列出成绩
pub async fn list_scores(
    service: &LabService,
    request: &HttpRequest,
    lab_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    if let Err(resp) = load_lab(&storage, &user, lab_id, true).await {
        return Ok(resp);
    }

    match storage.list_lab_scores(lab_id).await {
        Ok(scores) => Ok(HttpResponse::Ok().json(ApiResponse::success(scores, "查询成功"))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
