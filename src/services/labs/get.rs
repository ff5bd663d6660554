use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LabService, load_lab};
use crate::middlewares::RequireJWT;
use crate::models::ApiResponse;
use crate::services::missing_claims;

pub async fn get_lab(
    service: &LabService,
    request: &HttpRequest,
    lab_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    match load_lab(&storage, &user, lab_id, false).await {
        Ok(lab) => Ok(HttpResponse::Ok().json(ApiResponse::success(lab, "查询成功"))),
        Err(resp) => Ok(resp),
    }
}
