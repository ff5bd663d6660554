use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ActivityLogService;
use crate::models::{
    ApiResponse, ErrorCode, activity_logs::requests::ActivityLogListQuery,
    common::response::error_response,
};

pub async fn list_activity_logs(
    service: &ActivityLogService,
    request: &HttpRequest,
    mut query: ActivityLogListQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    query.activity_type = query
        .activity_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    match storage.list_activity_logs(query).await {
        Ok(logs) => Ok(HttpResponse::Ok().json(ApiResponse::success(logs, "查询成功"))),
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
