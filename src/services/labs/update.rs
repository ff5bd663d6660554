use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LabService, load_lab};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::entities::NewActivityLog,
    common::response::error_response,
    labs::requests::UpdateLabRequest,
};
use crate::services::{activity::record_activity, missing_claims};

pub async fn update_lab(
    service: &LabService,
    request: &HttpRequest,
    lab_id: i64,
    mut update_data: UpdateLabRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user) = RequireJWT::extract_user_claims(request) else {
        return Ok(missing_claims());
    };

    update_data.title = update_data.title.map(|t| t.trim().to_string());
    if let Err(e) = update_data.validate() {
        return Ok(error_response(&e, ErrorCode::LabUpdateFailed));
    }

    if let Err(resp) = load_lab(&storage, &user, lab_id, true).await {
        return Ok(resp);
    }

    let changed: Vec<&str> = [
        ("title", update_data.title.is_some()),
        ("description", update_data.description.is_some()),
        ("is_published", update_data.is_published.is_some()),
        ("duration_minutes", update_data.duration_minutes.is_some()),
        ("max_attempts", update_data.max_attempts.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, set)| set.then_some(name))
    .collect();

    match storage.update_lab(lab_id, update_data).await {
        Ok(Some(lab)) => {
            record_activity(
                &storage,
                NewActivityLog::new(user.id, "lab_management", "update")
                    .details(serde_json::json!({ "fields": changed }))
                    .resource("labs", lab.id),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(lab, "实验更新成功")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
            ErrorCode::LabNotFound,
            "Lab not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::LabUpdateFailed)),
    }
}
