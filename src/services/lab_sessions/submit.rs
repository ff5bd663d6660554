use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::{LabSessionService, session_error_codes};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, activity_logs::entities::NewActivityLog,
    common::response::error_response, lab_sessions::requests::SubmitLabRequest,
};
use crate::services::{activity::record_activity, missing_claims};

pub async fn submit_lab(
    service: &LabSessionService,
    request: &HttpRequest,
    lab_id: i64,
    submit_data: SubmitLabRequest,
) -> ActixResult<HttpResponse> {
    let Some(student_id) = RequireJWT::extract_user_id(request) else {
        return Ok(missing_claims());
    };

    let params = match submit_data.into_params() {
        Ok(params) => params,
        Err(e) => return Ok(error_response(&e, ErrorCode::BadRequest)),
    };
    let response_count = params.responses.as_object().map_or(0, |m| m.len());

    let storage = service.get_storage(request);

    match storage.submit_session(lab_id, student_id, params).await {
        Ok(result) if result.is_autosave => {
            debug!(
                "Autosaved session {} for student {}",
                result.session.id, student_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Progress saved")))
        }
        Ok(result) => {
            record_activity(
                &storage,
                NewActivityLog::new(student_id, "lab_submission", "submit")
                    .details(serde_json::json!({
                        "labId": lab_id,
                        "sessionId": result.session.id,
                        "submissionId": result.submission.id,
                        "responseCount": response_count,
                        "elapsedSeconds": result.session.elapsed_seconds,
                    }))
                    .resource("labs", lab_id),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Lab submitted successfully")))
        }
        Err(e) => Ok(session_error_codes().respond(&e)),
    }
}
