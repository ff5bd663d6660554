use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LabSessionService, session_error_codes};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, activity_logs::entities::NewActivityLog, lab_sessions::requests::StopLabRequest,
};
use crate::services::{activity::record_activity, missing_claims};

pub async fn stop_lab(
    service: &LabSessionService,
    request: &HttpRequest,
    lab_id: i64,
    stop_data: StopLabRequest,
) -> ActixResult<HttpResponse> {
    let Some(student_id) = RequireJWT::extract_user_id(request) else {
        return Ok(missing_claims());
    };

    let storage = service.get_storage(request);

    match storage
        .stop_session(lab_id, student_id, stop_data.session_id, stop_data.reason)
        .await
    {
        Ok(stopped) => {
            if !stopped.already_ended {
                record_activity(
                    &storage,
                    NewActivityLog::new(student_id, "lab_session", "stop")
                        .details(serde_json::json!({
                            "labId": lab_id,
                            "sessionId": stopped.session.id,
                            "durationMinutes": stopped.session.duration_minutes,
                            "reason": stopped.reason.to_string(),
                            "hasSubmission": stopped.has_submission,
                        }))
                        .resource("labs", lab_id),
                )
                .await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(stopped, "Lab session stopped")))
        }
        Err(e) => Ok(session_error_codes().respond(&e)),
    }
}
