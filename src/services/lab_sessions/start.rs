use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{LabSessionService, session_error_codes};
use crate::errors::LmsError;
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, activity_logs::entities::NewActivityLog};
use crate::services::{ErrorCodes, activity::record_activity, missing_claims};

pub async fn start_lab(
    service: &LabSessionService,
    request: &HttpRequest,
    lab_id: i64,
) -> ActixResult<HttpResponse> {
    let Some(student_id) = RequireJWT::extract_user_id(request) else {
        return Ok(missing_claims());
    };

    let storage = service.get_storage(request);
    let default_max_attempts = service.get_config().lab.default_max_attempts;

    match storage
        .start_session(lab_id, student_id, default_max_attempts)
        .await
    {
        Ok(started) => {
            if started.is_resuming {
                info!(
                    "Student {} resumed session {} of lab {}",
                    student_id, started.session.id, lab_id
                );
            } else {
                record_activity(
                    &storage,
                    NewActivityLog::new(student_id, "lab_session", "start")
                        .details(serde_json::json!({
                            "labId": lab_id,
                            "sessionId": started.session.id,
                            "attempt": started.attempts_used,
                            "maxAttempts": started.max_attempts,
                        }))
                        .resource("labs", lab_id),
                )
                .await;
            }
            let message = if started.is_resuming {
                "Resuming existing session"
            } else {
                "Lab session started"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(started, message)))
        }
        Err(e) => {
            // 超出尝试次数使用单独的业务码
            let codes = match &e {
                LmsError::Validation(_) => ErrorCodes {
                    validation: ErrorCode::MaxAttemptsExceeded,
                    ..session_error_codes()
                },
                LmsError::NotFound(_) => ErrorCodes {
                    not_found: ErrorCode::LabNotFound,
                    ..session_error_codes()
                },
                _ => session_error_codes(),
            };
            Ok(codes.respond(&e))
        }
    }
}
