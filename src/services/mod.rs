pub mod activity;
pub mod activity_logs;
pub mod auth;
pub mod courses;
pub mod lab_grading;
pub mod lab_sessions;
pub mod labs;
pub mod users;

pub use activity_logs::ActivityLogService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use lab_grading::LabGradingService;
pub use lab_sessions::LabSessionService;
pub use labs::LabService;
pub use users::UserService;

use actix_web::HttpResponse;

use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode, common::response::error_response};

/// 各操作对 4xx 错误使用的业务码
#[derive(Debug, Clone, Copy)]
pub(crate) struct ErrorCodes {
    pub not_found: ErrorCode,
    pub forbidden: ErrorCode,
    pub validation: ErrorCode,
    pub conflict: ErrorCode,
}

impl Default for ErrorCodes {
    fn default() -> Self {
        Self {
            not_found: ErrorCode::NotFound,
            forbidden: ErrorCode::Forbidden,
            validation: ErrorCode::BadRequest,
            conflict: ErrorCode::Conflict,
        }
    }
}

impl ErrorCodes {
    pub fn pick(&self, err: &LmsError) -> ErrorCode {
        match err {
            LmsError::NotFound(_) => self.not_found,
            LmsError::Forbidden(_) => self.forbidden,
            LmsError::Validation(_) => self.validation,
            LmsError::Conflict(_) => self.conflict,
            LmsError::Authentication(_) => ErrorCode::Unauthorized,
            _ => ErrorCode::InternalServerError,
        }
    }

    pub fn respond(&self, err: &LmsError) -> HttpResponse {
        error_response(err, self.pick(err))
    }
}

/// JWT 中间件之后仍取不到用户信息
pub(crate) fn missing_claims() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
        ErrorCode::Unauthorized,
        "Unauthorized: missing user claims",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_pick() {
        let codes = ErrorCodes {
            not_found: ErrorCode::LabNotFound,
            conflict: ErrorCode::CriteriaLocked,
            ..Default::default()
        };

        assert_eq!(codes.pick(&LmsError::not_found("x")), ErrorCode::LabNotFound);
        assert_eq!(codes.pick(&LmsError::conflict("x")), ErrorCode::CriteriaLocked);
        assert_eq!(codes.pick(&LmsError::forbidden("x")), ErrorCode::Forbidden);
        assert_eq!(
            codes.pick(&LmsError::database_operation("x")),
            ErrorCode::InternalServerError
        );
    }
}
