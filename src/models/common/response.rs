use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::LmsError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 业务错误对应的 HTTP 状态码
pub fn status_for_error(err: &LmsError) -> StatusCode {
    match err {
        LmsError::NotFound(_) => StatusCode::NOT_FOUND,
        LmsError::Forbidden(_) => StatusCode::FORBIDDEN,
        LmsError::Validation(_) => StatusCode::BAD_REQUEST,
        LmsError::Conflict(_) => StatusCode::CONFLICT,
        LmsError::Authentication(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 将业务错误转换为 HTTP 响应
///
/// `code` 为调用方给出的具体业务码；服务端错误统一使用 `InternalServerError`，
/// 且不向客户端暴露底层细节。
pub fn error_response(err: &LmsError, code: ErrorCode) -> HttpResponse {
    let status = status_for_error(err);
    if err.is_client_error() {
        HttpResponse::build(status).json(ApiResponse::<()>::error_empty(code, err.message()))
    } else {
        tracing::error!("{}", err.format_simple());
        HttpResponse::build(status).json(ApiResponse::<()>::error_empty(
            ErrorCode::InternalServerError,
            "Internal server error",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for_error(&LmsError::not_found("x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for_error(&LmsError::forbidden("x")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for_error(&LmsError::validation("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for_error(&LmsError::conflict("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for_error(&LmsError::database_operation("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_hides_server_details() {
        let resp = error_response(
            &LmsError::database_operation("secret dsn"),
            ErrorCode::LabNotFound,
        );
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = error_response(&LmsError::validation("bad"), ErrorCode::PointsOutOfRange);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
