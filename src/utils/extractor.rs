//! 路径参数提取
//!
//! 路由里的 ID 必须是正整数，否则直接返回 400，不进入处理函数。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError, http::StatusCode,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    req.match_info()
        .get(name)
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| invalid_path_param(name))
}

fn invalid_path_param(name: &str) -> actix_web::Error {
    let response = HttpResponse::build(StatusCode::BAD_REQUEST).json(
        ApiResponse::<()>::error_empty(ErrorCode::BadRequest, format!("Invalid path parameter: {name}")),
    );
    InternalError::from_response(format!("invalid path parameter {name}"), response).into()
}

/// 路径中的 `{id}`
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_id(req, "id").map(SafeIDI64))
    }
}

/// `/labs/{id}/.../{student_id}` 中的实验与学生 ID
#[derive(Debug, Clone, Copy)]
pub struct LabStudentPath {
    pub lab_id: i64,
    pub student_id: i64,
}

impl FromRequest for LabStudentPath {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_id(req, "id").and_then(|lab_id| {
            Ok(LabStudentPath {
                lab_id,
                student_id: parse_id(req, "student_id")?,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_rejects_non_positive_ids() {
        let req = TestRequest::default().param("id", "12").to_http_request();
        assert_eq!(SafeIDI64::extract(&req).await.unwrap().0, 12);

        for bad in ["0", "-3", "abc"] {
            let req = TestRequest::default().param("id", bad).to_http_request();
            assert!(SafeIDI64::extract(&req).await.is_err());
        }
    }

    #[actix_web::test]
    async fn test_lab_student_path() {
        let req = TestRequest::default()
            .param("id", "5")
            .param("student_id", "9")
            .to_http_request();
        let path = LabStudentPath::extract(&req).await.unwrap();
        assert_eq!((path.lab_id, path.student_id), (5, 9));

        let req = TestRequest::default().param("id", "5").to_http_request();
        assert!(LabStudentPath::extract(&req).await.is_err());
    }
}
