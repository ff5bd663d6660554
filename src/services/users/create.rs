use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::entities::NewActivityLog,
    common::response::error_response,
    users::{requests::CreateUserRequest, responses::UserResponse},
};
use crate::services::activity::record_activity;
use crate::utils::password::hash_password;
use crate::utils::validate::validate_new_user;

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    user_data.username = user_data.username.trim().to_string();
    user_data.email = user_data.email.trim().to_lowercase();

    if let Err(e) = validate_new_user(&user_data) {
        return Ok(error_response(&e, ErrorCode::BadRequest));
    }

    let storage = service.get_storage(request);

    // 用户名与邮箱都不能与已有账号重复
    for identifier in [&user_data.username, &user_data.email] {
        match storage.get_user_by_username_or_email(identifier).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                return Ok(HttpResponse::Conflict().json(ApiResponse::<()>::error_empty(
                    ErrorCode::UserAlreadyExists,
                    "Username or email already exists",
                )));
            }
            Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
        }
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(&e, ErrorCode::InternalServerError)),
    };

    match storage.create_user(user_data).await {
        Ok(user) => {
            if let Some(actor) = RequireJWT::extract_user_id(request) {
                record_activity(
                    &storage,
                    NewActivityLog::new(actor, "user_management", "create")
                        .details(serde_json::json!({
                            "username": user.username,
                            "role": user.role.to_string(),
                        }))
                        .resource("users", user.id),
                )
                .await;
            }
            Ok(HttpResponse::Created().json(ApiResponse::success(UserResponse { user }, "用户创建成功")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::InternalServerError)),
    }
}
