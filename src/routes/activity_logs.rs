use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::activity_logs::requests::ActivityLogListQuery;
use crate::models::users::entities::UserRole;
use crate::services::ActivityLogService;

// 懒加载的全局 ActivityLogService 实例
static ACTIVITY_LOG_SERVICE: Lazy<ActivityLogService> =
    Lazy::new(ActivityLogService::new_lazy);

pub async fn list_activity_logs(
    req: HttpRequest,
    query: web::Query<ActivityLogListQuery>,
) -> ActixResult<HttpResponse> {
    ACTIVITY_LOG_SERVICE
        .list_activity_logs(&req, query.into_inner())
        .await
}

// 配置路由
pub fn configure_activity_log_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/activity-logs")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::get().to(list_activity_logs)),
            ),
    );
}
