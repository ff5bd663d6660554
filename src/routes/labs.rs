use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::lab_scores::requests::{AnnotateRequest, UpdateAnnotationRequest};
use crate::models::lab_sessions::requests::{StopLabRequest, SubmitLabRequest};
use crate::models::labs::requests::{CreateCriterionRequest, CreateLabRequest, UpdateLabRequest};
use crate::models::users::entities::UserRole;
use crate::services::{LabGradingService, LabService, LabSessionService};
use crate::utils::{LabStudentPath, SafeIDI64};

// 懒加载的全局服务实例
static LAB_SERVICE: Lazy<LabService> = Lazy::new(LabService::new_lazy);
static LAB_GRADING_SERVICE: Lazy<LabGradingService> = Lazy::new(LabGradingService::new_lazy);
static LAB_SESSION_SERVICE: Lazy<LabSessionService> = Lazy::new(LabSessionService::new_lazy);

// 创建实验
pub async fn create_lab(
    req: HttpRequest,
    body: web::Json<CreateLabRequest>,
) -> ActixResult<HttpResponse> {
    LAB_SERVICE.create_lab(&req, body.into_inner()).await
}

// 获取实验详情
pub async fn get_lab(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    LAB_SERVICE.get_lab(&req, path.0).await
}

// 更新实验
pub async fn update_lab(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateLabRequest>,
) -> ActixResult<HttpResponse> {
    LAB_SERVICE.update_lab(&req, path.0, body.into_inner()).await
}

// 评分细则
pub async fn list_criteria(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    LAB_SERVICE.list_criteria(&req, path.0).await
}

pub async fn create_criterion(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<CreateCriterionRequest>,
) -> ActixResult<HttpResponse> {
    LAB_SERVICE
        .create_criterion(&req, path.0, body.into_inner())
        .await
}

// 成绩统计
pub async fn get_score_summary(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    LAB_SERVICE.get_score_summary(&req, path.0).await
}

pub async fn list_scores(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    LAB_SERVICE.list_scores(&req, path.0).await
}

// 批注
pub async fn annotate(
    req: HttpRequest,
    path: LabStudentPath,
    body: web::Json<AnnotateRequest>,
) -> ActixResult<HttpResponse> {
    LAB_GRADING_SERVICE
        .annotate(&req, path.lab_id, path.student_id, body.into_inner())
        .await
}

pub async fn update_annotation(
    req: HttpRequest,
    path: LabStudentPath,
    body: web::Json<UpdateAnnotationRequest>,
) -> ActixResult<HttpResponse> {
    LAB_GRADING_SERVICE
        .update_annotation(&req, path.lab_id, path.student_id, body.into_inner())
        .await
}

pub async fn get_annotations(req: HttpRequest, path: LabStudentPath) -> ActixResult<HttpResponse> {
    LAB_GRADING_SERVICE
        .get_annotations(&req, path.lab_id, path.student_id)
        .await
}

// 实验会话
pub async fn start_lab(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    LAB_SESSION_SERVICE.start(&req, path.0).await
}

pub async fn submit_lab(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SubmitLabRequest>,
) -> ActixResult<HttpResponse> {
    LAB_SESSION_SERVICE
        .submit(&req, path.0, body.into_inner())
        .await
}

pub async fn stop_lab(
    req: HttpRequest,
    path: SafeIDI64,
    body: Option<web::Json<StopLabRequest>>,
) -> ActixResult<HttpResponse> {
    let stop_data = body.map(|b| b.into_inner()).unwrap_or_default();
    LAB_SESSION_SERVICE.stop(&req, path.0, stop_data).await
}

// 配置路由
pub fn configure_lab_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/labs")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 创建实验 - 仅教师和管理员
                    .route(
                        web::post()
                            .to(create_lab)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    // 未发布的实验只有课程管理者可见（业务层检查）
                    .route(web::get().to(get_lab))
                    .route(
                        web::put()
                            .to(update_lab)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/criteria")
                    .route(web::get().to(list_criteria))
                    .route(
                        web::post()
                            .to(create_criterion)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/scores")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::get().to(list_scores)),
            )
            .service(
                web::resource("/{id}/scores/summary")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route(web::get().to(get_score_summary)),
            )
            .service(
                web::resource("/{id}/annotate/{student_id}")
                    .wrap(RateLimit::lab_writes())
                    // 评分角色在业务层检查；学生本人可以读取
                    .route(web::get().to(get_annotations))
                    .route(web::post().to(annotate))
                    .route(web::put().to(update_annotation)),
            )
            .service(web::resource("/{id}/start").route(web::post().to(start_lab)))
            .service(
                web::resource("/{id}/submit")
                    .wrap(RateLimit::lab_writes())
                    .route(web::post().to(submit_lab)),
            )
            .service(web::resource("/{id}/stop").route(web::post().to(stop_lab))),
    );
}
