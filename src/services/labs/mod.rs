pub mod create;
pub mod criteria;
pub mod get;
pub mod summary;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::labs::entities::Lab;
use crate::models::labs::requests::{CreateCriterionRequest, CreateLabRequest, UpdateLabRequest};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode, common::response::error_response};
use crate::storage::Storage;

pub struct LabService {
    storage: Option<Arc<dyn Storage>>,
}

impl LabService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 创建实验
    pub async fn create_lab(
        &self,
        request: &HttpRequest,
        lab_data: CreateLabRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_lab(self, request, lab_data).await
    }

    // 获取实验详情
    pub async fn get_lab(&self, request: &HttpRequest, lab_id: i64) -> ActixResult<HttpResponse> {
        get::get_lab(self, request, lab_id).await
    }

    // 更新实验（字段白名单）
    pub async fn update_lab(
        &self,
        request: &HttpRequest,
        lab_id: i64,
        update_data: UpdateLabRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_lab(self, request, lab_id, update_data).await
    }

    // 评分细则列表
    pub async fn list_criteria(
        &self,
        request: &HttpRequest,
        lab_id: i64,
    ) -> ActixResult<HttpResponse> {
        criteria::list_criteria(self, request, lab_id).await
    }

    // 新增评分细则
    pub async fn create_criterion(
        &self,
        request: &HttpRequest,
        lab_id: i64,
        criterion_data: CreateCriterionRequest,
    ) -> ActixResult<HttpResponse> {
        criteria::create_criterion(self, request, lab_id, criterion_data).await
    }

    // 成绩统计
    pub async fn get_score_summary(
        &self,
        request: &HttpRequest,
        lab_id: i64,
    ) -> ActixResult<HttpResponse> {
        summary::get_score_summary(self, request, lab_id).await
    }

    // 学生成绩列表
    pub async fn list_scores(
        &self,
        request: &HttpRequest,
        lab_id: i64,
    ) -> ActixResult<HttpResponse> {
        summary::list_scores(self, request, lab_id).await
    }
}

/// 加载实验并检查访问权限
///
/// 课程写权限（管理员或授课教师）可以看到未发布的实验；
/// 其他人访问未发布实验与实验不存在的响应相同。
pub(crate) async fn load_lab(
    storage: &Arc<dyn Storage>,
    user: &User,
    lab_id: i64,
    require_write: bool,
) -> Result<Lab, HttpResponse> {
    let lab = match storage.get_lab_by_id(lab_id).await {
        Ok(Some(lab)) => lab,
        Ok(None) => return Err(lab_not_found()),
        Err(e) => return Err(error_response(&e, ErrorCode::InternalServerError)),
    };

    let can_write = match storage.get_course_by_id(lab.course_id).await {
        Ok(Some(course)) => course.can_write(user),
        Ok(None) => false,
        Err(e) => return Err(error_response(&e, ErrorCode::InternalServerError)),
    };

    if can_write {
        return Ok(lab);
    }
    if !lab.is_published {
        return Err(lab_not_found());
    }
    if require_write {
        return Err(HttpResponse::Forbidden().json(ApiResponse::<()>::error_empty(
            ErrorCode::CoursePermissionDenied,
            "You do not have permission to manage this lab",
        )));
    }
    Ok(lab)
}

fn lab_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
        ErrorCode::LabNotFound,
        "Lab not found",
    ))
}
