//! 评分服务
//!
//! 写批注与全量重算在存储层的同一个事务中完成，服务层只负责角色检查、
//! 请求校验、错误码映射以及提交后的活动日志。

pub mod annotate;
pub mod get;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::lab_scores::requests::{AnnotateRequest, UpdateAnnotationRequest};
use crate::models::lab_scores::responses::AnnotateResponse;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode, activity_logs::entities::NewActivityLog};
use crate::storage::Storage;

pub struct LabGradingService {
    storage: Option<Arc<dyn Storage>>,
}

impl LabGradingService {
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

    // 写入或覆盖单条批注并重算总分
    pub async fn annotate(
        &self,
        request: &HttpRequest,
        lab_id: i64,
        student_id: i64,
        annotate_data: AnnotateRequest,
    ) -> ActixResult<HttpResponse> {
        annotate::annotate(self, request, lab_id, student_id, annotate_data).await
    }

    // 按批注ID修改并重算总分
    pub async fn update_annotation(
        &self,
        request: &HttpRequest,
        lab_id: i64,
        student_id: i64,
        update_data: UpdateAnnotationRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_annotation(self, request, lab_id, student_id, update_data).await
    }

    // 查看学生的批注与成绩
    pub async fn get_annotations(
        &self,
        request: &HttpRequest,
        lab_id: i64,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_annotations(self, request, lab_id, student_id).await
    }
}

/// 评分角色检查，在任何数据库访问之前完成
pub(crate) fn require_grader(user: &User) -> Result<(), HttpResponse> {
    if user.role.can_grade() {
        Ok(())
    } else {
        Err(HttpResponse::Forbidden().json(ApiResponse::<()>::error_empty(
            ErrorCode::Forbidden,
            "Only teachers and administrators can grade labs",
        )))
    }
}

pub(crate) fn annotate_activity(
    grader_id: i64,
    lab_id: i64,
    student_id: i64,
    result: &AnnotateResponse,
) -> NewActivityLog {
    let annotation = &result.annotation;
    NewActivityLog::new(grader_id, "lab_assessment", "annotate")
        .details(serde_json::json!({
            "labId": lab_id,
            "studentId": student_id,
            "criterionId": annotation.annotation.criterion_id,
            "criterionName": annotation.criterion_name,
            "pointsAwarded": annotation.annotation.points_awarded,
            "annotationType": annotation.annotation.annotation_type,
            "hasComment": !annotation.annotation.teacher_comment.trim().is_empty(),
            "totalScore": result.total_score,
        }))
        .resource("labs", lab_id)
}
