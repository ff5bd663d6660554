pub mod start;
pub mod stop;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::lab_sessions::requests::{StopLabRequest, SubmitLabRequest};
use crate::services::ErrorCodes;
use crate::storage::Storage;

pub struct LabSessionService {
    storage: Option<Arc<dyn Storage>>,
}

impl LabSessionService {
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

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 开始或恢复实验
    pub async fn start(&self, request: &HttpRequest, lab_id: i64) -> ActixResult<HttpResponse> {
        start::start_lab(self, request, lab_id).await
    }

    // 自动保存或最终提交
    pub async fn submit(
        &self,
        request: &HttpRequest,
        lab_id: i64,
        submit_data: SubmitLabRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_lab(self, request, lab_id, submit_data).await
    }

    // 结束计时
    pub async fn stop(
        &self,
        request: &HttpRequest,
        lab_id: i64,
        stop_data: StopLabRequest,
    ) -> ActixResult<HttpResponse> {
        stop::stop_lab(self, request, lab_id, stop_data).await
    }
}

/// 会话操作的错误码
pub(crate) fn session_error_codes() -> ErrorCodes {
    ErrorCodes {
        not_found: ErrorCode::SessionNotFound,
        forbidden: ErrorCode::NotEnrolled,
        validation: ErrorCode::BadRequest,
        conflict: ErrorCode::SessionNotInProgress,
    }
}
