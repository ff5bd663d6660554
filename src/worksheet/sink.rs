use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::lab_sessions::{
    entities::StopReason,
    requests::SubmitParams,
    responses::{StartSessionResponse, StopResponse, SubmitResponse},
};
use crate::storage::Storage;

/// 作答的持久化边界
#[async_trait]
pub trait WorksheetSink: Send + Sync {
    async fn start(&self, lab_id: i64) -> Result<StartSessionResponse>;
    async fn save(&self, lab_id: i64, params: SubmitParams) -> Result<SubmitResponse>;
    async fn stop(
        &self,
        lab_id: i64,
        session_id: Option<i64>,
        reason: StopReason,
    ) -> Result<StopResponse>;
}

/// 直接写存储层，以某个学生的身份作答
pub struct StorageSink {
    storage: Arc<dyn Storage>,
    student_id: i64,
    default_max_attempts: i32,
}

impl StorageSink {
    pub fn new(storage: Arc<dyn Storage>, student_id: i64, default_max_attempts: i32) -> Self {
        Self {
            storage,
            student_id,
            default_max_attempts,
        }
    }
}

#[async_trait]
impl WorksheetSink for StorageSink {
    async fn start(&self, lab_id: i64) -> Result<StartSessionResponse> {
        self.storage
            .start_session(lab_id, self.student_id, self.default_max_attempts)
            .await
    }

    async fn save(&self, lab_id: i64, params: SubmitParams) -> Result<SubmitResponse> {
        self.storage
            .submit_session(lab_id, self.student_id, params)
            .await
    }

    async fn stop(
        &self,
        lab_id: i64,
        session_id: Option<i64>,
        reason: StopReason,
    ) -> Result<StopResponse> {
        self.storage
            .stop_session(lab_id, self.student_id, session_id, reason)
            .await
    }
}
