use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{LabSession, LabSubmission, StopReason};

// 开始/恢复会话
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab_session.ts")]
pub struct StartSessionResponse {
    pub session: LabSession,
    pub is_resuming: bool,
    /// 恢复会话时最近一次自动保存的作答
    pub autosave_data: Option<serde_json::Value>,
    pub attempts_used: i64,
    pub max_attempts: i32,
}

// 提交结果
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab_session.ts")]
pub struct SubmitResponse {
    pub session: LabSession,
    pub submission: LabSubmission,
    pub is_autosave: bool,
}

// 结束会话结果
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab_session.ts")]
pub struct StopResponse {
    pub session: LabSession,
    pub already_ended: bool,
    pub has_submission: bool,
    pub reason: StopReason,
}
