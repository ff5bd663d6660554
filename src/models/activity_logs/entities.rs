use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 活动日志
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/activity_log.ts")]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    pub activity_type: String,
    pub action: String,
    pub details: Option<serde_json::Value>,
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 待写入的活动日志
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivityLog {
    pub user_id: i64,
    pub activity_type: &'static str,
    pub action: &'static str,
    pub details: serde_json::Value,
    pub resource_type: Option<&'static str>,
    pub resource_id: Option<i64>,
}

impl NewActivityLog {
    pub fn new(user_id: i64, activity_type: &'static str, action: &'static str) -> Self {
        Self {
            user_id,
            activity_type,
            action,
            details: serde_json::Value::Null,
            resource_type: None,
            resource_id: None,
        }
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn resource(mut self, resource_type: &'static str, resource_id: i64) -> Self {
        self.resource_type = Some(resource_type);
        self.resource_id = Some(resource_id);
        self
    }
}
