use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 实验
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/lab.ts")]
pub struct Lab {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub duration_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Lab {
    /// 实际生效的最大尝试次数
    pub fn effective_max_attempts(&self, default_max_attempts: i32) -> i32 {
        self.max_attempts.unwrap_or(default_max_attempts)
    }
}

// 评分细则条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab.ts")]
pub struct RubricCriterion {
    pub id: i64,
    pub lab_id: i64,
    pub criterion_name: String,
    pub criterion_description: Option<String>,
    pub max_points: f64,
    pub order_index: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
