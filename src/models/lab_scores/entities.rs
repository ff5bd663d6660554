use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// 未指定时的批注类型
pub const DEFAULT_ANNOTATION_TYPE: &str = "feedback";

// 细则批注（每个成绩、每条细则至多一条）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct ScoreAnnotation {
    pub id: i64,
    pub score_id: i64,
    pub criterion_id: i64,
    pub points_awarded: f64,
    pub teacher_comment: String,
    pub annotation_type: String,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 单条细则的得分明细
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct CriterionBreakdown {
    pub name: String,
    pub max_points: f64,
    pub awarded_points: f64,
    pub teacher_comment: String,
    pub annotation_type: String,
    pub percentage: f64,
}

/// 细则 ID -> 得分明细
pub type RubricBreakdown = BTreeMap<i64, CriterionBreakdown>;

// 学生在某个实验上的成绩
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct LabScore {
    pub id: i64,
    pub student_id: i64,
    pub lab_id: i64,
    pub manual_score: f64,
    pub rubric_breakdown: RubricBreakdown,
    pub graded_by: Option<i64>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
