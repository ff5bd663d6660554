use serde::Serialize;
use ts_rs::TS;

use super::entities::{LabScore, RubricBreakdown, ScoreAnnotation};
use crate::models::labs::entities::RubricCriterion;

// 附带细则信息的批注
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct EnrichedAnnotation {
    #[serde(flatten)]
    #[ts(flatten)]
    pub annotation: ScoreAnnotation,
    pub criterion_name: String,
    pub criterion_max_points: f64,
}

// 批注写入结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct AnnotateResponse {
    pub annotation: EnrichedAnnotation,
    pub rubric_breakdown: RubricBreakdown,
    pub total_score: f64,
}

// 学生某实验的全部批注
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct AnnotationsResponse {
    pub annotations: Vec<EnrichedAnnotation>,
    pub criteria: Vec<RubricCriterion>,
    pub score: Option<LabScore>,
}

// 单条细则统计
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct CriterionSummary {
    pub criterion_id: i64,
    pub criterion_name: String,
    pub max_points: f64,
    pub annotated_count: i64,
    pub average_points: Option<f64>,
    pub average_percentage: Option<f64>,
}

// 实验成绩统计
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "bindings/lab_score.ts")]
pub struct LabScoreSummary {
    pub lab_id: i64,
    pub graded_count: i64,
    pub average_score: Option<f64>,
    pub highest_score: Option<f64>,
    pub lowest_score: Option<f64>,
    /// 总分的样本标准差
    pub score_stddev: Option<f64>,
    pub criteria: Vec<CriterionSummary>,
}
