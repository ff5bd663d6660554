use serde::Serialize;
use ts_rs::TS;

use super::entities::RubricCriterion;

// 评分细则列表
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "bindings/lab.ts")]
pub struct CriteriaListResponse {
    pub items: Vec<RubricCriterion>,
    /// 已有成绩记录后细则不可再修改
    pub locked: bool,
}
