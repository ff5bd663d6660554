use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

// 活动日志查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "bindings/activity_log.ts")]
pub struct ActivityLogListQuery {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub user_id: Option<i64>,
    pub activity_type: Option<String>,
    pub resource_id: Option<i64>,
}
