use super::SeaOrmStorage;
use crate::entity::activity_logs::{ActiveModel, Column, Entity as ActivityLogs};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    activity_logs::{
        entities::{ActivityLog, NewActivityLog},
        requests::ActivityLogListQuery,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 写入活动日志
    pub async fn create_activity_log_impl(&self, log: NewActivityLog) -> Result<ActivityLog> {
        let details = if log.details.is_null() {
            None
        } else {
            Some(serde_json::to_string(&log.details)?)
        };

        let model = ActiveModel {
            user_id: Set(log.user_id),
            activity_type: Set(log.activity_type.to_string()),
            action: Set(log.action.to_string()),
            details: Set(details),
            resource_type: Set(log.resource_type.map(str::to_string)),
            resource_id: Set(log.resource_id),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("写入活动日志失败: {e}")))?;

        Ok(result.into_activity_log())
    }

    /// 分页列出活动日志
    pub async fn list_activity_logs_impl(
        &self,
        query: ActivityLogListQuery,
    ) -> Result<PaginatedResponse<ActivityLog>> {
        let (page, size) = query.pagination.normalized();

        let mut select = ActivityLogs::find();

        if let Some(user_id) = query.user_id {
            select = select.filter(Column::UserId.eq(user_id));
        }

        if let Some(ref activity_type) = query.activity_type
            && !activity_type.trim().is_empty()
        {
            select = select.filter(Column::ActivityType.eq(activity_type.trim()));
        }

        if let Some(resource_id) = query.resource_id {
            select = select.filter(Column::ResourceId.eq(resource_id));
        }

        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询活动日志总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询活动日志页数失败: {e}")))?;

        let logs = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询活动日志列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: logs.into_iter().map(|m| m.into_activity_log()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }
}
