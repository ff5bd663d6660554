//! 活动日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub activity_type: String,
    pub action: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_activity_log(self) -> crate::models::activity_logs::entities::ActivityLog {
        crate::models::activity_logs::entities::ActivityLog {
            id: self.id,
            user_id: self.user_id,
            activity_type: self.activity_type,
            action: self.action,
            details: self
                .details
                .and_then(|d| serde_json::from_str(&d).ok()),
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            created_at: super::to_datetime(self.created_at),
        }
    }
}
