//! 实验作答实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lab_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub session_id: i64,
    pub student_id: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub responses: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub autosave_data: Option<String>,
    pub submitted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lab_sessions::Entity",
        from = "Column::SessionId",
        to = "super::lab_sessions::Column::Id"
    )]
    Session,
}

impl Related<super::lab_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(self) -> crate::models::lab_sessions::entities::LabSubmission {
        use crate::models::lab_sessions::entities::LabSubmission;

        let parse = |raw: Option<String>| raw.and_then(|s| serde_json::from_str(&s).ok());

        LabSubmission {
            id: self.id,
            session_id: self.session_id,
            student_id: self.student_id,
            responses: parse(self.responses),
            autosave_data: parse(self.autosave_data),
            submitted_at: self.submitted_at.map(super::to_datetime),
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
