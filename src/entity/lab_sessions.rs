//! 实验会话实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lab_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lab_id: i64,
    pub student_id: i64,
    pub status: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub resumed_at: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub elapsed_seconds: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(has_one = "super::lab_submissions::Entity")]
    Submission,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::lab_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_session(self) -> crate::models::lab_sessions::entities::LabSession {
        use crate::models::lab_sessions::entities::{LabSession, SessionStatus};

        LabSession {
            id: self.id,
            lab_id: self.lab_id,
            student_id: self.student_id,
            status: self
                .status
                .parse::<SessionStatus>()
                .unwrap_or(SessionStatus::Submitted),
            start_time: super::to_datetime(self.start_time),
            end_time: self.end_time.map(super::to_datetime),
            resumed_at: self.resumed_at.map(super::to_datetime),
            duration_minutes: self.duration_minutes,
            elapsed_seconds: self.elapsed_seconds,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
