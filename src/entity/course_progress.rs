//! 学习进度实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "course_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub time_spent_minutes: i64,
    pub completed_labs: i32,
    pub last_activity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_progress(self) -> crate::models::courses::entities::CourseProgress {
        crate::models::courses::entities::CourseProgress {
            student_id: self.student_id,
            course_id: self.course_id,
            time_spent_minutes: self.time_spent_minutes,
            completed_labs: self.completed_labs,
            last_activity: super::to_datetime(self.last_activity),
        }
    }
}
