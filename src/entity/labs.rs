//! 实验实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "labs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub is_published: bool,
    pub duration_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::lab_rubric_criteria::Entity")]
    RubricCriteria,
    #[sea_orm(has_many = "super::lab_scores::Entity")]
    Scores,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::lab_rubric_criteria::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RubricCriteria.def()
    }
}

impl Related<super::lab_scores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scores.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_lab(self) -> crate::models::labs::entities::Lab {
        crate::models::labs::entities::Lab {
            id: self.id,
            course_id: self.course_id,
            title: self.title,
            description: self.description,
            is_published: self.is_published,
            duration_minutes: self.duration_minutes,
            max_attempts: self.max_attempts,
            created_by: self.created_by,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
