//! 评分细则实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lab_rubric_criteria")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lab_id: i64,
    pub criterion_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub criterion_description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub max_points: f64,
    pub order_index: i32,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::labs::Entity",
        from = "Column::LabId",
        to = "super::labs::Column::Id"
    )]
    Lab,
    #[sea_orm(has_many = "super::lab_score_annotations::Entity")]
    Annotations,
}

impl Related<super::labs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lab.def()
    }
}

impl Related<super::lab_score_annotations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Annotations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_criterion(self) -> crate::models::labs::entities::RubricCriterion {
        crate::models::labs::entities::RubricCriterion {
            id: self.id,
            lab_id: self.lab_id,
            criterion_name: self.criterion_name,
            criterion_description: self.criterion_description,
            max_points: self.max_points,
            order_index: self.order_index,
            created_at: super::to_datetime(self.created_at),
        }
    }
}
