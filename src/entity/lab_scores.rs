//! 实验成绩实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lab_scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub lab_id: i64,
    #[sea_orm(column_type = "Double")]
    pub manual_score: f64,
    /// JSON 文本：细则 ID -> 得分明细
    #[sea_orm(column_type = "Text", nullable)]
    pub rubric_breakdown: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
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
    pub fn into_lab_score(self) -> crate::models::lab_scores::entities::LabScore {
        use crate::models::lab_scores::entities::{LabScore, RubricBreakdown};

        let rubric_breakdown = self
            .rubric_breakdown
            .as_deref()
            .and_then(|json| serde_json::from_str::<RubricBreakdown>(json).ok())
            .unwrap_or_default();

        LabScore {
            id: self.id,
            student_id: self.student_id,
            lab_id: self.lab_id,
            manual_score: self.manual_score,
            rubric_breakdown,
            graded_by: self.graded_by,
            graded_at: self.graded_at.map(super::to_datetime),
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
