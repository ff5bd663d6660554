use super::SeaOrmStorage;
use crate::entity::lab_rubric_criteria::{
    ActiveModel as CriterionActiveModel, Column as CriterionColumn, Entity as LabRubricCriteria,
};
use crate::entity::lab_scores::{Column as ScoreColumn, Entity as LabScores};
use crate::entity::labs::{ActiveModel, Entity as Labs, Model as LabModel};
use crate::errors::{LmsError, Result};
use crate::models::labs::{
    entities::{Lab, RubricCriterion},
    requests::{CreateCriterionRequest, CreateLabRequest, UpdateLabRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建实验
    pub async fn create_lab_impl(&self, created_by: i64, req: CreateLabRequest) -> Result<Lab> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(req.course_id),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            is_published: Set(req.is_published),
            duration_minutes: Set(req.duration_minutes),
            max_attempts: Set(req.max_attempts),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建实验失败: {e}")))?;

        Ok(result.into_lab())
    }

    /// 通过 ID 获取实验
    pub async fn get_lab_by_id_impl(&self, id: i64) -> Result<Option<Lab>> {
        let result = Labs::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询实验失败: {e}")))?;

        Ok(result.map(|m| m.into_lab()))
    }

    /// 更新实验，只写入白名单字段
    pub async fn update_lab_impl(&self, id: i64, update: UpdateLabRequest) -> Result<Option<Lab>> {
        let Some(existing) = Labs::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询实验失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(is_published) = update.is_published {
            model.is_published = Set(is_published);
        }
        if let Some(duration) = update.duration_minutes {
            model.duration_minutes = Set(Some(duration));
        }
        if let Some(max_attempts) = update.max_attempts {
            model.max_attempts = Set(Some(max_attempts));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新实验失败: {e}")))?;

        Ok(Some(result.into_lab()))
    }

    /// 列出实验的评分细则
    pub async fn list_criteria_impl(&self, lab_id: i64) -> Result<Vec<RubricCriterion>> {
        load_criteria(&self.db, lab_id).await
    }

    /// 新增评分细则，开始评分后细则锁定
    pub async fn create_criterion_impl(
        &self,
        lab_id: i64,
        req: CreateCriterionRequest,
    ) -> Result<RubricCriterion> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        find_lab(&txn, lab_id).await?;

        if count_scores(&txn, lab_id).await? > 0 {
            return Err(LmsError::conflict(
                "Rubric criteria are locked once grading has started",
            ));
        }

        let order_index = match req.order_index {
            Some(index) => index,
            None => LabRubricCriteria::find()
                .filter(CriterionColumn::LabId.eq(lab_id))
                .count(&txn)
                .await
                .map_err(|e| LmsError::database_operation(format!("统计评分细则失败: {e}")))?
                as i32,
        };

        let model = CriterionActiveModel {
            lab_id: Set(lab_id),
            criterion_name: Set(req.criterion_name.trim().to_string()),
            criterion_description: Set(req.criterion_description),
            max_points: Set(req.max_points),
            order_index: Set(order_index),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LmsError::database_operation(format!("创建评分细则失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(model.into_criterion())
    }

    /// 实验是否已有成绩
    pub async fn lab_has_scores_impl(&self, lab_id: i64) -> Result<bool> {
        Ok(count_scores(&self.db, lab_id).await? > 0)
    }
}

/// 查询实验，不存在时返回 NotFound
pub(super) async fn find_lab<C: ConnectionTrait>(conn: &C, lab_id: i64) -> Result<LabModel> {
    Labs::find_by_id(lab_id)
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询实验失败: {e}")))?
        .ok_or_else(|| LmsError::not_found("Lab not found"))
}

/// 按 (order_index, id) 排序加载评分细则
pub(super) async fn load_criteria<C: ConnectionTrait>(
    conn: &C,
    lab_id: i64,
) -> Result<Vec<RubricCriterion>> {
    let criteria = LabRubricCriteria::find()
        .filter(CriterionColumn::LabId.eq(lab_id))
        .order_by_asc(CriterionColumn::OrderIndex)
        .order_by_asc(CriterionColumn::Id)
        .all(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询评分细则失败: {e}")))?;

    Ok(criteria.into_iter().map(|m| m.into_criterion()).collect())
}

async fn count_scores<C: ConnectionTrait>(conn: &C, lab_id: i64) -> Result<u64> {
    LabScores::find()
        .filter(ScoreColumn::LabId.eq(lab_id))
        .count(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("统计实验成绩失败: {e}")))
}
