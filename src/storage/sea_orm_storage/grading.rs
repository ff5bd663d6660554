use super::SeaOrmStorage;
use super::labs::{find_lab, load_criteria};
use crate::entity::courses::Entity as Courses;
use crate::entity::lab_rubric_criteria::{
    Column as CriterionColumn, Entity as LabRubricCriteria, Model as CriterionModel,
};
use crate::entity::lab_score_annotations::{
    ActiveModel as AnnotationActiveModel, Column as AnnotationColumn,
    Entity as LabScoreAnnotations,
};
use crate::entity::lab_scores::{
    ActiveModel as ScoreActiveModel, Column as ScoreColumn, Entity as LabScores,
    Model as ScoreModel,
};
use crate::entity::users::Entity as Users;
use crate::errors::{LmsError, Result};
use crate::models::{
    lab_scores::{
        breakdown::{self, ScoreAggregate},
        entities::{LabScore, ScoreAnnotation},
        requests::{AnnotationPatch, AnnotationUpsert},
        responses::{AnnotateResponse, AnnotationsResponse, EnrichedAnnotation},
    },
    labs::entities::RubricCriterion,
    users::entities::User,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 写入（新增或覆盖）一条细则批注并重算总分
    pub async fn upsert_annotation_impl(
        &self,
        grader: &User,
        lab_id: i64,
        student_id: i64,
        upsert: AnnotationUpsert,
    ) -> Result<AnnotateResponse> {
        let txn = begin(self).await?;

        ensure_write_access(&txn, grader, lab_id).await?;
        let criterion = find_criterion(&txn, lab_id, upsert.criterion_id).await?;

        Users::find_by_id(student_id)
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询学生失败: {e}")))?
            .ok_or_else(|| LmsError::not_found("Student not found"))?;

        // 任何写入之前完成区间校验
        breakdown::check_points(upsert.points_awarded, criterion.max_points)?;

        let now = chrono::Utc::now().timestamp();
        let score = touch_score(&txn, student_id, lab_id, grader.id, now).await?;

        let existing = LabScoreAnnotations::find()
            .filter(AnnotationColumn::ScoreId.eq(score.id))
            .filter(AnnotationColumn::CriterionId.eq(criterion.id))
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询批注失败: {e}")))?;

        let annotation = match existing {
            Some(model) => {
                let mut active: AnnotationActiveModel = model.into();
                active.points_awarded = Set(upsert.points_awarded);
                active.teacher_comment = Set(upsert.teacher_comment);
                active.annotation_type = Set(upsert.annotation_type);
                active.created_by = Set(grader.id);
                active.updated_at = Set(now);
                active.update(&txn).await
            }
            None => {
                AnnotationActiveModel {
                    score_id: Set(score.id),
                    criterion_id: Set(criterion.id),
                    points_awarded: Set(upsert.points_awarded),
                    teacher_comment: Set(upsert.teacher_comment),
                    annotation_type: Set(upsert.annotation_type),
                    created_by: Set(grader.id),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
            }
        }
        .map_err(|e| LmsError::database_operation(format!("保存批注失败: {e}")))?;

        let aggregate = recompute_score(&txn, score, now).await?;
        commit(txn).await?;

        Ok(annotate_response(annotation.into_annotation(), criterion, aggregate))
    }

    /// 按批注 ID 修改，缺省字段保留原值，重算方式与 upsert 相同
    pub async fn update_annotation_impl(
        &self,
        grader: &User,
        lab_id: i64,
        student_id: i64,
        patch: AnnotationPatch,
    ) -> Result<AnnotateResponse> {
        let txn = begin(self).await?;

        ensure_write_access(&txn, grader, lab_id).await?;

        let score = find_score(&txn, lab_id, student_id)
            .await?
            .ok_or_else(|| LmsError::not_found("Annotation not found"))?;

        let annotation = LabScoreAnnotations::find_by_id(patch.annotation_id)
            .filter(AnnotationColumn::ScoreId.eq(score.id))
            .one(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询批注失败: {e}")))?
            .ok_or_else(|| LmsError::not_found("Annotation not found"))?;

        let criterion = find_criterion(&txn, lab_id, annotation.criterion_id).await?;

        let points = patch.points_awarded.unwrap_or(annotation.points_awarded);
        breakdown::check_points(points, criterion.max_points)?;

        let now = chrono::Utc::now().timestamp();

        let mut active: AnnotationActiveModel = annotation.into();
        active.points_awarded = Set(points);
        if let Some(comment) = patch.teacher_comment {
            active.teacher_comment = Set(comment);
        }
        if let Some(annotation_type) = patch.annotation_type {
            active.annotation_type = Set(annotation_type);
        }
        active.created_by = Set(grader.id);
        active.updated_at = Set(now);
        let annotation = active
            .update(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新批注失败: {e}")))?;

        let score = stamp_grader(&txn, score, grader.id, now).await?;
        let aggregate = recompute_score(&txn, score, now).await?;
        commit(txn).await?;

        Ok(annotate_response(annotation.into_annotation(), criterion, aggregate))
    }

    /// 读取学生在实验上的全部批注
    pub async fn get_annotations_impl(
        &self,
        viewer: &User,
        lab_id: i64,
        student_id: i64,
    ) -> Result<AnnotationsResponse> {
        if viewer.id == student_id {
            // 学生看不到未发布的实验，和不存在一样处理
            let lab = find_lab(&self.db, lab_id).await?;
            if !lab.is_published {
                return Err(LmsError::not_found("Lab not found"));
            }
        } else {
            ensure_write_access(&self.db, viewer, lab_id).await?;
        }

        let criteria = load_criteria(&self.db, lab_id).await?;
        let Some(score) = find_score(&self.db, lab_id, student_id).await? else {
            return Ok(AnnotationsResponse {
                annotations: Vec::new(),
                criteria,
                score: None,
            });
        };

        let annotations = load_annotations(&self.db, score.id).await?;

        // 按细则顺序输出，细则已删除的批注不返回
        let annotations = criteria
            .iter()
            .filter_map(|criterion| {
                annotations
                    .iter()
                    .find(|a| a.criterion_id == criterion.id)
                    .map(|a| EnrichedAnnotation {
                        annotation: a.clone(),
                        criterion_name: criterion.criterion_name.clone(),
                        criterion_max_points: criterion.max_points,
                    })
            })
            .collect();

        Ok(AnnotationsResponse {
            annotations,
            criteria,
            score: Some(score.into_lab_score()),
        })
    }

    /// 获取单个成绩
    pub async fn get_lab_score_impl(&self, lab_id: i64, student_id: i64) -> Result<Option<LabScore>> {
        Ok(find_score(&self.db, lab_id, student_id)
            .await?
            .map(|m| m.into_lab_score()))
    }

    /// 列出实验的全部成绩
    pub async fn list_lab_scores_impl(&self, lab_id: i64) -> Result<Vec<LabScore>> {
        let scores = LabScores::find()
            .filter(ScoreColumn::LabId.eq(lab_id))
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询实验成绩失败: {e}")))?;

        Ok(scores.into_iter().map(|m| m.into_lab_score()).collect())
    }
}

async fn begin(storage: &SeaOrmStorage) -> Result<DatabaseTransaction> {
    storage
        .db
        .begin()
        .await
        .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))
}

async fn commit(txn: DatabaseTransaction) -> Result<()> {
    txn.commit()
        .await
        .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))
}

/// 实验存在且调用者对其课程有写权限
async fn ensure_write_access<C: ConnectionTrait>(conn: &C, user: &User, lab_id: i64) -> Result<()> {
    let lab = find_lab(conn, lab_id).await?;

    let course = Courses::find_by_id(lab.course_id)
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?
        .ok_or_else(|| LmsError::not_found("Course not found"))?
        .into_course();

    if !course.can_write(user) {
        return Err(LmsError::forbidden(
            "You do not have permission to grade this lab",
        ));
    }
    Ok(())
}

/// 细则必须属于该实验
async fn find_criterion<C: ConnectionTrait>(
    conn: &C,
    lab_id: i64,
    criterion_id: i64,
) -> Result<RubricCriterion> {
    LabRubricCriteria::find_by_id(criterion_id)
        .filter(CriterionColumn::LabId.eq(lab_id))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询评分细则失败: {e}")))?
        .map(CriterionModel::into_criterion)
        .ok_or_else(|| LmsError::not_found("Criterion not found for this lab"))
}

async fn find_score<C: ConnectionTrait>(
    conn: &C,
    lab_id: i64,
    student_id: i64,
) -> Result<Option<ScoreModel>> {
    LabScores::find()
        .filter(ScoreColumn::LabId.eq(lab_id))
        .filter(ScoreColumn::StudentId.eq(student_id))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询成绩失败: {e}")))
}

/// 取得或创建成绩行并记录评分人
async fn touch_score<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
    lab_id: i64,
    grader_id: i64,
    now: i64,
) -> Result<ScoreModel> {
    match find_score(conn, lab_id, student_id).await? {
        Some(score) => stamp_grader(conn, score, grader_id, now).await,
        None => ScoreActiveModel {
            student_id: Set(student_id),
            lab_id: Set(lab_id),
            manual_score: Set(0.0),
            rubric_breakdown: Set(None),
            graded_by: Set(Some(grader_id)),
            graded_at: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("创建成绩失败: {e}"))),
    }
}

async fn stamp_grader<C: ConnectionTrait>(
    conn: &C,
    score: ScoreModel,
    grader_id: i64,
    now: i64,
) -> Result<ScoreModel> {
    let mut active: ScoreActiveModel = score.into();
    active.graded_by = Set(Some(grader_id));
    active.graded_at = Set(Some(now));
    active.updated_at = Set(now);
    active
        .update(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("更新成绩失败: {e}")))
}

async fn load_annotations<C: ConnectionTrait>(
    conn: &C,
    score_id: i64,
) -> Result<Vec<ScoreAnnotation>> {
    let annotations = LabScoreAnnotations::find()
        .filter(AnnotationColumn::ScoreId.eq(score_id))
        .all(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询批注失败: {e}")))?;

    Ok(annotations.into_iter().map(|m| m.into_annotation()).collect())
}

/// 从当前全部批注重算并覆盖 manual_score 与 rubric_breakdown
async fn recompute_score<C: ConnectionTrait>(
    conn: &C,
    score: ScoreModel,
    now: i64,
) -> Result<ScoreAggregate> {
    let criteria = load_criteria(conn, score.lab_id).await?;
    let annotations = load_annotations(conn, score.id).await?;
    let aggregate = breakdown::aggregate(&criteria, &annotations);

    let breakdown_json = serde_json::to_string(&aggregate.breakdown)?;

    let mut active: ScoreActiveModel = score.into();
    active.manual_score = Set(aggregate.manual_score);
    active.rubric_breakdown = Set(Some(breakdown_json));
    active.updated_at = Set(now);
    active
        .update(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("更新成绩失败: {e}")))?;

    Ok(aggregate)
}

fn annotate_response(
    annotation: ScoreAnnotation,
    criterion: RubricCriterion,
    aggregate: ScoreAggregate,
) -> AnnotateResponse {
    AnnotateResponse {
        annotation: EnrichedAnnotation {
            annotation,
            criterion_name: criterion.criterion_name,
            criterion_max_points: criterion.max_points,
        },
        rubric_breakdown: aggregate.breakdown,
        total_score: aggregate.manual_score,
    }
}
