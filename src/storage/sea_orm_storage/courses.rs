use super::SeaOrmStorage;
use crate::entity::course_enrollments::{
    ActiveModel as EnrollmentActiveModel, Column as EnrollmentColumn,
    Entity as CourseEnrollments,
};
use crate::entity::course_progress::{
    ActiveModel as ProgressActiveModel, Column as ProgressColumn, Entity as CourseProgressEntity,
};
use crate::entity::courses::{ActiveModel, Entity as Courses};
use crate::errors::{LmsError, Result};
use crate::models::courses::{
    entities::{Course, CourseEnrollment, CourseProgress, EnrollmentStatus},
    requests::CreateCourseRequest,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(
        &self,
        instructor_id: i64,
        req: CreateCourseRequest,
    ) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title),
            description: Set(req.description),
            instructor_id: Set(instructor_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 选课，已有记录时只更新状态
    pub async fn enroll_student_impl(
        &self,
        course_id: i64,
        student_id: i64,
        status: EnrollmentStatus,
    ) -> Result<CourseEnrollment> {
        let existing = CourseEnrollments::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课记录失败: {e}")))?;

        let result = match existing {
            Some(model) => {
                let mut active: EnrollmentActiveModel = model.into();
                active.status = Set(status.to_string());
                active.update(&self.db).await
            }
            None => {
                EnrollmentActiveModel {
                    course_id: Set(course_id),
                    student_id: Set(student_id),
                    status: Set(status.to_string()),
                    enrolled_at: Set(chrono::Utc::now().timestamp()),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| LmsError::database_operation(format!("保存选课记录失败: {e}")))?;

        Ok(result.into_enrollment())
    }

    /// 获取学习进度
    pub async fn get_course_progress_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<CourseProgress>> {
        let result = CourseProgressEntity::find()
            .filter(ProgressColumn::StudentId.eq(student_id))
            .filter(ProgressColumn::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询学习进度失败: {e}")))?;

        Ok(result.map(|m| m.into_progress()))
    }
}

/// 查询学生在课程中的选课状态（可在事务内调用）
pub(super) async fn find_enrollment_status<C: ConnectionTrait>(
    conn: &C,
    course_id: i64,
    student_id: i64,
) -> Result<Option<EnrollmentStatus>> {
    let enrollment = CourseEnrollments::find()
        .filter(EnrollmentColumn::CourseId.eq(course_id))
        .filter(EnrollmentColumn::StudentId.eq(student_id))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询选课记录失败: {e}")))?;

    Ok(enrollment.map(|m| m.into_enrollment().status))
}

/// 累加学习进度，没有记录时新建
pub(super) async fn bump_progress<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
    course_id: i64,
    add_minutes: i64,
    add_completed: i32,
    now: i64,
) -> Result<()> {
    let existing = CourseProgressEntity::find()
        .filter(ProgressColumn::StudentId.eq(student_id))
        .filter(ProgressColumn::CourseId.eq(course_id))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询学习进度失败: {e}")))?;

    match existing {
        Some(model) => {
            let time_spent = model.time_spent_minutes + add_minutes;
            let completed = model.completed_labs + add_completed;
            let mut active: ProgressActiveModel = model.into();
            active.time_spent_minutes = Set(time_spent);
            active.completed_labs = Set(completed);
            active.last_activity = Set(now);
            active.update(conn).await
        }
        None => {
            ProgressActiveModel {
                student_id: Set(student_id),
                course_id: Set(course_id),
                time_spent_minutes: Set(add_minutes),
                completed_labs: Set(add_completed),
                last_activity: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
        }
    }
    .map_err(|e| LmsError::database_operation(format!("更新学习进度失败: {e}")))?;

    Ok(())
}
