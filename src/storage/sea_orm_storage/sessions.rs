use super::SeaOrmStorage;
use super::courses::{bump_progress, find_enrollment_status};
use super::labs::find_lab;
use crate::entity::lab_sessions::{
    ActiveModel as SessionActiveModel, Column as SessionColumn, Entity as LabSessions,
    Model as SessionModel,
};
use crate::entity::lab_submissions::{
    ActiveModel as SubmissionActiveModel, Column as SubmissionColumn, Entity as LabSubmissions,
    Model as SubmissionModel,
};
use crate::entity::labs::{Column as LabColumn, Entity as Labs, Model as LabModel};
use crate::entity::users::Entity as Users;
use crate::errors::{LmsError, Result};
use crate::models::lab_sessions::{
    entities::{SessionStatus, StopReason, duration_minutes},
    requests::SubmitParams,
    responses::{StartSessionResponse, StopResponse, SubmitResponse},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 开始实验，已有进行中的会话时直接恢复
    pub async fn start_session_impl(
        &self,
        lab_id: i64,
        student_id: i64,
        default_max_attempts: i32,
    ) -> Result<StartSessionResponse> {
        let txn = begin(self).await?;
        lock_student(&txn, student_id).await?;

        let lab = find_published_lab(&txn, lab_id).await?;
        ensure_enrolled(&txn, &lab, student_id).await?;

        let max_attempts = lab.max_attempts.unwrap_or(default_max_attempts);
        let attempts = LabSessions::find()
            .filter(SessionColumn::LabId.eq(lab_id))
            .filter(SessionColumn::StudentId.eq(student_id))
            .count(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计实验会话失败: {e}")))?
            as i64;

        let now = chrono::Utc::now().timestamp();

        if let Some(active) = latest_in_progress(&txn, lab_id, student_id).await? {
            // 恢复会话：清除上次 stop 留下的 end_time，保留已累计的 duration_minutes，
            // 新一段计时从 resumed_at 开始
            let session = if active.end_time.is_some() {
                let mut model: SessionActiveModel = active.into();
                model.end_time = Set(None);
                model.resumed_at = Set(Some(now));
                model.updated_at = Set(now);
                model
                    .update(&txn)
                    .await
                    .map_err(|e| LmsError::database_operation(format!("恢复实验会话失败: {e}")))?
            } else {
                active
            };

            let autosave_data = find_submission(&txn, session.id)
                .await?
                .map(|m| m.into_submission())
                .and_then(|s| s.autosave_data);

            commit(txn).await?;

            return Ok(StartSessionResponse {
                session: session.into_session(),
                is_resuming: true,
                autosave_data,
                attempts_used: attempts,
                max_attempts,
            });
        }

        if attempts >= i64::from(max_attempts) {
            return Err(LmsError::validation(format!(
                "Maximum attempts ({max_attempts}) reached for this lab"
            )));
        }

        let session = SessionActiveModel {
            lab_id: Set(lab_id),
            student_id: Set(student_id),
            status: Set(SessionStatus::InProgress.to_string()),
            start_time: Set(now),
            end_time: Set(None),
            resumed_at: Set(None),
            duration_minutes: Set(None),
            elapsed_seconds: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LmsError::database_operation(format!("创建实验会话失败: {e}")))?;

        commit(txn).await?;

        Ok(StartSessionResponse {
            session: session.into_session(),
            is_resuming: false,
            autosave_data: None,
            attempts_used: attempts + 1,
            max_attempts,
        })
    }

    /// 自动保存或最终提交
    pub async fn submit_session_impl(
        &self,
        lab_id: i64,
        student_id: i64,
        params: SubmitParams,
    ) -> Result<SubmitResponse> {
        let txn = begin(self).await?;
        lock_student(&txn, student_id).await?;

        let lab = find_published_lab(&txn, lab_id).await?;
        ensure_enrolled(&txn, &lab, student_id).await?;

        let session = resolve_session(&txn, lab_id, student_id, params.session_id).await?;
        let current = session.clone().into_session();
        if !current.is_in_progress() {
            return Err(LmsError::conflict("Session is no longer in progress"));
        }

        let now_dt = chrono::Utc::now();
        let now = now_dt.timestamp();
        let elapsed = current.next_elapsed(params.elapsed_seconds, now_dt);
        let responses = serde_json::to_string(&params.responses)?;

        let mut model: SessionActiveModel = session.into();
        model.elapsed_seconds = Set(elapsed);
        model.updated_at = Set(now);
        if !params.is_autosave {
            model.status = Set(SessionStatus::Submitted.to_string());
        }
        let session = model
            .update(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新实验会话失败: {e}")))?;

        let submission = match find_submission(&txn, session.id).await? {
            Some(existing) => {
                let mut active: SubmissionActiveModel = existing.into();
                if params.is_autosave {
                    active.autosave_data = Set(Some(responses));
                } else {
                    active.responses = Set(Some(responses));
                    active.submitted_at = Set(Some(now));
                }
                active.updated_at = Set(now);
                active.update(&txn).await
            }
            None => {
                let (final_responses, autosave_data, submitted_at) = if params.is_autosave {
                    (None, Some(responses), None)
                } else {
                    (Some(responses), None, Some(now))
                };
                SubmissionActiveModel {
                    session_id: Set(session.id),
                    student_id: Set(student_id),
                    responses: Set(final_responses),
                    autosave_data: Set(autosave_data),
                    submitted_at: Set(submitted_at),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
            }
        }
        .map_err(|e| LmsError::database_operation(format!("保存作答失败: {e}")))?;

        if !params.is_autosave {
            bump_progress(&txn, student_id, lab.course_id, 0, 1, now).await?;
        }

        commit(txn).await?;

        Ok(SubmitResponse {
            session: session.into_session(),
            submission: submission.into_submission(),
            is_autosave: params.is_autosave,
        })
    }

    /// 结束会话计时，不改变状态
    pub async fn stop_session_impl(
        &self,
        lab_id: i64,
        student_id: i64,
        session_id: Option<i64>,
        reason: StopReason,
    ) -> Result<StopResponse> {
        let txn = begin(self).await?;
        lock_student(&txn, student_id).await?;

        let lab = find_lab(&txn, lab_id).await?;
        let session = resolve_session(&txn, lab_id, student_id, session_id).await?;
        let has_submission = find_submission(&txn, session.id)
            .await?
            .is_some_and(|s| s.submitted_at.is_some());

        if session.end_time.is_some() {
            commit(txn).await?;
            return Ok(StopResponse {
                session: session.into_session(),
                already_ended: true,
                has_submission,
                reason,
            });
        }

        let now_dt = chrono::Utc::now();
        let now = now_dt.timestamp();
        // 只结算本段计时，恢复前离开的时间不计入
        let stint_start =
            crate::entity::to_datetime(session.resumed_at.unwrap_or(session.start_time));
        let stint = duration_minutes(stint_start, now_dt);
        let total = session.duration_minutes.unwrap_or(0) + stint;

        let mut model: SessionActiveModel = session.into();
        model.end_time = Set(Some(now));
        model.duration_minutes = Set(Some(total));
        model.updated_at = Set(now);
        let session = model
            .update(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("结束实验会话失败: {e}")))?;

        bump_progress(&txn, student_id, lab.course_id, stint, 0, now).await?;

        commit(txn).await?;

        Ok(StopResponse {
            session: session.into_session(),
            already_ended: false,
            has_submission,
            reason,
        })
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

/// 锁住学生行，同一学生的 start/submit/stop 串行执行，
/// 并发 start 不会各自插入一条进行中的会话
async fn lock_student<C: ConnectionTrait>(conn: &C, student_id: i64) -> Result<()> {
    Users::find_by_id(student_id)
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("锁定学生记录失败: {e}")))?
        .ok_or_else(|| LmsError::not_found("Student not found"))?;
    Ok(())
}

async fn find_published_lab<C: ConnectionTrait>(conn: &C, lab_id: i64) -> Result<LabModel> {
    Labs::find_by_id(lab_id)
        .filter(LabColumn::IsPublished.eq(true))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询实验失败: {e}")))?
        .ok_or_else(|| LmsError::not_found("Lab not found or not published"))
}

async fn ensure_enrolled<C: ConnectionTrait>(
    conn: &C,
    lab: &LabModel,
    student_id: i64,
) -> Result<()> {
    match find_enrollment_status(conn, lab.course_id, student_id).await? {
        Some(status) if status.grants_access() => Ok(()),
        _ => Err(LmsError::forbidden("You are not enrolled in this course")),
    }
}

async fn latest_in_progress<C: ConnectionTrait>(
    conn: &C,
    lab_id: i64,
    student_id: i64,
) -> Result<Option<SessionModel>> {
    LabSessions::find()
        .filter(SessionColumn::LabId.eq(lab_id))
        .filter(SessionColumn::StudentId.eq(student_id))
        .filter(SessionColumn::Status.eq(SessionStatus::InProgress.to_string()))
        .order_by_desc(SessionColumn::StartTime)
        .order_by_desc(SessionColumn::Id)
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询实验会话失败: {e}")))
}

/// 指定 ID 时必须属于该学生和实验，否则取最近的进行中会话
async fn resolve_session<C: ConnectionTrait>(
    conn: &C,
    lab_id: i64,
    student_id: i64,
    session_id: Option<i64>,
) -> Result<SessionModel> {
    match session_id {
        Some(id) => LabSessions::find_by_id(id)
            .filter(SessionColumn::LabId.eq(lab_id))
            .filter(SessionColumn::StudentId.eq(student_id))
            .one(conn)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询实验会话失败: {e}")))?
            .ok_or_else(|| LmsError::not_found("Session not found")),
        None => latest_in_progress(conn, lab_id, student_id)
            .await?
            .ok_or_else(|| LmsError::validation("No active session found")),
    }
}

async fn find_submission<C: ConnectionTrait>(
    conn: &C,
    session_id: i64,
) -> Result<Option<SubmissionModel>> {
    LabSubmissions::find()
        .filter(SubmissionColumn::SessionId.eq(session_id))
        .one(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询作答记录失败: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::{entities::EnrollmentStatus, requests::CreateCourseRequest};
    use crate::models::labs::requests::CreateLabRequest;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::storage::Storage;

    async fn user(storage: &SeaOrmStorage, username: &str, role: UserRole) -> i64 {
        storage
            .create_user(CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@lab.test"),
                password: "not-a-real-hash".to_string(),
                role,
                display_name: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_resume_after_gap_only_counts_new_stint() {
        let storage = SeaOrmStorage::connect("sqlite::memory:", 1, 5).await.unwrap();
        let teacher = user(&storage, "ms_frizzle", UserRole::Teacher).await;
        let student = user(&storage, "arnold", UserRole::Student).await;
        let course = storage
            .create_course(
                teacher,
                CreateCourseRequest {
                    title: "Physics 101".to_string(),
                    description: None,
                    instructor_id: None,
                },
            )
            .await
            .unwrap();
        storage
            .enroll_student(course.id, student, EnrollmentStatus::Enrolled)
            .await
            .unwrap();
        let lab = storage
            .create_lab(
                teacher,
                CreateLabRequest {
                    course_id: course.id,
                    title: "Simple Pendulum".to_string(),
                    description: None,
                    is_published: true,
                    duration_minutes: Some(45),
                    max_attempts: Some(2),
                },
            )
            .await
            .unwrap();

        let started = storage.start_session_impl(lab.id, student, 3).await.unwrap();

        // 三天前做了 10 分钟后离开
        let start = chrono::Utc::now().timestamp() - 3 * 24 * 3600;
        let model = LabSessions::find_by_id(started.session.id)
            .one(&storage.db)
            .await
            .unwrap()
            .unwrap();
        let mut model: SessionActiveModel = model.into();
        model.start_time = Set(start);
        model.end_time = Set(Some(start + 600));
        model.duration_minutes = Set(Some(10));
        model.update(&storage.db).await.unwrap();

        let resumed = storage.start_session_impl(lab.id, student, 3).await.unwrap();
        assert!(resumed.is_resuming);
        assert!(resumed.session.end_time.is_none());
        assert!(resumed.session.resumed_at.is_some());

        let stopped = storage
            .stop_session_impl(lab.id, student, None, StopReason::Navigation)
            .await
            .unwrap();
        assert!(!stopped.already_ended);
        assert_eq!(stopped.session.duration_minutes, Some(10));

        let progress = storage
            .get_course_progress(student, course.id)
            .await
            .unwrap()
            .unwrap();
        assert!(progress.time_spent_minutes <= 1, "{}", progress.time_spent_minutes);
    }
}
