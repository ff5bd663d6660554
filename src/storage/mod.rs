use std::sync::Arc;

use crate::models::{
    PaginatedResponse,
    activity_logs::{
        entities::{ActivityLog, NewActivityLog},
        requests::ActivityLogListQuery,
    },
    courses::{
        entities::{Course, CourseEnrollment, CourseProgress, EnrollmentStatus},
        requests::CreateCourseRequest,
    },
    lab_scores::{
        entities::LabScore,
        requests::{AnnotationPatch, AnnotationUpsert},
        responses::{AnnotateResponse, AnnotationsResponse},
    },
    lab_sessions::{
        entities::StopReason,
        requests::SubmitParams,
        responses::{StartSessionResponse, StopResponse, SubmitResponse},
    },
    labs::{
        entities::{Lab, RubricCriterion},
        requests::{CreateCriterionRequest, CreateLabRequest, UpdateLabRequest},
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为已哈希的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 课程管理方法
    async fn create_course(&self, instructor_id: i64, req: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    // 选课，已存在时更新状态
    async fn enroll_student(
        &self,
        course_id: i64,
        student_id: i64,
        status: EnrollmentStatus,
    ) -> Result<CourseEnrollment>;
    async fn get_course_progress(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<CourseProgress>>;

    /// 实验管理方法
    async fn create_lab(&self, created_by: i64, req: CreateLabRequest) -> Result<Lab>;
    async fn get_lab_by_id(&self, id: i64) -> Result<Option<Lab>>;
    async fn update_lab(&self, id: i64, update: UpdateLabRequest) -> Result<Option<Lab>>;
    // 按 order_index 排序的评分细则
    async fn list_criteria(&self, lab_id: i64) -> Result<Vec<RubricCriterion>>;
    // 已有成绩时返回 Conflict
    async fn create_criterion(
        &self,
        lab_id: i64,
        req: CreateCriterionRequest,
    ) -> Result<RubricCriterion>;
    async fn lab_has_scores(&self, lab_id: i64) -> Result<bool>;

    /// 评分方法（单事务：校验、写批注、全量重算）
    async fn upsert_annotation(
        &self,
        grader: &User,
        lab_id: i64,
        student_id: i64,
        upsert: AnnotationUpsert,
    ) -> Result<AnnotateResponse>;
    async fn update_annotation(
        &self,
        grader: &User,
        lab_id: i64,
        student_id: i64,
        patch: AnnotationPatch,
    ) -> Result<AnnotateResponse>;
    async fn get_annotations(
        &self,
        viewer: &User,
        lab_id: i64,
        student_id: i64,
    ) -> Result<AnnotationsResponse>;
    async fn get_lab_score(&self, lab_id: i64, student_id: i64) -> Result<Option<LabScore>>;
    async fn list_lab_scores(&self, lab_id: i64) -> Result<Vec<LabScore>>;

    /// 实验会话方法
    async fn start_session(
        &self,
        lab_id: i64,
        student_id: i64,
        default_max_attempts: i32,
    ) -> Result<StartSessionResponse>;
    async fn submit_session(
        &self,
        lab_id: i64,
        student_id: i64,
        params: SubmitParams,
    ) -> Result<SubmitResponse>;
    async fn stop_session(
        &self,
        lab_id: i64,
        student_id: i64,
        session_id: Option<i64>,
        reason: StopReason,
    ) -> Result<StopResponse>;

    /// 活动日志方法
    async fn create_activity_log(&self, log: NewActivityLog) -> Result<ActivityLog>;
    async fn list_activity_logs(
        &self,
        query: ActivityLogListQuery,
    ) -> Result<PaginatedResponse<ActivityLog>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
