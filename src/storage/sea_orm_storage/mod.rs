//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 评分与实验会话的写操作各自在一个事务内完成，出错时事务随 drop 回滚。

mod activity_logs;
mod courses;
mod grading;
mod labs;
mod sessions;
mod users;

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    ///
    /// `sqlite::memory:` 只使用单个连接，否则每个连接都会看到各自独立的空库。
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| LmsError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（文件库使用 WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| LmsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .pragma("temp_store", "memory");

        let opt = if in_memory {
            opt.journal_mode(SqliteJournalMode::Memory)
        } else {
            opt.journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("mmap_size", "536870912")
                .pragma("wal_autocheckpoint", "1000")
        };

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(pool_size)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout))
            .connect_with(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(LmsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 课程模块
    async fn create_course(&self, instructor_id: i64, req: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(instructor_id, req).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn enroll_student(
        &self,
        course_id: i64,
        student_id: i64,
        status: EnrollmentStatus,
    ) -> Result<CourseEnrollment> {
        self.enroll_student_impl(course_id, student_id, status)
            .await
    }

    async fn get_course_progress(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<CourseProgress>> {
        self.get_course_progress_impl(student_id, course_id).await
    }

    // 实验模块
    async fn create_lab(&self, created_by: i64, req: CreateLabRequest) -> Result<Lab> {
        self.create_lab_impl(created_by, req).await
    }

    async fn get_lab_by_id(&self, id: i64) -> Result<Option<Lab>> {
        self.get_lab_by_id_impl(id).await
    }

    async fn update_lab(&self, id: i64, update: UpdateLabRequest) -> Result<Option<Lab>> {
        self.update_lab_impl(id, update).await
    }

    async fn list_criteria(&self, lab_id: i64) -> Result<Vec<RubricCriterion>> {
        self.list_criteria_impl(lab_id).await
    }

    async fn create_criterion(
        &self,
        lab_id: i64,
        req: CreateCriterionRequest,
    ) -> Result<RubricCriterion> {
        self.create_criterion_impl(lab_id, req).await
    }

    async fn lab_has_scores(&self, lab_id: i64) -> Result<bool> {
        self.lab_has_scores_impl(lab_id).await
    }

    // 评分模块
    async fn upsert_annotation(
        &self,
        grader: &User,
        lab_id: i64,
        student_id: i64,
        upsert: AnnotationUpsert,
    ) -> Result<AnnotateResponse> {
        self.upsert_annotation_impl(grader, lab_id, student_id, upsert)
            .await
    }

    async fn update_annotation(
        &self,
        grader: &User,
        lab_id: i64,
        student_id: i64,
        patch: AnnotationPatch,
    ) -> Result<AnnotateResponse> {
        self.update_annotation_impl(grader, lab_id, student_id, patch)
            .await
    }

    async fn get_annotations(
        &self,
        viewer: &User,
        lab_id: i64,
        student_id: i64,
    ) -> Result<AnnotationsResponse> {
        self.get_annotations_impl(viewer, lab_id, student_id).await
    }

    async fn get_lab_score(&self, lab_id: i64, student_id: i64) -> Result<Option<LabScore>> {
        self.get_lab_score_impl(lab_id, student_id).await
    }

    async fn list_lab_scores(&self, lab_id: i64) -> Result<Vec<LabScore>> {
        self.list_lab_scores_impl(lab_id).await
    }

    // 实验会话模块
    async fn start_session(
        &self,
        lab_id: i64,
        student_id: i64,
        default_max_attempts: i32,
    ) -> Result<StartSessionResponse> {
        self.start_session_impl(lab_id, student_id, default_max_attempts)
            .await
    }

    async fn submit_session(
        &self,
        lab_id: i64,
        student_id: i64,
        params: SubmitParams,
    ) -> Result<SubmitResponse> {
        self.submit_session_impl(lab_id, student_id, params).await
    }

    async fn stop_session(
        &self,
        lab_id: i64,
        student_id: i64,
        session_id: Option<i64>,
        reason: StopReason,
    ) -> Result<StopResponse> {
        self.stop_session_impl(lab_id, student_id, session_id, reason)
            .await
    }

    // 活动日志模块
    async fn create_activity_log(&self, log: NewActivityLog) -> Result<ActivityLog> {
        self.create_activity_log_impl(log).await
    }

    async fn list_activity_logs(
        &self,
        query: ActivityLogListQuery,
    ) -> Result<PaginatedResponse<ActivityLog>> {
        self.list_activity_logs_impl(query).await
    }
}
