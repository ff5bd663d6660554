//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 时间字段统一存储为 Unix 秒。

pub mod prelude;

pub mod activity_logs;
pub mod course_enrollments;
pub mod course_progress;
pub mod courses;
pub mod lab_rubric_criteria;
pub mod lab_score_annotations;
pub mod lab_scores;
pub mod lab_sessions;
pub mod lab_submissions;
pub mod labs;
pub mod users;

use chrono::{DateTime, Utc};

pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
