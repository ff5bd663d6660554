pub mod activity_logs;
pub mod auth;
pub mod common;
pub mod courses;
pub mod lab_scores;
pub mod lab_sessions;
pub mod labs;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/api.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,

    // 用户
    UserNotFound = 3000,
    UserAlreadyExists = 3001,

    // 课程
    CourseNotFound = 4000,
    CoursePermissionDenied = 4003,
    EnrollmentFailed = 4010,

    // 实验与评分
    LabNotFound = 5000,
    LabUpdateFailed = 5001,
    CriteriaLocked = 5101,
    AnnotationNotFound = 5200,
    PointsOutOfRange = 5201,

    // 实验会话
    SessionNotFound = 6000,
    SessionNotInProgress = 6001,
    MaxAttemptsExceeded = 6002,
    NotEnrolled = 6003,
}
