use serde::Deserialize;
use ts_rs::TS;

use super::entities::EnrollmentStatus;

// 创建课程请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "bindings/course.ts")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    /// 管理员代建课程时指定授课教师，教师创建时忽略
    pub instructor_id: Option<i64>,
}

// 选课请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "bindings/course.ts")]
pub struct EnrollStudentRequest {
    pub student_id: i64,
    pub status: Option<EnrollmentStatus>,
}
