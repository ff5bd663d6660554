use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::User;

// 课程
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/course.ts")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub instructor_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    /// 课程写权限：管理员或授课教师
    pub fn can_write(&self, user: &User) -> bool {
        user.role.is_admin() || self.instructor_id == user.id
    }
}

// 选课状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/course.ts")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    /// 只有在读状态可以开始和提交实验
    pub fn grants_access(&self) -> bool {
        matches!(self, EnrollmentStatus::Enrolled)
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentStatus::Enrolled => write!(f, "enrolled"),
            EnrollmentStatus::Completed => write!(f, "completed"),
            EnrollmentStatus::Dropped => write!(f, "dropped"),
        }
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enrolled" => Ok(EnrollmentStatus::Enrolled),
            "completed" => Ok(EnrollmentStatus::Completed),
            "dropped" => Ok(EnrollmentStatus::Dropped),
            _ => Err(format!("Invalid enrollment status: {s}")),
        }
    }
}

// 选课记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/course.ts")]
pub struct CourseEnrollment {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    pub status: EnrollmentStatus,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

// 学习进度
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/course.ts")]
pub struct CourseProgress {
    pub student_id: i64,
    pub course_id: i64,
    pub time_spent_minutes: i64,
    pub completed_labs: i32,
    pub last_activity: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn user(id: i64, role: UserRole) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            username: format!("u{id}"),
            email: format!("u{id}@example.com"),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_course_write_access() {
        let now = chrono::Utc::now();
        let course = Course {
            id: 1,
            title: "Chemistry".to_string(),
            description: None,
            instructor_id: 7,
            created_at: now,
            updated_at: now,
        };

        assert!(course.can_write(&user(7, UserRole::Teacher)));
        assert!(course.can_write(&user(1, UserRole::Admin)));
        assert!(!course.can_write(&user(8, UserRole::Teacher)));
        assert!(!course.can_write(&user(9, UserRole::Student)));
    }

    #[test]
    fn test_enrollment_status() {
        assert!(EnrollmentStatus::Enrolled.grants_access());
        assert!(!EnrollmentStatus::Dropped.grants_access());
        assert_eq!(
            "completed".parse::<EnrollmentStatus>(),
            Ok(EnrollmentStatus::Completed)
        );
    }
}
