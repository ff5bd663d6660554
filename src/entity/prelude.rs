//! 预导入模块，方便使用

pub use super::activity_logs::{
    ActiveModel as ActivityLogActiveModel, Entity as ActivityLogs, Model as ActivityLogModel,
};
pub use super::course_enrollments::{
    ActiveModel as CourseEnrollmentActiveModel, Entity as CourseEnrollments,
    Model as CourseEnrollmentModel,
};
pub use super::course_progress::{
    ActiveModel as CourseProgressActiveModel, Entity as CourseProgress,
    Model as CourseProgressModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::lab_rubric_criteria::{
    ActiveModel as CriterionActiveModel, Entity as LabRubricCriteria, Model as CriterionModel,
};
pub use super::lab_score_annotations::{
    ActiveModel as AnnotationActiveModel, Entity as LabScoreAnnotations,
    Model as AnnotationModel,
};
pub use super::lab_scores::{
    ActiveModel as LabScoreActiveModel, Entity as LabScores, Model as LabScoreModel,
};
pub use super::lab_sessions::{
    ActiveModel as LabSessionActiveModel, Entity as LabSessions, Model as LabSessionModel,
};
pub use super::lab_submissions::{
    ActiveModel as LabSubmissionActiveModel, Entity as LabSubmissions,
    Model as LabSubmissionModel,
};
pub use super::labs::{ActiveModel as LabActiveModel, Entity as Labs, Model as LabModel};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
