#![allow(dead_code)]

use std::sync::Arc;

use vlab_lms::models::{
    courses::{
        entities::{Course, EnrollmentStatus},
        requests::CreateCourseRequest,
    },
    labs::{
        entities::{Lab, RubricCriterion},
        requests::{CreateCriterionRequest, CreateLabRequest},
    },
    users::{
        entities::{User, UserRole},
        requests::CreateUserRequest,
    },
};
use vlab_lms::storage::{Storage, sea_orm_storage::SeaOrmStorage};

pub struct Fixture {
    pub storage: Arc<dyn Storage>,
    pub admin: User,
    pub teacher: User,
    pub other_teacher: User,
    pub student: User,
    pub course: Course,
    pub lab: Lab,
}

pub async fn memory_storage() -> Arc<dyn Storage> {
    let storage = SeaOrmStorage::connect("sqlite::memory:", 1, 5)
        .await
        .expect("in-memory storage");
    Arc::new(storage)
}

pub async fn create_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@lab.test"),
            password: "not-a-real-hash".to_string(),
            role,
            display_name: None,
        })
        .await
        .expect("create user")
}

/// 文件库，连接池可以有多个连接同时开事务
pub async fn file_storage(path: &std::path::Path) -> Arc<dyn Storage> {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::connect(&url, 4, 5)
        .await
        .expect("file storage");
    Arc::new(storage)
}

/// 一门课程、一个已发布实验（最多 2 次尝试），学生已选课
pub async fn fixture() -> Fixture {
    fixture_on(memory_storage().await).await
}

pub async fn fixture_on(storage: Arc<dyn Storage>) -> Fixture {

    let admin = create_user(&storage, "admin", UserRole::SuperAdmin).await;
    let teacher = create_user(&storage, "ms_frizzle", UserRole::Teacher).await;
    let other_teacher = create_user(&storage, "mr_wizard", UserRole::Teacher).await;
    let student = create_user(&storage, "arnold", UserRole::Student).await;

    let course = storage
        .create_course(
            teacher.id,
            CreateCourseRequest {
                title: "Physics 101".to_string(),
                description: None,
                instructor_id: None,
            },
        )
        .await
        .expect("create course");

    storage
        .enroll_student(course.id, student.id, EnrollmentStatus::Enrolled)
        .await
        .expect("enroll student");

    let lab = create_lab(&storage, &course, &teacher, "Simple Pendulum", true).await;

    Fixture {
        storage,
        admin,
        teacher,
        other_teacher,
        student,
        course,
        lab,
    }
}

pub async fn create_lab(
    storage: &Arc<dyn Storage>,
    course: &Course,
    creator: &User,
    title: &str,
    is_published: bool,
) -> Lab {
    storage
        .create_lab(
            creator.id,
            CreateLabRequest {
                course_id: course.id,
                title: title.to_string(),
                description: None,
                is_published,
                duration_minutes: Some(45),
                max_attempts: Some(2),
            },
        )
        .await
        .expect("create lab")
}

pub async fn add_criterion(
    storage: &Arc<dyn Storage>,
    lab: &Lab,
    name: &str,
    max_points: f64,
) -> RubricCriterion {
    storage
        .create_criterion(
            lab.id,
            CreateCriterionRequest {
                criterion_name: name.to_string(),
                criterion_description: None,
                max_points,
                order_index: None,
            },
        )
        .await
        .expect("create criterion")
}
