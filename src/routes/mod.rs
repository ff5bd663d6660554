pub mod activity_logs;

pub mod auth;

pub mod courses;

pub mod labs;

pub mod users;

pub use activity_logs::configure_activity_log_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use labs::configure_lab_routes;
pub use users::configure_user_routes;
