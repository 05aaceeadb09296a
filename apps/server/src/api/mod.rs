//! API endpoint modules.

pub mod auth;
pub mod classes;
pub mod courses;
pub mod health;
pub mod instructors;
pub mod openapi;
pub mod recaps;
pub mod students;

pub use auth::configure_routes as configure_auth_routes;
pub use classes::configure_routes as configure_class_routes;
pub use courses::configure_routes as configure_course_routes;
pub use health::configure_health_routes;
pub use instructors::configure_routes as configure_instructor_routes;
pub use openapi::ApiDoc;
pub use recaps::configure_routes as configure_recap_routes;
pub use students::configure_routes as configure_student_routes;

use actix_web::web;

/// Per-request size limit for photo uploads.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_upload_size: usize,
}

/// Register every `/api/v1` route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_auth_routes)
        .configure(configure_instructor_routes)
        .configure(configure_student_routes)
        .configure(configure_course_routes)
        .configure(configure_class_routes)
        .configure(configure_recap_routes);
}
