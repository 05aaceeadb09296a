//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Server",
        version = "0.1.0",
        description = "API server for class sections, students, face recognition models and attendance recaps"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::auth::login,
        api::auth::profile,
        api::auth::logout,
        // Instructor endpoints
        api::instructors::list_instructors,
        api::instructors::create_instructor,
        api::instructors::get_instructor,
        api::instructors::update_instructor,
        api::instructors::delete_instructor,
        // Student endpoints
        api::students::list_students,
        api::students::create_student,
        api::students::get_student,
        api::students::update_student,
        api::students::delete_student,
        api::students::upload_photos,
        api::students::delete_photo,
        api::students::encode_student,
        // Course endpoints
        api::courses::list_courses,
        api::courses::create_course,
        api::courses::get_course,
        api::courses::update_course,
        // Class section endpoints
        api::classes::list_classes,
        api::classes::list_my_classes,
        api::classes::create_class,
        api::classes::admin_create_class,
        api::classes::get_class,
        api::classes::update_class,
        api::classes::delete_class,
        api::classes::list_class_students,
        api::classes::enroll_student,
        api::classes::unenroll_student,
        api::classes::merge_model,
        api::classes::download_model,
        api::classes::list_class_recaps,
        // Recap endpoints
        api::recaps::create_recap,
        api::recaps::get_attendance,
        api::recaps::update_attendance,
        api::recaps::delete_recap,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::MessageResponse,
            // Health
            api::health::LivenessResponse,
            api::health::ReadinessResponse,
            api::health::DatabaseCheck,
            // Auth
            models::Role,
            models::LoginRequest,
            models::LoginResponse,
            // Instructors
            models::CreateInstructorRequest,
            models::UpdateInstructorRequest,
            models::InstructorResponse,
            models::InstructorDeletionResponse,
            // Students
            models::CreateStudentRequest,
            models::UpdateStudentRequest,
            models::StudentResponse,
            models::StudentFileResponse,
            models::StudentDetailResponse,
            models::DeletePhotoRequest,
            models::StudentDeletionResponse,
            // Courses
            models::CreateCourseRequest,
            models::UpdateCourseRequest,
            models::CourseResponse,
            // Class sections
            models::CreateClassSectionRequest,
            models::AdminCreateClassSectionRequest,
            models::UpdateClassSectionRequest,
            models::ClassSectionResponse,
            models::EnrollStudentRequest,
            models::EnrollmentResponse,
            models::ClassSectionDeletionResponse,
            // Recaps
            models::AttendanceEntry,
            models::CreateRecapRequest,
            models::RecapResponse,
            models::AttendanceRecordResponse,
            models::CreateRecapResponse,
            models::StudentAttendanceResponse,
            models::UpdateAttendanceRequest,
            models::AttendanceUpdateResponse,
            models::RecapDeletionResponse,
            // Recognition
            services::EncodeOutcome,
            services::MergeOutcome,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Instructor login and profile"),
        (name = "Instructors", description = "Instructor management"),
        (name = "Students", description = "Students, photos and face encodings"),
        (name = "Courses", description = "Course catalog"),
        (name = "Classes", description = "Class sections, enrollments and recognition models"),
        (name = "Recaps", description = "Attendance sessions")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token and bootstrap admin key security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    crate::config::ADMIN_KEY_HEADER,
                ))),
            );
        }
    }
}
