//! Request and response models for the attendance API.

pub mod auth;
pub mod class_section;
pub mod course;
pub mod instructor;
pub mod recap;
pub mod student;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

// Re-export commonly used types
pub use auth::{AuthenticatedInstructor, LoginRequest, LoginResponse, Role};
pub use class_section::{
    AdminCreateClassSectionRequest, ClassSectionDeletionResponse, ClassSectionResponse,
    CreateClassSectionRequest, EnrollStudentRequest, EnrollmentResponse,
    UpdateClassSectionRequest,
};
pub use course::{CourseResponse, CreateCourseRequest, UpdateCourseRequest};
pub use instructor::{
    CreateInstructorRequest, InstructorDeletionResponse, InstructorResponse,
    UpdateInstructorRequest,
};
pub use recap::{
    AttendanceEntry, AttendanceRecordResponse, AttendanceUpdateResponse, CreateRecapRequest,
    CreateRecapResponse, RecapDeletionResponse, RecapResponse, StudentAttendanceResponse,
    UpdateAttendanceRequest,
};
pub use student::{
    CreateStudentRequest, DeletePhotoRequest, StudentDeletionResponse, StudentDetailResponse,
    StudentFileResponse, StudentResponse, UpdateStudentRequest,
};

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reject empty or whitespace-only required fields.
pub(crate) fn require_non_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

/// Same as [`require_non_blank`] but only when the field was supplied.
pub(crate) fn reject_blank(field: &str, value: Option<&str>) -> AppResult<()> {
    match value {
        Some(v) => require_non_blank(field, v),
        None => Ok(()),
    }
}
