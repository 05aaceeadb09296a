//! Class section and enrollment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::cascade::ClassSectionDeletion;
use crate::entity::{class_enrollment, class_section};
use crate::error::AppResult;

use super::{reject_blank, require_non_blank};

/// Create a class section taught by the caller.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateClassSectionRequest {
    pub course_id: String,
    pub schedule: Option<String>,
    pub room: Option<String>,
}

impl CreateClassSectionRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank("course_id", &self.course_id)
    }
}

/// Create a class section on behalf of a named instructor.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminCreateClassSectionRequest {
    pub instructor_id: String,
    pub course_id: String,
    pub schedule: Option<String>,
    pub room: Option<String>,
}

impl AdminCreateClassSectionRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank("instructor_id", &self.instructor_id)?;
        require_non_blank("course_id", &self.course_id)
    }
}

/// Partial update. `instructor_id` is honored for admins only.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateClassSectionRequest {
    pub course_id: Option<String>,
    pub instructor_id: Option<String>,
    pub schedule: Option<String>,
    pub room: Option<String>,
}

impl UpdateClassSectionRequest {
    pub fn validate(&self) -> AppResult<()> {
        reject_blank("course_id", self.course_id.as_deref())?;
        reject_blank("instructor_id", self.instructor_id.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassSectionResponse {
    pub id: String,
    pub course_id: String,
    /// Resolved course name when the listing joins courses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    pub instructor_id: String,
    pub schedule: Option<String>,
    pub room: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<class_section::Model> for ClassSectionResponse {
    fn from(m: class_section::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            course_name: None,
            instructor_id: m.instructor_id,
            schedule: m.schedule,
            room: m.room,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl ClassSectionResponse {
    pub fn with_course_name(mut self, name: Option<String>) -> Self {
        self.course_name = name;
        self
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EnrollStudentRequest {
    pub student_id: String,
}

impl EnrollStudentRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank("student_id", &self.student_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentResponse {
    pub class_section_id: String,
    pub student_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<class_enrollment::Model> for EnrollmentResponse {
    fn from(m: class_enrollment::Model) -> Self {
        Self {
            class_section_id: m.class_section_id,
            student_id: m.student_id,
            created_at: m.created_at,
        }
    }
}

/// Summary of a class section cascade delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassSectionDeletionResponse {
    pub class_section_id: String,
    pub recaps_deleted: u64,
    pub attendance_records_deleted: u64,
    pub enrollments_deleted: u64,
}

impl From<ClassSectionDeletion> for ClassSectionDeletionResponse {
    fn from(d: ClassSectionDeletion) -> Self {
        Self {
            class_section_id: d.class_section_id,
            recaps_deleted: d.recaps_deleted,
            attendance_records_deleted: d.attendance_records_deleted,
            enrollments_deleted: d.enrollments_deleted,
        }
    }
}
