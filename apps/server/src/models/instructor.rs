//! Instructor models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::cascade::InstructorDeletion;
use crate::entity::instructor;
use crate::error::AppResult;

use super::{reject_blank, require_non_blank};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateInstructorRequest {
    /// Natural key (lecturer number), e.g. "00001"
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub photo_url: Option<String>,
    pub functional_position: Option<String>,
    pub program: Option<String>,
    pub competence: Option<String>,
}

impl CreateInstructorRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank("id", &self.id)?;
        require_non_blank("name", &self.name)?;
        require_non_blank("email", &self.email)?;
        require_non_blank("password", &self.password)
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateInstructorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub photo_url: Option<String>,
    pub functional_position: Option<String>,
    pub program: Option<String>,
    pub competence: Option<String>,
}

impl UpdateInstructorRequest {
    pub fn validate(&self) -> AppResult<()> {
        reject_blank("name", self.name.as_deref())?;
        reject_blank("email", self.email.as_deref())?;
        reject_blank("password", self.password.as_deref())
    }
}

/// Instructor as exposed over the API. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstructorResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub functional_position: Option<String>,
    pub program: Option<String>,
    pub competence: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<instructor::Model> for InstructorResponse {
    fn from(m: instructor::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            photo_url: m.photo_url,
            functional_position: m.functional_position,
            program: m.program,
            competence: m.competence,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Summary of an instructor cascade delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstructorDeletionResponse {
    pub instructor_id: String,
    pub class_sections_deleted: Vec<String>,
    pub recaps_deleted: u64,
    pub attendance_records_deleted: u64,
    pub enrollments_deleted: u64,
}

impl From<InstructorDeletion> for InstructorDeletionResponse {
    fn from(d: InstructorDeletion) -> Self {
        Self {
            instructor_id: d.instructor_id,
            class_sections_deleted: d.class_sections_deleted,
            recaps_deleted: d.recaps_deleted,
            attendance_records_deleted: d.attendance_records_deleted,
            enrollments_deleted: d.enrollments_deleted,
        }
    }
}
