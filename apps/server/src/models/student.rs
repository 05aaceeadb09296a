//! Student models, including the photo folder listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::cascade::StudentDeletion;
use crate::entity::student;
use crate::error::AppResult;

use super::{reject_blank, require_non_blank};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    /// Natural key (student number)
    pub id: String,
    pub name: String,
    pub program: String,
}

impl CreateStudentRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank("id", &self.id)?;
        require_non_blank("name", &self.name)?;
        require_non_blank("program", &self.program)?;
        if self.id.contains('/') {
            return Err(crate::error::AppError::InvalidInput(
                "id must not contain '/'".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub program: Option<String>,
}

impl UpdateStudentRequest {
    pub fn validate(&self) -> AppResult<()> {
        reject_blank("name", self.name.as_deref())?;
        reject_blank("program", self.program.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: String,
    pub name: String,
    pub program: String,
    pub storage_folder: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<student::Model> for StudentResponse {
    fn from(m: student::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            program: m.program,
            storage_folder: m.storage_folder,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// One object in a student's storage folder.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentFileResponse {
    pub name: String,
    pub path: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentDetailResponse {
    #[serde(flatten)]
    pub student: StudentResponse,
    pub files: Vec<StudentFileResponse>,
}

/// Identify a photo either by its in-bucket path or by its full public URL.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeletePhotoRequest {
    pub path: String,
}

/// Summary of a student cascade delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentDeletionResponse {
    pub student_id: String,
    pub attendance_records_deleted: u64,
    pub enrollments_deleted: u64,
}

impl From<StudentDeletion> for StudentDeletionResponse {
    fn from(d: StudentDeletion) -> Self {
        Self {
            student_id: d.student_id,
            attendance_records_deleted: d.attendance_records_deleted,
            enrollments_deleted: d.enrollments_deleted,
        }
    }
}
