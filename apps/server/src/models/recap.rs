//! Recap (attendance session) models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::cascade::RecapDeletion;
use crate::db::recaps::{CreatedRecap, StudentAttendance};
use crate::entity::{attendance_record, recap};
use crate::error::{AppError, AppResult};

use super::require_non_blank;

/// One student's presence flag in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    pub student_id: String,
    #[serde(default)]
    pub present: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecapRequest {
    /// Required; a missing value is rejected as invalid input
    #[serde(default)]
    pub class_section_id: String,
    /// Meeting number within the class section
    pub session_index: i32,
    pub duration_minutes: i32,
    #[serde(default)]
    pub attendance: Vec<AttendanceEntry>,
}

impl CreateRecapRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank("class_section_id", &self.class_section_id)?;
        if self.session_index < 1 {
            return Err(AppError::InvalidInput(
                "session_index must be at least 1".to_string(),
            ));
        }
        if self.duration_minutes < 0 {
            return Err(AppError::InvalidInput(
                "duration_minutes must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecapResponse {
    pub id: String,
    pub class_section_id: String,
    pub session_index: i32,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
}

impl From<recap::Model> for RecapResponse {
    fn from(m: recap::Model) -> Self {
        Self {
            id: m.id,
            class_section_id: m.class_section_id,
            session_index: m.session_index,
            duration_minutes: m.duration_minutes,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecordResponse {
    pub student_id: String,
    pub present: bool,
}

impl From<attendance_record::Model> for AttendanceRecordResponse {
    fn from(m: attendance_record::Model) -> Self {
        Self {
            student_id: m.student_id,
            present: m.present,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRecapResponse {
    pub recap: RecapResponse,
    pub attendance: Vec<AttendanceRecordResponse>,
    /// Student ids that were not admitted because they do not exist
    pub skipped: Vec<String>,
}

impl From<CreatedRecap> for CreateRecapResponse {
    fn from(c: CreatedRecap) -> Self {
        Self {
            recap: c.recap.into(),
            attendance: c.attendance.into_iter().map(Into::into).collect(),
            skipped: c.skipped,
        }
    }
}

/// Attendance row joined with the student's name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentAttendanceResponse {
    pub student_id: String,
    pub student_name: String,
    pub present: bool,
}

impl From<StudentAttendance> for StudentAttendanceResponse {
    fn from(a: StudentAttendance) -> Self {
        Self {
            student_id: a.student_id,
            student_name: a.student_name,
            present: a.present,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAttendanceRequest {
    pub attendance: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceUpdateResponse {
    pub recap_id: String,
    pub updated: u64,
    /// Student ids with no record in this recap
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecapDeletionResponse {
    pub recap_id: String,
    pub attendance_records_deleted: u64,
}

impl From<RecapDeletion> for RecapDeletionResponse {
    fn from(d: RecapDeletion) -> Self {
        Self {
            recap_id: d.recap_id,
            attendance_records_deleted: d.attendance_records_deleted,
        }
    }
}
