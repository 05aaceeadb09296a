//! Course models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::course;
use crate::error::{AppError, AppResult};

use super::{reject_blank, require_non_blank};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    /// Course code
    pub id: String,
    pub name: String,
    pub credits: i32,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> AppResult<()> {
        require_non_blank("id", &self.id)?;
        require_non_blank("name", &self.name)?;
        validate_credits(self.credits)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub credits: Option<i32>,
}

impl UpdateCourseRequest {
    pub fn validate(&self) -> AppResult<()> {
        reject_blank("name", self.name.as_deref())?;
        match self.credits {
            Some(credits) => validate_credits(credits),
            None => Ok(()),
        }
    }
}

fn validate_credits(credits: i32) -> AppResult<()> {
    if credits <= 0 {
        return Err(AppError::InvalidInput(
            "credits must be a positive number".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    pub id: String,
    pub name: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<course::Model> for CourseResponse {
    fn from(m: course::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            credits: m.credits,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
