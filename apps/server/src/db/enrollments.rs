//! Database operations for class enrollments.

use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::entity::class_enrollment::{self, ActiveModel, Entity as ClassEnrollment};
use crate::entity::class_section::Entity as ClassSection;
use crate::entity::student::{self, Entity as Student};
use crate::error::{AppError, AppResult};

use super::is_unique_violation;

/// Enroll an existing student. Unknown class or student is NotFound; an
/// existing pair is a Conflict.
pub async fn enroll(
    db: &DatabaseConnection,
    class_section_id: &str,
    student_id: &str,
) -> AppResult<class_enrollment::Model> {
    if ClassSection::find_by_id(class_section_id).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!("Class section {}", class_section_id)));
    }
    if Student::find_by_id(student_id).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!("Student {}", student_id)));
    }

    let duplicate = || {
        AppError::Conflict(format!(
            "Student {} is already enrolled in {}",
            student_id, class_section_id
        ))
    };

    let existing = ClassEnrollment::find_by_id((class_section_id.to_string(), student_id.to_string()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(duplicate());
    }

    let model = ActiveModel {
        class_section_id: Set(class_section_id.to_string()),
        student_id: Set(student_id.to_string()),
        created_at: Set(Utc::now()),
    };
    let created = model.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            duplicate()
        } else {
            AppError::from(e)
        }
    })?;

    info!("Enrolled student {} in {}", student_id, class_section_id);
    Ok(created)
}

/// Remove one enrollment. NotFound if the pair does not exist.
pub async fn unenroll(db: &DatabaseConnection, class_section_id: &str, student_id: &str) -> AppResult<()> {
    let result = ClassEnrollment::delete_many()
        .filter(class_enrollment::Column::ClassSectionId.eq(class_section_id))
        .filter(class_enrollment::Column::StudentId.eq(student_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "Enrollment of {} in {}",
            student_id, class_section_id
        )));
    }

    info!("Unenrolled student {} from {}", student_id, class_section_id);
    Ok(())
}

/// Students enrolled in a class section, ordered by id.
pub async fn list_students(
    db: &DatabaseConnection,
    class_section_id: &str,
) -> AppResult<Vec<student::Model>> {
    let rows = Student::find()
        .inner_join(ClassEnrollment)
        .filter(class_enrollment::Column::ClassSectionId.eq(class_section_id))
        .order_by_asc(student::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn student_ids(db: &DatabaseConnection, class_section_id: &str) -> AppResult<Vec<String>> {
    let ids = ClassEnrollment::find()
        .select_only()
        .column(class_enrollment::Column::StudentId)
        .filter(class_enrollment::Column::ClassSectionId.eq(class_section_id))
        .order_by_asc(class_enrollment::Column::StudentId)
        .into_tuple::<String>()
        .all(db)
        .await?;
    Ok(ids)
}
