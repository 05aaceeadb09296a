//! Cascade deletes.
//!
//! The dependency tree is fixed: instructor -> class_section -> recap ->
//! attendance_record, class_section -> class_enrollment, and student ->
//! {class_enrollment, attendance_record}. Each operation checks existence
//! first (NotFound, no side effects), then deletes leaves before parents inside
//! one transaction. Any failure after `begin` drops the transaction, which
//! rolls everything back.

use sea_orm::*;
use tracing::info;

use crate::entity::attendance_record::{self, Entity as AttendanceRecord};
use crate::entity::class_enrollment::{self, Entity as ClassEnrollment};
use crate::entity::class_section::{self, Entity as ClassSection};
use crate::entity::instructor::{self, Entity as Instructor};
use crate::entity::recap::{self, Entity as Recap};
use crate::entity::student::{self, Entity as Student};
use crate::error::{AppError, AppResult};

/// Rows removed by a class section delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSectionDeletion {
    pub class_section_id: String,
    pub recaps_deleted: u64,
    pub attendance_records_deleted: u64,
    pub enrollments_deleted: u64,
}

/// Rows removed by an instructor delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructorDeletion {
    pub instructor_id: String,
    pub class_sections_deleted: Vec<String>,
    pub recaps_deleted: u64,
    pub attendance_records_deleted: u64,
    pub enrollments_deleted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDeletion {
    pub student_id: String,
    pub attendance_records_deleted: u64,
    pub enrollments_deleted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecapDeletion {
    pub recap_id: String,
    pub attendance_records_deleted: u64,
}

#[derive(Debug, Default)]
struct ClosureCounts {
    class_sections: u64,
    recaps: u64,
    attendance_records: u64,
    enrollments: u64,
}

/// Delete a set of class sections and everything below them, leaves first.
async fn delete_class_section_closure<C: ConnectionTrait>(
    conn: &C,
    class_section_ids: &[String],
) -> Result<ClosureCounts, DbErr> {
    if class_section_ids.is_empty() {
        return Ok(ClosureCounts::default());
    }

    let recap_ids: Vec<String> = Recap::find()
        .select_only()
        .column(recap::Column::Id)
        .filter(recap::Column::ClassSectionId.is_in(class_section_ids.iter().cloned()))
        .into_tuple()
        .all(conn)
        .await?;

    let attendance_records = if recap_ids.is_empty() {
        0
    } else {
        AttendanceRecord::delete_many()
            .filter(attendance_record::Column::RecapId.is_in(recap_ids.iter().cloned()))
            .exec(conn)
            .await?
            .rows_affected
    };

    let recaps = Recap::delete_many()
        .filter(recap::Column::ClassSectionId.is_in(class_section_ids.iter().cloned()))
        .exec(conn)
        .await?
        .rows_affected;

    let enrollments = ClassEnrollment::delete_many()
        .filter(class_enrollment::Column::ClassSectionId.is_in(class_section_ids.iter().cloned()))
        .exec(conn)
        .await?
        .rows_affected;

    let class_sections = ClassSection::delete_many()
        .filter(class_section::Column::Id.is_in(class_section_ids.iter().cloned()))
        .exec(conn)
        .await?
        .rows_affected;

    Ok(ClosureCounts {
        class_sections,
        recaps,
        attendance_records,
        enrollments,
    })
}

/// Delete a class section with its recaps, their attendance records and its
/// enrollments. All or nothing.
pub async fn delete_class_section(db: &DatabaseConnection, id: &str) -> AppResult<ClassSectionDeletion> {
    let not_found = || AppError::NotFound(format!("Class section {}", id));

    if ClassSection::find_by_id(id).one(db).await?.is_none() {
        return Err(not_found());
    }

    let txn = db.begin().await?;
    let counts = delete_class_section_closure(&txn, &[id.to_string()]).await?;
    if counts.class_sections == 0 {
        // Removed by a concurrent request between the check and the transaction
        return Err(not_found());
    }
    txn.commit().await?;

    info!(
        "Deleted class section {} ({} recaps, {} attendance records, {} enrollments)",
        id, counts.recaps, counts.attendance_records, counts.enrollments
    );

    Ok(ClassSectionDeletion {
        class_section_id: id.to_string(),
        recaps_deleted: counts.recaps,
        attendance_records_deleted: counts.attendance_records,
        enrollments_deleted: counts.enrollments,
    })
}

/// Delete an instructor together with every class section they own and the
/// whole closure below those sections. All or nothing.
pub async fn delete_instructor(db: &DatabaseConnection, id: &str) -> AppResult<InstructorDeletion> {
    let not_found = || AppError::NotFound(format!("Instructor {}", id));

    if Instructor::find_by_id(id).one(db).await?.is_none() {
        return Err(not_found());
    }

    let txn = db.begin().await?;

    let class_section_ids: Vec<String> = ClassSection::find()
        .select_only()
        .column(class_section::Column::Id)
        .filter(class_section::Column::InstructorId.eq(id))
        .order_by_asc(class_section::Column::Id)
        .into_tuple()
        .all(&txn)
        .await?;

    let counts = delete_class_section_closure(&txn, &class_section_ids).await?;

    let removed = Instructor::delete_many()
        .filter(instructor::Column::Id.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    if removed == 0 {
        return Err(not_found());
    }
    txn.commit().await?;

    info!(
        "Deleted instructor {} ({} class sections, {} recaps, {} attendance records, {} enrollments)",
        id, counts.class_sections, counts.recaps, counts.attendance_records, counts.enrollments
    );

    Ok(InstructorDeletion {
        instructor_id: id.to_string(),
        class_sections_deleted: class_section_ids,
        recaps_deleted: counts.recaps,
        attendance_records_deleted: counts.attendance_records,
        enrollments_deleted: counts.enrollments,
    })
}

/// Delete a student with their attendance records and enrollments.
pub async fn delete_student(db: &DatabaseConnection, id: &str) -> AppResult<StudentDeletion> {
    let not_found = || AppError::NotFound(format!("Student {}", id));

    if Student::find_by_id(id).one(db).await?.is_none() {
        return Err(not_found());
    }

    let txn = db.begin().await?;

    let attendance_records_deleted = AttendanceRecord::delete_many()
        .filter(attendance_record::Column::StudentId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    let enrollments_deleted = ClassEnrollment::delete_many()
        .filter(class_enrollment::Column::StudentId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    let removed = Student::delete_many()
        .filter(student::Column::Id.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    if removed == 0 {
        return Err(not_found());
    }
    txn.commit().await?;

    info!(
        "Deleted student {} ({} attendance records, {} enrollments)",
        id, attendance_records_deleted, enrollments_deleted
    );

    Ok(StudentDeletion {
        student_id: id.to_string(),
        attendance_records_deleted,
        enrollments_deleted,
    })
}

/// Delete one recap and its attendance records.
pub async fn delete_recap(db: &DatabaseConnection, id: &str) -> AppResult<RecapDeletion> {
    let not_found = || AppError::NotFound(format!("Recap {}", id));

    if Recap::find_by_id(id).one(db).await?.is_none() {
        return Err(not_found());
    }

    let txn = db.begin().await?;

    let attendance_records_deleted = AttendanceRecord::delete_many()
        .filter(attendance_record::Column::RecapId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    let removed = Recap::delete_many()
        .filter(recap::Column::Id.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    if removed == 0 {
        return Err(not_found());
    }
    txn.commit().await?;

    info!(
        "Deleted recap {} ({} attendance records)",
        id, attendance_records_deleted
    );

    Ok(RecapDeletion {
        recap_id: id.to_string(),
        attendance_records_deleted,
    })
}
