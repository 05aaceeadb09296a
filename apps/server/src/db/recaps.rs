//! Recap creation and attendance queries.
//!
//! A recap is inserted together with its admitted attendance rows in one
//! transaction. Student ids that do not exist are reported back as skipped
//! instead of failing the batch.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::{debug, info};

use crate::entity::attendance_record::{self, Entity as AttendanceRecord};
use crate::entity::class_section::Entity as ClassSection;
use crate::entity::recap::{self, Entity as Recap};
use crate::entity::student::{self, Entity as Student};
use crate::error::{AppError, AppResult};
use crate::models::{AttendanceEntry, CreateRecapRequest};
use crate::services::short_id;

use super::{MAX_ID_ATTEMPTS, is_unique_violation, students};

/// A created recap with the rows that were admitted.
#[derive(Debug, Clone)]
pub struct CreatedRecap {
    pub recap: recap::Model,
    pub attendance: Vec<attendance_record::Model>,
    /// Unknown student ids, deduplicated, in input order
    pub skipped: Vec<String>,
}

/// Attendance row joined with the student's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentAttendance {
    pub student_id: String,
    pub student_name: String,
    pub present: bool,
}

/// Outcome of a presence-flag update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceUpdate {
    pub updated: u64,
    pub skipped: Vec<String>,
}

/// Distinct non-blank student ids in first-occurrence order.
fn distinct_student_ids(entries: &[AttendanceEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|e| e.student_id.trim())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// Split a batch into admitted entries and skipped ids. The first entry for a
/// student wins.
fn partition_batch(
    entries: &[AttendanceEntry],
    known: &HashSet<String>,
) -> (Vec<AttendanceEntry>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();
    let mut skipped = Vec::new();

    for entry in entries {
        let id = entry.student_id.trim();
        if id.is_empty() || !seen.insert(id) {
            continue;
        }
        if known.contains(id) {
            accepted.push(AttendanceEntry {
                student_id: id.to_string(),
                present: entry.present,
            });
        } else {
            skipped.push(id.to_string());
        }
    }

    (accepted, skipped)
}

enum Attempt {
    Created(CreatedRecap),
    Collision,
}

/// Create a recap with a freshly generated `REC` id.
pub async fn create_recap(db: &DatabaseConnection, req: &CreateRecapRequest) -> AppResult<CreatedRecap> {
    create_recap_with(db, req, short_id::recap_id).await
}

/// Create a recap drawing id candidates from `next_id`.
///
/// A candidate that already exists, or that loses an insert race, is treated
/// as a collision and the next one is tried. After [`MAX_ID_ATTEMPTS`]
/// collisions the request fails with Conflict.
pub async fn create_recap_with<F>(
    db: &DatabaseConnection,
    req: &CreateRecapRequest,
    mut next_id: F,
) -> AppResult<CreatedRecap>
where
    F: FnMut() -> String,
{
    req.validate()?;
    let class_section_id = req.class_section_id.trim();

    if ClassSection::find_by_id(class_section_id).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!("Class section {}", class_section_id)));
    }

    let requested = distinct_student_ids(&req.attendance);

    for attempt in 1..=MAX_ID_ATTEMPTS {
        let id = next_id();
        if Recap::find_by_id(id.as_str()).one(db).await?.is_some() {
            debug!("Recap id {} already taken (attempt {})", id, attempt);
            continue;
        }

        let txn = db.begin().await?;
        match try_insert(&txn, &id, class_section_id, req, &requested).await? {
            Attempt::Created(created) => {
                txn.commit().await?;
                info!(
                    "Created recap {} for {} ({} admitted, {} skipped)",
                    created.recap.id,
                    class_section_id,
                    created.attendance.len(),
                    created.skipped.len()
                );
                return Ok(created);
            }
            Attempt::Collision => {
                txn.rollback().await?;
                debug!("Recap id {} collided on insert (attempt {})", id, attempt);
            }
        }
    }

    Err(AppError::Conflict(format!(
        "Could not allocate a recap id after {} attempts",
        MAX_ID_ATTEMPTS
    )))
}

async fn try_insert(
    txn: &DatabaseTransaction,
    id: &str,
    class_section_id: &str,
    req: &CreateRecapRequest,
    requested: &[String],
) -> AppResult<Attempt> {
    let recap = recap::ActiveModel {
        id: Set(id.to_string()),
        class_section_id: Set(class_section_id.to_string()),
        session_index: Set(req.session_index),
        duration_minutes: Set(req.duration_minutes),
        created_at: Set(Utc::now()),
    };
    let recap = match recap.insert(txn).await {
        Ok(model) => model,
        Err(e) if is_unique_violation(&e) => return Ok(Attempt::Collision),
        Err(e) => return Err(e.into()),
    };

    let known: HashSet<String> = students::existing_ids(txn, requested)
        .await?
        .into_iter()
        .collect();
    let (accepted, skipped) = partition_batch(&req.attendance, &known);

    let attendance: Vec<attendance_record::Model> = accepted
        .into_iter()
        .map(|entry| attendance_record::Model {
            recap_id: recap.id.clone(),
            student_id: entry.student_id,
            present: entry.present,
        })
        .collect();

    if !attendance.is_empty() {
        let rows = attendance.iter().map(|row| attendance_record::ActiveModel {
            recap_id: Set(row.recap_id.clone()),
            student_id: Set(row.student_id.clone()),
            present: Set(row.present),
        });
        AttendanceRecord::insert_many(rows)
            .exec_without_returning(txn)
            .await?;
    }

    Ok(Attempt::Created(CreatedRecap {
        recap,
        attendance,
        skipped,
    }))
}

pub async fn get(db: &DatabaseConnection, id: &str) -> AppResult<recap::Model> {
    Recap::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recap {}", id)))
}

/// Recaps of a class section ordered by session. An existing class with no
/// recaps yields an empty list.
pub async fn list_for_class(db: &DatabaseConnection, class_section_id: &str) -> AppResult<Vec<recap::Model>> {
    if ClassSection::find_by_id(class_section_id).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!("Class section {}", class_section_id)));
    }

    let rows = Recap::find()
        .filter(recap::Column::ClassSectionId.eq(class_section_id))
        .order_by_asc(recap::Column::SessionIndex)
        .order_by_asc(recap::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows)
}

/// Attendance of one recap with student names, ordered by student id.
pub async fn attendance_with_names(db: &DatabaseConnection, recap_id: &str) -> AppResult<Vec<StudentAttendance>> {
    get(db, recap_id).await?;

    let rows = AttendanceRecord::find()
        .filter(attendance_record::Column::RecapId.eq(recap_id))
        .find_also_related(Student)
        .order_by_asc(attendance_record::Column::StudentId)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(record, student)| StudentAttendance {
            student_name: student.map(|s: student::Model| s.name).unwrap_or_default(),
            student_id: record.student_id,
            present: record.present,
        })
        .collect())
}

/// Update presence flags of existing rows. Ids without a row in this recap are
/// reported as skipped.
pub async fn update_attendance(
    db: &DatabaseConnection,
    recap_id: &str,
    entries: &[AttendanceEntry],
) -> AppResult<AttendanceUpdate> {
    get(db, recap_id).await?;

    let mut outcome = AttendanceUpdate::default();
    let mut seen = HashSet::new();
    let txn = db.begin().await?;

    for entry in entries {
        let student_id = entry.student_id.trim();
        if student_id.is_empty() || !seen.insert(student_id) {
            continue;
        }

        let result = AttendanceRecord::update_many()
            .col_expr(attendance_record::Column::Present, Expr::value(entry.present))
            .filter(attendance_record::Column::RecapId.eq(recap_id))
            .filter(attendance_record::Column::StudentId.eq(student_id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            outcome.skipped.push(student_id.to_string());
        } else {
            outcome.updated += result.rows_affected;
        }
    }

    txn.commit().await?;
    info!(
        "Updated attendance of recap {} ({} updated, {} skipped)",
        recap_id,
        outcome.updated,
        outcome.skipped.len()
    );
    Ok(outcome)
}
