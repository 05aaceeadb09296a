//! Database operations for students.

use chrono::Utc;
use sea_orm::*;

use crate::entity::student::{self, ActiveModel, Entity as Student};
use crate::error::{AppError, AppResult};
use crate::models::{CreateStudentRequest, UpdateStudentRequest};

use super::is_unique_violation;

pub async fn list(db: &DatabaseConnection) -> AppResult<Vec<student::Model>> {
    let rows = Student::find()
        .order_by_asc(student::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &DatabaseConnection, id: &str) -> AppResult<Option<student::Model>> {
    Ok(Student::find_by_id(id).one(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: &str) -> AppResult<student::Model> {
    find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student {}", id)))
}

/// Which of `ids` exist, in one query.
pub async fn existing_ids<C: ConnectionTrait>(db: &C, ids: &[String]) -> AppResult<Vec<String>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let found = Student::find()
        .select_only()
        .column(student::Column::Id)
        .filter(student::Column::Id.is_in(ids.iter().cloned()))
        .into_tuple::<String>()
        .all(db)
        .await?;
    Ok(found)
}

/// Insert a student whose photos live under `storage_folder`.
pub async fn insert(
    db: &DatabaseConnection,
    req: &CreateStudentRequest,
    storage_folder: String,
) -> AppResult<student::Model> {
    if find_by_id(db, &req.id).await?.is_some() {
        return Err(AppError::Conflict(format!("Student {} already exists", req.id)));
    }

    let now = Utc::now();
    let model = ActiveModel {
        id: Set(req.id.clone()),
        name: Set(req.name.clone()),
        program: Set(req.program.clone()),
        storage_folder: Set(storage_folder),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Student {} already exists", req.id))
        } else {
            AppError::from(e)
        }
    })
}

pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    req: &UpdateStudentRequest,
) -> AppResult<student::Model> {
    let mut active: ActiveModel = get(db, id).await?.into();
    if let Some(ref name) = req.name {
        active.name = Set(name.clone());
    }
    if let Some(ref program) = req.program {
        active.program = Set(program.clone());
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}
