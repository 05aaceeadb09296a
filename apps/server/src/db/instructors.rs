//! Database operations for instructors.

use chrono::Utc;
use sea_orm::*;

use crate::entity::instructor::{self, ActiveModel, Entity as Instructor};
use crate::error::{AppError, AppResult};
use crate::models::{CreateInstructorRequest, UpdateInstructorRequest};

use super::is_unique_violation;

pub async fn list(db: &DatabaseConnection) -> AppResult<Vec<instructor::Model>> {
    let rows = Instructor::find()
        .order_by_asc(instructor::Column::Name)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &DatabaseConnection, id: &str) -> AppResult<Option<instructor::Model>> {
    Ok(Instructor::find_by_id(id).one(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: &str) -> AppResult<instructor::Model> {
    find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Instructor {}", id)))
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> AppResult<Option<instructor::Model>> {
    let result = Instructor::find()
        .filter(instructor::Column::Email.eq(email))
        .one(db)
        .await?;
    Ok(result)
}

/// Insert an instructor. Duplicate id or email is a Conflict.
pub async fn insert(
    db: &DatabaseConnection,
    req: &CreateInstructorRequest,
    password_hash: String,
) -> AppResult<instructor::Model> {
    if find_by_id(db, &req.id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Instructor {} already exists",
            req.id
        )));
    }
    if find_by_email(db, &req.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Email {} is already registered",
            req.email
        )));
    }

    let now = Utc::now();
    let model = ActiveModel {
        id: Set(req.id.clone()),
        name: Set(req.name.clone()),
        email: Set(req.email.clone()),
        password_hash: Set(password_hash),
        photo_url: Set(req.photo_url.clone()),
        functional_position: Set(req.functional_position.clone()),
        program: Set(req.program.clone()),
        competence: Set(req.competence.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Instructor {} already exists", req.id))
        } else {
            AppError::from(e)
        }
    })
}

/// Apply a partial update. `password_hash` replaces the stored hash when given.
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    req: &UpdateInstructorRequest,
    password_hash: Option<String>,
) -> AppResult<instructor::Model> {
    let existing = get(db, id).await?;

    if let Some(ref email) = req.email
        && email != &existing.email
        && find_by_email(db, email).await?.is_some()
    {
        return Err(AppError::Conflict(format!(
            "Email {} is already registered",
            email
        )));
    }

    let mut active: ActiveModel = existing.into();
    if let Some(ref name) = req.name {
        active.name = Set(name.clone());
    }
    if let Some(ref email) = req.email {
        active.email = Set(email.clone());
    }
    if let Some(hash) = password_hash {
        active.password_hash = Set(hash);
    }
    if req.photo_url.is_some() {
        active.photo_url = Set(req.photo_url.clone());
    }
    if req.functional_position.is_some() {
        active.functional_position = Set(req.functional_position.clone());
    }
    if req.program.is_some() {
        active.program = Set(req.program.clone());
    }
    if req.competence.is_some() {
        active.competence = Set(req.competence.clone());
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}
