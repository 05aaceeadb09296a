//! Database operations for courses.

use chrono::Utc;
use sea_orm::*;

use crate::entity::course::{self, ActiveModel, Entity as Course};
use crate::error::{AppError, AppResult};
use crate::models::{CreateCourseRequest, UpdateCourseRequest};

use super::is_unique_violation;

pub async fn list(db: &DatabaseConnection) -> AppResult<Vec<course::Model>> {
    let rows = Course::find()
        .order_by_asc(course::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &DatabaseConnection, id: &str) -> AppResult<Option<course::Model>> {
    Ok(Course::find_by_id(id).one(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: &str) -> AppResult<course::Model> {
    find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {}", id)))
}

pub async fn insert(db: &DatabaseConnection, req: &CreateCourseRequest) -> AppResult<course::Model> {
    if find_by_id(db, &req.id).await?.is_some() {
        return Err(AppError::Conflict(format!("Course {} already exists", req.id)));
    }

    let now = Utc::now();
    let model = ActiveModel {
        id: Set(req.id.clone()),
        name: Set(req.name.clone()),
        credits: Set(req.credits),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Course {} already exists", req.id))
        } else {
            AppError::from(e)
        }
    })
}

pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    req: &UpdateCourseRequest,
) -> AppResult<course::Model> {
    let mut active: ActiveModel = get(db, id).await?.into();
    if let Some(ref name) = req.name {
        active.name = Set(name.clone());
    }
    if let Some(credits) = req.credits {
        active.credits = Set(credits);
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}
