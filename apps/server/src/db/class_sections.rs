//! Database operations for class sections.

use chrono::Utc;
use sea_orm::*;
use tracing::{debug, info};

use crate::entity::class_section::{self, ActiveModel, Entity as ClassSection};
use crate::entity::course::{self, Entity as Course};
use crate::entity::instructor::Entity as Instructor;
use crate::error::{AppError, AppResult};
use crate::models::UpdateClassSectionRequest;
use crate::services::short_id;

use super::{MAX_ID_ATTEMPTS, is_unique_violation};

/// Fields of a class section before it has an id.
#[derive(Debug, Clone)]
pub struct NewClassSection {
    pub course_id: String,
    pub instructor_id: String,
    pub schedule: Option<String>,
    pub room: Option<String>,
}

/// All class sections with their course, ordered by id.
pub async fn list_with_course(
    db: &DatabaseConnection,
) -> AppResult<Vec<(class_section::Model, Option<course::Model>)>> {
    let rows = ClassSection::find()
        .find_also_related(Course)
        .order_by_asc(class_section::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

/// Class sections taught by one instructor, with their course.
pub async fn list_for_instructor(
    db: &DatabaseConnection,
    instructor_id: &str,
) -> AppResult<Vec<(class_section::Model, Option<course::Model>)>> {
    let rows = ClassSection::find()
        .filter(class_section::Column::InstructorId.eq(instructor_id))
        .find_also_related(Course)
        .order_by_asc(class_section::Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: &str,
) -> AppResult<Option<class_section::Model>> {
    Ok(ClassSection::find_by_id(id).one(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: &str) -> AppResult<class_section::Model> {
    find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Class section {}", id)))
}

pub async fn course_name(db: &DatabaseConnection, course_id: &str) -> AppResult<Option<String>> {
    let name = Course::find_by_id(course_id)
        .select_only()
        .column(course::Column::Name)
        .into_tuple::<String>()
        .one(db)
        .await?;
    Ok(name)
}

async fn ensure_references(db: &DatabaseConnection, course_id: &str, instructor_id: &str) -> AppResult<()> {
    if Course::find_by_id(course_id).one(db).await?.is_none() {
        return Err(AppError::InvalidInput(format!("Unknown course {}", course_id)));
    }
    if Instructor::find_by_id(instructor_id).one(db).await?.is_none() {
        return Err(AppError::InvalidInput(format!(
            "Unknown instructor {}",
            instructor_id
        )));
    }
    Ok(())
}

/// Insert under `id`. `None` means another row already holds that id.
async fn insert_candidate(
    db: &DatabaseConnection,
    id: &str,
    new: &NewClassSection,
) -> AppResult<Option<class_section::Model>> {
    let now = Utc::now();
    let model = ActiveModel {
        id: Set(id.to_string()),
        course_id: Set(new.course_id.clone()),
        instructor_id: Set(new.instructor_id.clone()),
        schedule: Set(new.schedule.clone()),
        room: Set(new.room.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    match model.insert(db).await {
        Ok(created) => Ok(Some(created)),
        Err(e) if is_unique_violation(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Create a class section with a freshly generated id.
pub async fn create(db: &DatabaseConnection, new: NewClassSection) -> AppResult<class_section::Model> {
    create_with(db, new, short_id::class_section_id).await
}

/// Create a class section drawing id candidates from `next_id`.
///
/// Each candidate is checked against existing ids and the insert also treats a
/// uniqueness violation as a collision. Gives up with Conflict after
/// [`MAX_ID_ATTEMPTS`] candidates.
pub async fn create_with<F>(
    db: &DatabaseConnection,
    new: NewClassSection,
    mut next_id: F,
) -> AppResult<class_section::Model>
where
    F: FnMut() -> String,
{
    ensure_references(db, &new.course_id, &new.instructor_id).await?;

    for _ in 0..MAX_ID_ATTEMPTS {
        let id = next_id();
        if ClassSection::find_by_id(id.as_str()).one(db).await?.is_some() {
            debug!("Class section id {} already taken, retrying", id);
            continue;
        }

        if let Some(created) = insert_candidate(db, &id, &new).await? {
            info!(
                "Created class section {} (course={}, instructor={})",
                created.id, created.course_id, created.instructor_id
            );
            return Ok(created);
        }
        debug!("Class section id {} collided on insert, retrying", id);
    }

    Err(AppError::Conflict(format!(
        "Could not allocate a class section id after {} attempts",
        MAX_ID_ATTEMPTS
    )))
}

/// Apply a partial update. The instructor is only reassigned when
/// `allow_reassign` is set.
pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    req: &UpdateClassSectionRequest,
    allow_reassign: bool,
) -> AppResult<class_section::Model> {
    let existing = get(db, id).await?;

    let course_id = req.course_id.clone().unwrap_or_else(|| existing.course_id.clone());
    let instructor_id = match req.instructor_id {
        Some(ref requested) if allow_reassign => requested.clone(),
        Some(ref requested) if requested != &existing.instructor_id => {
            return Err(AppError::Forbidden(
                "Only an admin can reassign a class section".to_string(),
            ));
        }
        _ => existing.instructor_id.clone(),
    };
    ensure_references(db, &course_id, &instructor_id).await?;

    let mut active: ActiveModel = existing.into();
    active.course_id = Set(course_id);
    active.instructor_id = Set(instructor_id);
    if req.schedule.is_some() {
        active.schedule = Set(req.schedule.clone());
    }
    if req.room.is_some() {
        active.room = Set(req.room.clone());
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}
