//! In-memory SQLite fixtures for unit tests.

use chrono::Utc;
use sea_orm::*;
use sea_orm_migration::MigratorTrait;

use crate::entity::{
    attendance_record, class_enrollment, class_section, course, instructor, recap, student,
};
use crate::migration::Migrator;

/// Fresh migrated database. A single connection keeps the in-memory store alive.
pub(crate) async fn sqlite_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub(crate) async fn count<E: EntityTrait>(db: &DatabaseConnection) -> u64
where
    E::Model: Sync,
{
    E::find().count(db).await.expect("count rows")
}

pub(crate) async fn seed_instructor(db: &DatabaseConnection, id: &str) -> instructor::Model {
    if let Some(existing) = instructor::Entity::find_by_id(id).one(db).await.unwrap() {
        return existing;
    }
    let now = Utc::now();
    instructor::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("Instructor {}", id)),
        email: Set(format!("{}@campus.test", id)),
        password_hash: Set("not-a-real-hash".to_string()),
        photo_url: Set(None),
        functional_position: Set(None),
        program: Set(None),
        competence: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed instructor")
}

pub(crate) async fn seed_course(db: &DatabaseConnection, id: &str) -> course::Model {
    if let Some(existing) = course::Entity::find_by_id(id).one(db).await.unwrap() {
        return existing;
    }
    let now = Utc::now();
    course::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("Course {}", id)),
        credits: Set(3),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed course")
}

pub(crate) async fn seed_student(db: &DatabaseConnection, id: &str) -> student::Model {
    let now = Utc::now();
    student::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("Student {}", id)),
        program: Set("Informatika".to_string()),
        storage_folder: Set(format!("students/{}/", id)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed student")
}

/// Class section under course IF101, creating the instructor if needed.
pub(crate) async fn seed_class_section(
    db: &DatabaseConnection,
    id: &str,
    instructor_id: &str,
) -> class_section::Model {
    seed_instructor(db, instructor_id).await;
    seed_course(db, "IF101").await;
    let now = Utc::now();
    class_section::ActiveModel {
        id: Set(id.to_string()),
        course_id: Set("IF101".to_string()),
        instructor_id: Set(instructor_id.to_string()),
        schedule: Set(None),
        room: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed class section")
}

pub(crate) async fn seed_enrollment(db: &DatabaseConnection, class_section_id: &str, student_id: &str) {
    class_enrollment::ActiveModel {
        class_section_id: Set(class_section_id.to_string()),
        student_id: Set(ToString::to_string(student_id)),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed enrollment");
}

/// Recap with every listed student marked present.
pub(crate) async fn seed_recap(
    db: &DatabaseConnection,
    id: &str,
    class_section_id: &str,
    student_ids: &[&str],
) {
    recap::ActiveModel {
        id: Set(id.to_string()),
        class_section_id: Set(class_section_id.to_string()),
        session_index: Set(1),
        duration_minutes: Set(90),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed recap");

    for student_id in student_ids {
        attendance_record::ActiveModel {
            recap_id: Set(id.to_string()),
            student_id: Set(ToString::to_string(student_id)),
            present: Set(true),
        }
        .insert(db)
        .await
        .expect("seed attendance");
    }
}
