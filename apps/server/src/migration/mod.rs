//! SeaORM database migrations.
//!
//! Foreign keys are declared without ON DELETE CASCADE. Dependent rows are
//! removed explicitly by `db::cascade`, so an out-of-order delete is rejected.

pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_instructors;
mod m20250601_000002_create_students;
mod m20250601_000003_create_courses;
mod m20250601_000004_create_class_sections;
mod m20250601_000005_create_class_enrollments;
mod m20250601_000006_create_recaps;
mod m20250601_000007_create_attendance_records;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_instructors::Migration),
            Box::new(m20250601_000002_create_students::Migration),
            Box::new(m20250601_000003_create_courses::Migration),
            Box::new(m20250601_000004_create_class_sections::Migration),
            Box::new(m20250601_000005_create_class_enrollments::Migration),
            Box::new(m20250601_000006_create_recaps::Migration),
            Box::new(m20250601_000007_create_attendance_records::Migration),
        ]
    }
}
