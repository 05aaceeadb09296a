//! Create class_sections table.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_instructors::Instructor;
use super::m20250601_000003_create_courses::Course;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClassSection::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSection::Id)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassSection::CourseId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ClassSection::InstructorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClassSection::Schedule).string())
                    .col(ColumnDef::new(ClassSection::Room).string())
                    .col(
                        ColumnDef::new(ClassSection::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassSection::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_sections_course")
                            .from(ClassSection::Table, ClassSection::CourseId)
                            .to(Course::Table, Course::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_sections_instructor")
                            .from(ClassSection::Table, ClassSection::InstructorId)
                            .to(Instructor::Table, Instructor::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_sections_instructor_id")
                    .table(ClassSection::Table)
                    .col(ClassSection::InstructorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClassSection::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ClassSection {
    #[sea_orm(iden = "class_sections")]
    Table,
    Id,
    CourseId,
    InstructorId,
    Schedule,
    Room,
    CreatedAt,
    UpdatedAt,
}
