//! Create class_enrollments table.

use sea_orm_migration::prelude::*;

use super::m20250601_000002_create_students::Student;
use super::m20250601_000004_create_class_sections::ClassSection;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClassEnrollment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassEnrollment::ClassSectionId)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassEnrollment::StudentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassEnrollment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ClassEnrollment::ClassSectionId)
                            .col(ClassEnrollment::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_enrollments_class_section")
                            .from(ClassEnrollment::Table, ClassEnrollment::ClassSectionId)
                            .to(ClassSection::Table, ClassSection::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_enrollments_student")
                            .from(ClassEnrollment::Table, ClassEnrollment::StudentId)
                            .to(Student::Table, Student::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_enrollments_student_id")
                    .table(ClassEnrollment::Table)
                    .col(ClassEnrollment::StudentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClassEnrollment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ClassEnrollment {
    #[sea_orm(iden = "class_enrollments")]
    Table,
    ClassSectionId,
    StudentId,
    CreatedAt,
}
