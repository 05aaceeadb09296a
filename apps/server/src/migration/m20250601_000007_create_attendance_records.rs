//! Create attendance_records table.

use sea_orm_migration::prelude::*;

use super::m20250601_000002_create_students::Student;
use super::m20250601_000006_create_recaps::Recap;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecord::RecapId)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecord::StudentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecord::Present)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(AttendanceRecord::RecapId)
                            .col(AttendanceRecord::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_records_recap")
                            .from(AttendanceRecord::Table, AttendanceRecord::RecapId)
                            .to(Recap::Table, Recap::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_records_student")
                            .from(AttendanceRecord::Table, AttendanceRecord::StudentId)
                            .to(Student::Table, Student::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_records_student_id")
                    .table(AttendanceRecord::Table)
                    .col(AttendanceRecord::StudentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceRecord::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AttendanceRecord {
    #[sea_orm(iden = "attendance_records")]
    Table,
    RecapId,
    StudentId,
    Present,
}
