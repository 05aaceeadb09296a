//! Create recaps table.

use sea_orm_migration::prelude::*;

use super::m20250601_000004_create_class_sections::ClassSection;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recap::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recap::Id)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recap::ClassSectionId).string_len(16).not_null())
                    .col(ColumnDef::new(Recap::SessionIndex).integer().not_null())
                    .col(ColumnDef::new(Recap::DurationMinutes).integer().not_null())
                    .col(
                        ColumnDef::new(Recap::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recaps_class_section")
                            .from(Recap::Table, Recap::ClassSectionId)
                            .to(ClassSection::Table, ClassSection::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recaps_class_section_id")
                    .table(Recap::Table)
                    .col(Recap::ClassSectionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Recap::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Recap {
    #[sea_orm(iden = "recaps")]
    Table,
    Id,
    ClassSectionId,
    SessionIndex,
    DurationMinutes,
    CreatedAt,
}
