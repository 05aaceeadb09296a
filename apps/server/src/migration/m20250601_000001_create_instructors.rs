//! Create instructors table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Instructor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Instructor::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Instructor::Name).string().not_null())
                    .col(
                        ColumnDef::new(Instructor::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Instructor::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Instructor::PhotoUrl).string())
                    .col(ColumnDef::new(Instructor::FunctionalPosition).string())
                    .col(ColumnDef::new(Instructor::Program).string())
                    .col(ColumnDef::new(Instructor::Competence).string())
                    .col(
                        ColumnDef::new(Instructor::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Instructor::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Instructor::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Instructor {
    #[sea_orm(iden = "instructors")]
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    PhotoUrl,
    FunctionalPosition,
    Program,
    Competence,
    CreatedAt,
    UpdatedAt,
}
