//! Recap (attendance session) entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recaps")]
pub struct Model {
    /// Generated short code, e.g. `REC7K2QZ`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub class_section_id: String,
    /// Meeting number within the class section
    pub session_index: i32,
    pub duration_minutes: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_section::Entity",
        from = "Column::ClassSectionId",
        to = "super::class_section::Column::Id"
    )]
    ClassSection,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
}

impl Related<super::class_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSection.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
