//! `SeaORM` Entity for statement_groupings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::HierarchyKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "statement_groupings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub kind: HierarchyKind,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::statement_definitions::Entity")]
    StatementDefinitions,
}

impl Related<super::statement_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatementDefinitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
