//! `SeaORM` Entity for statement_definitions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::HierarchyKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "statement_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub kind: HierarchyKind,
    pub grouping_id: Option<Uuid>,
    pub parent_definition_id: Option<Uuid>,
    pub index: i32,
    pub is_posting: bool,
    pub name: String,
    pub name_in_total: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::statement_groupings::Entity",
        from = "Column::GroupingId",
        to = "super::statement_groupings::Column::Id"
    )]
    StatementGroupings,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentDefinitionId",
        to = "Column::Id"
    )]
    SelfRef,
}

impl Related<super::statement_groupings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatementGroupings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
