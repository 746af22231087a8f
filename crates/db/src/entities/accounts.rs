//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::GeneralLedgerType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub account_type: String,
    pub general_ledger_type: Option<GeneralLedgerType>,
    pub financial_statement_definition_id: Option<Uuid>,
    #[sea_orm(column_type = "Double")]
    pub financial_statement_index: f64,
    pub general_ledger_definition_id: Option<Uuid>,
    #[sea_orm(column_type = "Double")]
    pub general_ledger_index: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::statement_definitions::Entity",
        from = "Column::FinancialStatementDefinitionId",
        to = "super::statement_definitions::Column::Id"
    )]
    FinancialStatementDefinition,
    #[sea_orm(
        belongs_to = "super::statement_definitions::Entity",
        from = "Column::GeneralLedgerDefinitionId",
        to = "super::statement_definitions::Column::Id"
    )]
    GeneralLedgerDefinition,
    #[sea_orm(has_many = "super::general_ledger_entries::Entity")]
    GeneralLedgerEntries,
}

impl Related<super::general_ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneralLedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
