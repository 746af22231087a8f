//! Initial database migration.
//!
//! Creates the statement hierarchy tables, the chart of accounts and the
//! general ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(STATEMENT_GROUPINGS_SQL).await?;
        db.execute_unprepared(STATEMENT_DEFINITIONS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(GENERAL_LEDGER_ENTRIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE hierarchy_kind AS ENUM ('financial_statement', 'general_ledger');

CREATE TYPE general_ledger_type AS ENUM ('Assets', 'Liabilities', 'Equity', 'Revenue', 'Expenses');

CREATE TYPE ledger_source AS ENUM (
    'withdraw',
    'deposit',
    'journal',
    'payment',
    'adjustment',
    'journal voucher',
    'check voucher',
    'loan',
    'savings interest',
    'mutual contribution'
);
";

const STATEMENT_GROUPINGS_SQL: &str = r"
CREATE TABLE statement_groupings (
    id              UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id       UUID NOT NULL,
    kind            hierarchy_kind NOT NULL,
    name            VARCHAR(255) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_statement_groupings_tenant ON statement_groupings(organization_id, branch_id, kind);
";

const STATEMENT_DEFINITIONS_SQL: &str = r#"
CREATE TABLE statement_definitions (
    id                   UUID PRIMARY KEY,
    organization_id      UUID NOT NULL,
    branch_id            UUID NOT NULL,
    kind                 hierarchy_kind NOT NULL,
    grouping_id          UUID REFERENCES statement_groupings(id) ON DELETE SET NULL,
    parent_definition_id UUID REFERENCES statement_definitions(id) ON DELETE RESTRICT,
    "index"              INTEGER NOT NULL DEFAULT 0,
    is_posting           BOOLEAN NOT NULL DEFAULT FALSE,
    name                 VARCHAR(255) NOT NULL,
    name_in_total        VARCHAR(255),
    created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_statement_definitions_not_own_parent CHECK (parent_definition_id <> id)
);

CREATE INDEX idx_statement_definitions_grouping ON statement_definitions(grouping_id, "index");
CREATE INDEX idx_statement_definitions_parent ON statement_definitions(parent_definition_id, "index");
"#;

// account_type is free text. Labels outside the sign table are resolved by
// the ledger's unknown account type policy.
const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id                                UUID PRIMARY KEY,
    organization_id                   UUID NOT NULL,
    branch_id                         UUID NOT NULL,
    name                              VARCHAR(255) NOT NULL,
    account_type                      VARCHAR(50) NOT NULL,
    general_ledger_type               general_ledger_type,
    financial_statement_definition_id UUID REFERENCES statement_definitions(id) ON DELETE RESTRICT,
    financial_statement_index         DOUBLE PRECISION NOT NULL DEFAULT 0,
    general_ledger_definition_id      UUID REFERENCES statement_definitions(id) ON DELETE RESTRICT,
    general_ledger_index              DOUBLE PRECISION NOT NULL DEFAULT 0,
    created_at                        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at                        TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_accounts_tenant ON accounts(organization_id, branch_id);
CREATE INDEX idx_accounts_fs_definition
    ON accounts(financial_statement_definition_id, financial_statement_index);
CREATE INDEX idx_accounts_gl_definition
    ON accounts(general_ledger_definition_id, general_ledger_index);
";

const GENERAL_LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE general_ledger_entries (
    id                   UUID PRIMARY KEY,
    organization_id      UUID NOT NULL,
    branch_id            UUID NOT NULL,
    account_id           UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    member_profile_id    UUID,
    employee_user_id     UUID,
    transaction_id       UUID,
    transaction_batch_id UUID,
    payment_type_id      UUID,
    source               ledger_source NOT NULL,
    debit                NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit               NUMERIC(19, 4) NOT NULL DEFAULT 0,
    entry_date           DATE NOT NULL,
    created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_general_ledger_entries_non_negative CHECK (debit >= 0 AND credit >= 0)
);

CREATE INDEX idx_general_ledger_entries_tenant
    ON general_ledger_entries(organization_id, branch_id, entry_date);
CREATE INDEX idx_general_ledger_entries_account ON general_ledger_entries(account_id, entry_date);
CREATE INDEX idx_general_ledger_entries_member ON general_ledger_entries(member_profile_id)
    WHERE member_profile_id IS NOT NULL;
CREATE INDEX idx_general_ledger_entries_batch ON general_ledger_entries(transaction_batch_id)
    WHERE transaction_batch_id IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS general_ledger_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS statement_definitions CASCADE;
DROP TABLE IF EXISTS statement_groupings CASCADE;

DROP TYPE IF EXISTS ledger_source CASCADE;
DROP TYPE IF EXISTS general_ledger_type CASCADE;
DROP TYPE IF EXISTS hierarchy_kind CASCADE;
";
