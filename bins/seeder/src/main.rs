//! Demo seeder for Coopledger.
//!
//! Creates a fresh tenant with a small chart of accounts, arranges it in
//! both statement hierarchies through the hierarchy service, posts a few
//! member transactions and prints the resulting balances as JSON.
//!
//! Usage: cargo run --bin seeder (after `migrator up`)

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use coopledger_core::hierarchy::{
    Account, HierarchyKind, HierarchyService, StatementDefinition, StatementGrouping,
};
use coopledger_core::ledger::{
    BalanceAggregator, GeneralLedgerType, LedgerFilter, LedgerQuery, LedgerSource,
    daily_ending_balances, summarize,
};
use coopledger_db::repositories::{
    ChartRepository, CreateAccountInput, CreateDefinitionInput, PostEntryInput,
};
use coopledger_db::{SeaHierarchyStore, SeaLedgerQuery, connect_with};
use coopledger_shared::config::LoggingConfig;
use coopledger_shared::types::{BranchId, MemberProfileId, OrganizationId};
use coopledger_shared::{AppConfig, TenantScope};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    let chart = ChartRepository::new(db.clone());
    let store = Arc::new(SeaHierarchyStore::new(db.clone()));
    let hierarchy = HierarchyService::new(Arc::clone(&store));
    let ledger = SeaLedgerQuery::new(db, config.ledger.unknown_account_type);

    let tenant = TenantScope::new(OrganizationId::new(), BranchId::new());
    info!(%tenant, "Seeding demo tenant");

    let fs_assets = chart
        .create_grouping(tenant, HierarchyKind::FinancialStatement, "Assets")
        .await?;
    let gl_assets = chart
        .create_grouping(tenant, HierarchyKind::GeneralLedger, "Assets")
        .await?;

    let cash = definition(&chart, tenant, &fs_assets, 0, "Cash and Cash Equivalents").await?;
    let receivables = definition(&chart, tenant, &fs_assets, 1, "Loans Receivable").await?;
    let member_funds = definition(&chart, tenant, &gl_assets, 0, "Member Funds").await?;

    let cash_on_hand = account(&chart, tenant, "Cash on Hand", "Other", GeneralLedgerType::Assets).await?;
    let savings = account(&chart, tenant, "Savings Deposit", "Deposit", GeneralLedgerType::Liabilities).await?;
    let time_deposit =
        account(&chart, tenant, "Time Deposit", "Time Deposit", GeneralLedgerType::Liabilities).await?;
    let loan = account(&chart, tenant, "Regular Loan", "Loan", GeneralLedgerType::Assets).await?;
    let capital = account(&chart, tenant, "Share Capital", "Share Capital", GeneralLedgerType::Equity).await?;

    for account in [&cash_on_hand, &savings, &time_deposit] {
        hierarchy
            .link_account(HierarchyKind::FinancialStatement, cash.id, account.id)
            .await?;
    }
    hierarchy
        .link_account(HierarchyKind::FinancialStatement, receivables.id, loan.id)
        .await?;
    for account in [&savings, &time_deposit, &capital] {
        hierarchy
            .link_account(HierarchyKind::GeneralLedger, member_funds.id, account.id)
            .await?;
    }

    // Reorder within one definition, then cross-attach to another.
    hierarchy
        .reorder_account(HierarchyKind::FinancialStatement, cash.id, time_deposit.id, 0)
        .await?;
    let moved = hierarchy
        .reorder_account(HierarchyKind::FinancialStatement, receivables.id, savings.id, 0)
        .await?;
    info!(changed = moved.changed.len(), "Cross-attached savings");

    let member = MemberProfileId::new();
    let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).context("invalid demo date");
    let mut rows = vec![
        PostEntryInput::new(savings.id, LedgerSource::Deposit, Decimal::new(10_000, 2), Decimal::ZERO, day(1)?),
        PostEntryInput::new(savings.id, LedgerSource::Withdraw, Decimal::ZERO, Decimal::new(3_000, 2), day(3)?),
        PostEntryInput::new(loan.id, LedgerSource::Loan, Decimal::ZERO, Decimal::new(50_000, 2), day(1)?),
        PostEntryInput::new(loan.id, LedgerSource::Payment, Decimal::new(20_000, 2), Decimal::ZERO, day(4)?),
        PostEntryInput::new(capital.id, LedgerSource::Journal, Decimal::ZERO, Decimal::new(25_000, 2), day(2)?),
    ];
    for row in &mut rows {
        row.member_profile_id = Some(member);
    }
    rows.push(PostEntryInput::new(
        cash_on_hand.id,
        LedgerSource::Deposit,
        Decimal::new(10_000, 2),
        Decimal::ZERO,
        day(1)?,
    ));
    chart.post_entries(tenant, rows).await?;

    let member_filter = LedgerFilter::new().member(member).excluding(cash_on_hand.id);
    let overall = summarize(&ledger, tenant, &member_filter).await?;

    let savings_entries = ledger
        .find_entries(tenant, &member_filter.clone().account(savings.id))
        .await?;
    let savings_summary = BalanceAggregator::aggregate(&savings_entries);
    let savings_daily = daily_ending_balances(Decimal::ZERO, &savings_entries, day(1)?, day(5)?)?;

    let loan_summary = summarize(&ledger, tenant, &member_filter.clone().account(loan.id)).await?;

    let report = serde_json::json!({
        "tenant": tenant.to_string(),
        "member": member.to_string(),
        "member_total": overall,
        "savings": { "summary": savings_summary, "daily": savings_daily },
        "loan": loan_summary,
        "groupings": {
            "financial_statement": store.groupings(tenant, HierarchyKind::FinancialStatement).await?,
            "general_ledger": store.groupings(tenant, HierarchyKind::GeneralLedger).await?,
        },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Seeding complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn definition(
    chart: &ChartRepository,
    tenant: TenantScope,
    grouping: &StatementGrouping,
    index: i32,
    name: &str,
) -> anyhow::Result<StatementDefinition> {
    let definition = chart
        .create_definition(CreateDefinitionInput {
            tenant,
            kind: grouping.kind,
            grouping_id: Some(grouping.id),
            parent_definition_id: None,
            index,
            name: name.to_string(),
            is_posting: true,
        })
        .await?;
    Ok(definition)
}

async fn account(
    chart: &ChartRepository,
    tenant: TenantScope,
    name: &str,
    account_type: &str,
    general_ledger_type: GeneralLedgerType,
) -> anyhow::Result<Account> {
    let account = chart
        .create_account(CreateAccountInput {
            tenant,
            name: name.to_string(),
            account_type: account_type.to_string(),
            general_ledger_type: Some(general_ledger_type),
        })
        .await?;
    Ok(account)
}
