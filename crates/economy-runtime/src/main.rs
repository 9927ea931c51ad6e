//! # Economy Runtime
//!
//! Wires the economy subsystems and runs a smoke scenario against the
//! in-memory adapters: grant, transfer, rollback.

use anyhow::{Context, Result};
use economy_runtime::{bootstrap, EconomyContainer};
use economy_telemetry::{
    init_telemetry, log_event, log_mutation_event, subsystem_span, TelemetryConfig,
};
use shared_types::{AccountState, CurrencyId, UserId};
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  Economy Core Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let economy = bootstrap().context("Failed to start economy")?;
    smoke_scenario(&economy)
        .instrument(subsystem_span!("smoke_scenario", accounts = 2))
        .await?;

    info!(entries = economy.ledger_store.len(), "Smoke scenario complete");
    Ok(())
}

/// Grant, transfer, rollback, rejected second rollback.
async fn smoke_scenario(economy: &EconomyContainer) -> Result<()> {
    let coins: CurrencyId = economy.config.economy.primary_currency.clone();
    let admin = UserId::from("admin");
    let alice = UserId::from("alice");
    let bob = UserId::from("bob");

    economy
        .account_store
        .seed(AccountState::new(bob.clone()).with_balance(coins.clone(), 50))
        .context("Failed to seed account")?;

    let grant = economy
        .currency
        .adjust(&admin, &alice, None, &coins, 100, "welcome bonus")
        .await?;
    log_mutation_event!(
        info,
        "runtime",
        "Granted starting balance",
        alice,
        "CURRENCY_ADJUST",
        correlation_id = %grant.correlation_id
    );

    let transfer = economy
        .transfers
        .transfer(&alice, &bob, None, &coins, 30)
        .await?;
    info!(
        correlation_id = %transfer.correlation_id,
        alice = ?transfer.balance_after(&alice, &coins),
        bob = ?transfer.balance_after(&bob, &coins),
        "Transfer committed"
    );

    let report = economy
        .rollbacks
        .rollback(&admin, None, &transfer.correlation_id)
        .await?;
    info!(
        reversed = report.reversed_entries,
        rollback_entry = %report.rollback_entry_id,
        "Transfer rolled back"
    );

    match economy
        .rollbacks
        .rollback(&admin, None, &transfer.correlation_id)
        .await
    {
        Ok(_) => anyhow::bail!("second rollback unexpectedly succeeded"),
        Err(e) => log_event!(info, "runtime", "Second rollback rejected", reason = %e.user_message()),
    }
    Ok(())
}
