//! # Service Context
//!
//! Everything a mutation service needs, built once and shared by `Arc`:
//! the engine, the ledger, the rate limiter and the clock.

use crate::domain::{Receipt, ServiceError, ServiceSettings};
use ec_01_account_store::AccountStore;
use ec_02_audit_ledger::{AuditLedgerApi, CurrencyData, ItemData, NewAuditEntry, OperationType};
use ec_03_transition_engine::{AttemptConfig, MutationOutcome, TransitionEngine};
use shared_types::{
    ActionRateLimiter, CorrelationId, GuildId, RateDecision, SystemTimeSource, TimeSource,
    UnlimitedRateLimiter, UserId,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared dependencies of the mutation services.
pub struct ServiceContext {
    pub engine: TransitionEngine<dyn AccountStore>,
    pub ledger: Arc<dyn AuditLedgerApi>,
    pub limiter: Arc<dyn ActionRateLimiter>,
    pub clock: Arc<dyn TimeSource>,
    pub settings: ServiceSettings,
}

impl ServiceContext {
    /// Context with no rate limit, the system clock and default settings.
    pub fn new(store: Arc<dyn AccountStore>, ledger: Arc<dyn AuditLedgerApi>) -> Self {
        Self {
            engine: TransitionEngine::new(store),
            ledger,
            limiter: Arc::new(UnlimitedRateLimiter),
            clock: Arc::new(SystemTimeSource),
            settings: ServiceSettings::default(),
        }
    }

    pub fn with_limiter(mut self, limiter: Arc<dyn ActionRateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn attempts(&self) -> AttemptConfig {
        self.settings.attempts
    }

    /// Rate-limit gate run before any store access.
    pub fn gate(&self, actor: &UserId, action: &str) -> Result<(), ServiceError> {
        Self::gate_with(&*self.limiter, actor, action)
    }

    pub fn gate_with(
        limiter: &dyn ActionRateLimiter,
        actor: &UserId,
        action: &str,
    ) -> Result<(), ServiceError> {
        match limiter.check(actor.as_str(), action) {
            RateDecision::Allowed { .. } => Ok(()),
            RateDecision::Limited { retry_after } => {
                warn!(
                    actor = %actor,
                    action,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "[ec-05] Rate limited"
                );
                Err(ServiceError::RateLimited { retry_after })
            }
        }
    }

    /// Write the entries of a committed operation.
    ///
    /// The mutation already stands; a ledger failure is logged with every
    /// entry field and returned as `AuditWriteFailed` carrying the outcomes.
    pub async fn record(
        &self,
        operation: OperationType,
        correlation_id: CorrelationId,
        outcomes: Vec<MutationOutcome>,
        entries: Vec<NewAuditEntry>,
    ) -> Result<Receipt, ServiceError> {
        let mut written = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.ledger.create(entry.clone()).await {
                Ok(stored) => written.push(stored),
                Err(source) => {
                    error!(
                        operation = %operation,
                        correlation_id = %correlation_id,
                        actor = %entry.actor_id,
                        target = %entry.target_id,
                        guild = ?entry.guild_id,
                        currency = ?entry.currency_data,
                        item = ?entry.item_data,
                        metadata = ?entry.metadata,
                        written = written.len(),
                        error = %source,
                        "[ec-05] Audit write failed after commit"
                    );
                    return Err(ServiceError::AuditWriteFailed {
                        correlation_id,
                        outcomes,
                        source,
                    });
                }
            }
        }

        info!(
            operation = %operation,
            correlation_id = %correlation_id,
            accounts = outcomes.len(),
            entries = written.len(),
            "[ec-05] Mutation committed"
        );
        Ok(Receipt {
            correlation_id,
            outcomes,
            entries: written,
        })
    }
}

/// Common fields of every entry one operation writes.
#[derive(Debug, Clone)]
pub struct EntryTemplate {
    pub operation: OperationType,
    pub actor: UserId,
    pub guild: Option<GuildId>,
    pub correlation_id: CorrelationId,
    pub reason: String,
}

impl EntryTemplate {
    pub fn new(
        operation: OperationType,
        actor: &UserId,
        guild: Option<GuildId>,
        correlation_id: &CorrelationId,
    ) -> Self {
        Self {
            operation,
            actor: actor.clone(),
            guild,
            correlation_id: correlation_id.clone(),
            reason: String::new(),
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// A bare entry against `target`.
    pub fn entry(&self, target: &UserId) -> NewAuditEntry {
        NewAuditEntry::new(self.operation, self.actor.clone(), target.clone())
            .guild(self.guild.clone())
            .correlation(&self.correlation_id)
            .reason(self.reason.clone())
    }

    /// One entry per currency and item the outcome changed. No-op legs
    /// (a forced removal from an empty slot) are left out.
    pub fn entries_for(&self, outcome: &MutationOutcome) -> Vec<NewAuditEntry> {
        let currencies = outcome
            .currencies
            .iter()
            .filter(|c| c.delta() != 0)
            .map(|c| {
                self.entry(&outcome.user_id).currency(CurrencyData::between(
                    c.currency.clone(),
                    c.before,
                    c.after,
                ))
            });
        let items = outcome.items.iter().filter(|i| i.delta() != 0).map(|i| {
            self.entry(&outcome.user_id)
                .item(ItemData::between(i.item.clone(), i.before, i.after))
        });
        currencies.chain(items).collect()
    }
}
