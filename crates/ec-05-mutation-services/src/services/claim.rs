//! Daily and work payouts. The cooldown is checked and stamped in the same
//! compare-and-swap as the payout, so two racing claims pay once.

use crate::context::{EntryTemplate, ServiceContext};
use crate::domain::{ClaimConfig, ClaimKind, Receipt, ServiceError};
use ec_02_audit_ledger::OperationType;
use ec_03_transition_engine::{Batch, CooldownStamp};
use serde_json::json;
use shared_types::{CorrelationId, GuildId, UserId};
use std::sync::Arc;

pub struct ClaimService {
    ctx: Arc<ServiceContext>,
    config: ClaimConfig,
}

impl ClaimService {
    pub fn new(ctx: Arc<ServiceContext>, config: ClaimConfig) -> Self {
        Self { ctx, config }
    }

    pub fn config(&self) -> &ClaimConfig {
        &self.config
    }

    pub async fn claim(
        &self,
        actor: &UserId,
        guild: Option<GuildId>,
        kind: ClaimKind,
    ) -> Result<Receipt, ServiceError> {
        let operation = match kind {
            ClaimKind::Daily => OperationType::DailyClaim,
            ClaimKind::Work => OperationType::WorkClaim,
        };
        self.ctx.gate(actor, operation.as_str())?;

        let now_secs = self.ctx.clock.unix_secs();
        let batch = Batch::new(operation.as_str().to_uppercase())
            .currency(self.config.currency.clone(), self.config.payout(kind))
            .cooldown(CooldownStamp {
                kind: kind.as_str().to_string(),
                period_secs: self.config.cooldown_secs(kind),
                now_secs,
            });
        let outcome = self
            .ctx
            .engine
            .attempt(actor, &batch, self.ctx.attempts())
            .await?;

        let correlation_id = CorrelationId::generate();
        let entries = EntryTemplate::new(operation, actor, guild, &correlation_id)
            .entries_for(&outcome)
            .into_iter()
            .map(|entry| entry.meta("claimedAt", json!(now_secs)))
            .collect();
        self.ctx
            .record(operation, correlation_id, vec![outcome], entries)
            .await
    }
}
