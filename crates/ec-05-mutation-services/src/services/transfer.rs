//! # Transfers
//!
//! Two documents, two compare-and-swaps: debit the sender, then credit the
//! recipient. There is no cross-document transaction. When the credit
//! fails after the debit committed, the debit is undone with a forced
//! re-credit and nothing is written to the ledger.

use crate::context::{EntryTemplate, ServiceContext};
use crate::domain::{Receipt, ServiceError};
use ec_02_audit_ledger::{NewAuditEntry, OperationType};
use ec_03_transition_engine::{AdjustCurrency, AttemptConfig, MutationOutcome};
use serde_json::json;
use shared_types::{CorrelationId, CurrencyId, DomainError, GuildId, UserId};
use std::sync::Arc;
use tracing::{error, warn};

/// Metadata key tying both legs of a transfer together.
pub const META_TRANSFER_ID: &str = "transferId";

pub struct TransferService {
    ctx: Arc<ServiceContext>,
}

impl TransferService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Move `amount` of `currency` from `from` to `to`.
    pub async fn transfer(
        &self,
        from: &UserId,
        to: &UserId,
        guild: Option<GuildId>,
        currency: &CurrencyId,
        amount: i64,
    ) -> Result<Receipt, ServiceError> {
        self.ctx.gate(from, OperationType::Transfer.as_str())?;
        if from == to {
            return Err(DomainError::SelfTransfer.into());
        }
        if amount <= 0 {
            return Err(DomainError::InvalidAmount(amount).into());
        }
        self.ctx.settings.check_currency(currency)?;

        let correlation_id = CorrelationId::generate();
        let attempts = self.ctx.attempts();

        let debit = AdjustCurrency::named("TRANSFER", currency.clone(), -amount);
        let sent = self.ctx.engine.attempt(from, &debit, attempts).await?;

        let credit = AdjustCurrency::named("TRANSFER", currency.clone(), amount);
        let received = match self.ctx.engine.attempt(to, &credit, attempts).await {
            Ok(outcome) => outcome,
            Err(e) => {
                return Err(self
                    .compensate(&correlation_id, from, to, guild, currency, amount, sent, e.into())
                    .await);
            }
        };

        let template = EntryTemplate::new(OperationType::Transfer, from, guild, &correlation_id);
        let entries = [&sent, &received]
            .into_iter()
            .flat_map(|outcome| template.entries_for(outcome))
            .map(|entry| tag(entry, &correlation_id, from, to))
            .collect();

        self.ctx
            .record(
                OperationType::Transfer,
                correlation_id,
                vec![sent, received],
                entries,
            )
            .await
    }

    /// Undo a committed debit after the credit leg failed. Returns the error
    /// the caller should see.
    #[allow(clippy::too_many_arguments)]
    async fn compensate(
        &self,
        correlation_id: &CorrelationId,
        from: &UserId,
        to: &UserId,
        guild: Option<GuildId>,
        currency: &CurrencyId,
        amount: i64,
        sent: MutationOutcome,
        cause: ServiceError,
    ) -> ServiceError {
        warn!(
            correlation_id = %correlation_id,
            from = %from,
            to = %to,
            amount,
            error = %cause,
            "[ec-05] Transfer credit failed, re-crediting sender"
        );

        let refund = AdjustCurrency::named("TRANSFER_COMPENSATION", currency.clone(), amount);
        let forced = AttemptConfig {
            force: true,
            ..self.ctx.attempts()
        };
        match self.ctx.engine.attempt(from, &refund, forced).await {
            Ok(_) => cause,
            Err(refund_err) => {
                error!(
                    correlation_id = %correlation_id,
                    from = %from,
                    amount,
                    error = %refund_err,
                    "[ec-05] Transfer compensation failed, debit stands"
                );
                // Leave the orphaned debit in the ledger so it can be rolled back.
                let entries = EntryTemplate::new(OperationType::Transfer, from, guild, correlation_id)
                    .reason("transfer compensation failed")
                    .entries_for(&sent)
                    .into_iter()
                    .map(|entry| tag(entry, correlation_id, from, to))
                    .collect();
                let mut reason = format!("{cause}; re-credit failed: {refund_err}");
                if let Err(audit_err) = self
                    .ctx
                    .record(OperationType::Transfer, correlation_id.clone(), vec![sent], entries)
                    .await
                {
                    reason = format!("{reason}; orphaned debit not recorded: {audit_err}");
                }
                ServiceError::CompensationFailed {
                    correlation_id: correlation_id.clone(),
                    reason,
                }
            }
        }
    }
}

fn tag(entry: NewAuditEntry, correlation_id: &CorrelationId, from: &UserId, to: &UserId) -> NewAuditEntry {
    entry
        .meta(META_TRANSFER_ID, json!(correlation_id.as_str()))
        .meta("fromUserId", json!(from.as_str()))
        .meta("toUserId", json!(to.as_str()))
}
