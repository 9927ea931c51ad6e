//! Admin currency grants and deductions.

use crate::context::{EntryTemplate, ServiceContext};
use crate::domain::{Receipt, ServiceError};
use ec_02_audit_ledger::OperationType;
use ec_03_transition_engine::AdjustCurrency;
use shared_types::{CorrelationId, CurrencyId, GuildId, UserId};
use std::sync::Arc;

pub struct CurrencyService {
    ctx: Arc<ServiceContext>,
}

impl CurrencyService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Add `delta` (negative to deduct) to `target`'s balance.
    pub async fn adjust(
        &self,
        actor: &UserId,
        target: &UserId,
        guild: Option<GuildId>,
        currency: &CurrencyId,
        delta: i64,
        reason: &str,
    ) -> Result<Receipt, ServiceError> {
        self.ctx.gate(actor, OperationType::Grant.as_str())?;
        self.ctx.settings.check_currency(currency)?;

        let transition = AdjustCurrency::named("CURRENCY_ADJUST", currency.clone(), delta);
        let outcome = self
            .ctx
            .engine
            .attempt(target, &transition, self.ctx.attempts())
            .await?;

        let correlation_id = CorrelationId::generate();
        let entries = EntryTemplate::new(OperationType::Grant, actor, guild, &correlation_id)
            .reason(reason)
            .entries_for(&outcome);
        self.ctx
            .record(OperationType::Grant, correlation_id, vec![outcome], entries)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixture::Fixture;
    use ec_01_account_store::AccountStore;
    use shared_types::{AccountState, AccountStatus, DomainError};

    #[tokio::test]
    async fn test_grant_writes_one_entry() {
        let fx = Fixture::new();
        fx.seed(AccountState::new("u1".into()).with_balance("coins", 100));
        let service = CurrencyService::new(fx.ctx.clone());

        let receipt = service
            .adjust(&"admin".into(), &"u1".into(), None, &"coins".into(), 50, "event prize")
            .await
            .unwrap();

        assert_eq!(receipt.balance_after(&"u1".into(), &"coins".into()), Some(150));
        assert_eq!(receipt.entries.len(), 1);
        let entry = &receipt.entries[0];
        assert_eq!(entry.operation_type, OperationType::Grant);
        assert_eq!(entry.reason, "event prize");
        assert_eq!(entry.correlation_id(), Some(receipt.correlation_id.clone()));
        assert_eq!(fx.ledger_store.len(), 1);
    }

    #[tokio::test]
    async fn test_overdraw_rejected_without_entry() {
        let fx = Fixture::new();
        fx.seed(AccountState::new("u1".into()).with_balance("coins", 10));
        let service = CurrencyService::new(fx.ctx.clone());

        let err = service
            .adjust(&"admin".into(), &"u1".into(), None, &"coins".into(), -100, "")
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InsufficientFunds { required: 100, available: 10, .. })
        ));
        assert_eq!(fx.store.read(&"u1".into()).await.unwrap().balance_of(&"coins".into()), 10);
        assert!(fx.ledger_store.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_currency_and_banned_target() {
        let fx = Fixture::new();
        fx.seed(AccountState::new("u2".into()).with_status(AccountStatus::Banned));
        let service = CurrencyService::new(fx.ctx.clone());

        let err = service
            .adjust(&"admin".into(), &"u1".into(), None, &"gems".into(), 5, "")
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::UnknownCurrency("gems".into())));

        let err = service
            .adjust(&"admin".into(), &"u2".into(), None, &"coins".into(), 5, "")
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::AccountRestricted { .. })));
    }
}
