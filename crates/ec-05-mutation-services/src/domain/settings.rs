//! Service-wide settings.

use ec_03_transition_engine::AttemptConfig;
use shared_types::{CurrencyId, DomainError};
use std::collections::BTreeSet;

/// Settings shared by every mutation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Currencies the services accept. Empty accepts any id.
    pub known_currencies: BTreeSet<CurrencyId>,
    /// Currency used for prices, craft costs and perk costs.
    pub primary_currency: CurrencyId,
    pub attempts: AttemptConfig,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            known_currencies: BTreeSet::from([CurrencyId::from("coins")]),
            primary_currency: CurrencyId::from("coins"),
            attempts: AttemptConfig::default(),
        }
    }
}

impl ServiceSettings {
    pub fn with_currency(mut self, currency: impl Into<CurrencyId>) -> Self {
        self.known_currencies.insert(currency.into());
        self
    }

    pub fn with_attempts(mut self, attempts: AttemptConfig) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn check_currency(&self, currency: &CurrencyId) -> Result<(), DomainError> {
        if self.known_currencies.is_empty() || self.known_currencies.contains(currency) {
            Ok(())
        } else {
            Err(DomainError::UnknownCurrency(currency.clone()))
        }
    }
}

/// Periodic payout kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    Daily,
    Work,
}

impl ClaimKind {
    /// Cooldown key stamped on the account document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Work => "work",
        }
    }
}

/// Payouts and cooldown periods for claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimConfig {
    pub currency: CurrencyId,
    pub daily_payout: i64,
    pub work_payout: i64,
    pub daily_cooldown_secs: i64,
    pub work_cooldown_secs: i64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyId::from("coins"),
            daily_payout: 100,
            work_payout: 25,
            daily_cooldown_secs: 86_400,
            work_cooldown_secs: 3_600,
        }
    }
}

impl ClaimConfig {
    pub fn payout(&self, kind: ClaimKind) -> i64 {
        match kind {
            ClaimKind::Daily => self.daily_payout,
            ClaimKind::Work => self.work_payout,
        }
    }

    pub fn cooldown_secs(&self, kind: ClaimKind) -> i64 {
        match kind {
            ClaimKind::Daily => self.daily_cooldown_secs,
            ClaimKind::Work => self.work_cooldown_secs,
        }
    }
}
