//! # Economy Configuration
//!
//! Unified configuration for the engine, rate limiting and claims.
//! Every value has a default; `from_env` overrides individual values.

use ec_03_transition_engine::{AttemptConfig, Backoff, DEFAULT_MAX_ATTEMPTS};
use ec_05_mutation_services::{ClaimConfig, ServiceSettings};
use shared_types::CurrencyId;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Complete economy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EconomyConfig {
    pub engine: EngineConfig,
    pub rate_limit: RateLimitConfig,
    pub economy: CurrencyConfig,
    pub claims: ClaimsConfig,
    /// Directory holding `items.json`, `recipes.json`, `perks.json` and
    /// `store.json`. Built-in content is used when unset.
    pub content_dir: Option<PathBuf>,
}

/// Transition engine retry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_attempts: u32,
    /// Base of the jittered backoff between attempts; 0 retries immediately.
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: 0,
            backoff_max_ms: 50,
        }
    }
}

/// Per-actor sliding window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Hits allowed per window; 0 disables rate limiting.
    pub max_hits: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_hits: 10,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyConfig {
    pub primary_currency: CurrencyId,
    pub extra_currencies: Vec<CurrencyId>,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            primary_currency: CurrencyId::from("coins"),
            extra_currencies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsConfig {
    pub daily_payout: i64,
    pub work_payout: i64,
    pub daily_cooldown_secs: i64,
    pub work_cooldown_secs: i64,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        let defaults = ClaimConfig::default();
        Self {
            daily_payout: defaults.daily_payout,
            work_payout: defaults.work_payout,
            daily_cooldown_secs: defaults.daily_cooldown_secs,
            work_cooldown_secs: defaults.work_cooldown_secs,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Environment variable {key} has invalid value '{value}'")]
    InvalidVar { key: &'static str, value: String },

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("Rate limit window must be at least 1 second")]
    ZeroWindow,

    #[error("Claim payouts must be positive (daily {daily}, work {work})")]
    NonPositivePayout { daily: i64, work: i64 },

    #[error("Claim cooldowns must not be negative")]
    NegativeCooldown,

    #[error("Invalid currency id '{0}'")]
    InvalidCurrency(String),

    #[error("Content pack error in {file}: {reason}")]
    Content { file: String, reason: String },
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { key, value }),
    }
}

impl EconomyConfig {
    /// Defaults overridden by `EC_*` environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EC_MAX_ATTEMPTS`: Engine attempts per operation (default: 4)
    /// - `EC_BACKOFF_BASE_MS` / `EC_BACKOFF_MAX_MS`: Retry backoff (default: 0 / 50)
    /// - `EC_RATE_LIMIT_MAX`: Hits per window, 0 disables (default: 10)
    /// - `EC_RATE_LIMIT_WINDOW_SECS`: Window length (default: 60)
    /// - `EC_PRIMARY_CURRENCY`: Price currency (default: coins)
    /// - `EC_EXTRA_CURRENCIES`: Comma-separated additional currencies
    /// - `EC_DAILY_PAYOUT` / `EC_WORK_PAYOUT`: Claim payouts (default: 100 / 25)
    /// - `EC_CONTENT_DIR`: Content pack directory
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "EC_MAX_ATTEMPTS")? {
            config.engine.max_attempts = v;
        }
        if let Some(v) = parse_var(&lookup, "EC_BACKOFF_BASE_MS")? {
            config.engine.backoff_base_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "EC_BACKOFF_MAX_MS")? {
            config.engine.backoff_max_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "EC_RATE_LIMIT_MAX")? {
            config.rate_limit.max_hits = v;
        }
        if let Some(v) = parse_var(&lookup, "EC_RATE_LIMIT_WINDOW_SECS")? {
            config.rate_limit.window_secs = v;
        }
        if let Some(v) = lookup("EC_PRIMARY_CURRENCY") {
            config.economy.primary_currency = CurrencyId::new(v.trim());
        }
        if let Some(v) = lookup("EC_EXTRA_CURRENCIES") {
            config.economy.extra_currencies = v
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(CurrencyId::from)
                .collect();
        }
        if let Some(v) = parse_var(&lookup, "EC_DAILY_PAYOUT")? {
            config.claims.daily_payout = v;
        }
        if let Some(v) = parse_var(&lookup, "EC_WORK_PAYOUT")? {
            config.claims.work_payout = v;
        }
        if let Some(v) = lookup("EC_CONTENT_DIR") {
            config.content_dir = Some(PathBuf::from(v));
        }

        Ok(config)
    }

    /// Reject values the services cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.rate_limit.max_hits > 0 && self.rate_limit.window_secs == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.claims.daily_payout <= 0 || self.claims.work_payout <= 0 {
            return Err(ConfigError::NonPositivePayout {
                daily: self.claims.daily_payout,
                work: self.claims.work_payout,
            });
        }
        if self.claims.daily_cooldown_secs < 0 || self.claims.work_cooldown_secs < 0 {
            return Err(ConfigError::NegativeCooldown);
        }
        let currencies =
            std::iter::once(&self.economy.primary_currency).chain(&self.economy.extra_currencies);
        for currency in currencies {
            if !shared_types::is_valid_content_id(currency.as_str()) {
                return Err(ConfigError::InvalidCurrency(currency.to_string()));
            }
        }
        Ok(())
    }

    pub fn attempt_config(&self) -> AttemptConfig {
        let config = AttemptConfig::default().with_max_attempts(self.engine.max_attempts);
        if self.engine.backoff_base_ms == 0 {
            return config;
        }
        config.with_backoff(Backoff::new(
            Duration::from_millis(self.engine.backoff_base_ms),
            Duration::from_millis(self.engine.backoff_max_ms.max(self.engine.backoff_base_ms)),
        ))
    }

    pub fn service_settings(&self) -> ServiceSettings {
        let mut settings = ServiceSettings {
            known_currencies: Default::default(),
            primary_currency: self.economy.primary_currency.clone(),
            attempts: self.attempt_config(),
        };
        settings
            .known_currencies
            .insert(self.economy.primary_currency.clone());
        settings
            .known_currencies
            .extend(self.economy.extra_currencies.iter().cloned());
        settings
    }

    pub fn claim_config(&self) -> ClaimConfig {
        ClaimConfig {
            currency: self.economy.primary_currency.clone(),
            daily_payout: self.claims.daily_payout,
            work_payout: self.claims.work_payout,
            daily_cooldown_secs: self.claims.daily_cooldown_secs,
            work_cooldown_secs: self.claims.work_cooldown_secs,
        }
    }
}
