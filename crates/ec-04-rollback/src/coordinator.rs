//! # Rollback Coordinator
//!
//! Reverses every mutation of a correlation group and records the reversal
//! as one new `rollback` entry.

use crate::domain::{
    CorrelationGroupState, ItemRules, RollbackError, RollbackPlan, RollbackReport, StackAll,
};
use ec_01_account_store::AccountStore;
use ec_02_audit_ledger::{
    AuditEntry, AuditLedgerApi, NewAuditEntry, OperationType, META_COMPLETE,
    META_ORIGINAL_CORRELATION_ID, META_REVERSED_ENTRIES,
};
use ec_03_transition_engine::{AttemptConfig, TransitionEngine};
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_types::{CorrelationId, GuildId, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Releases an in-flight claim when dropped.
struct ClaimGuard<'a> {
    in_flight: &'a Mutex<HashSet<CorrelationId>>,
    correlation_id: CorrelationId,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.correlation_id);
    }
}

/// Coordinates rollbacks over the engine and the ledger.
pub struct RollbackCoordinator<S: AccountStore + ?Sized, L: AuditLedgerApi + ?Sized> {
    engine: TransitionEngine<S>,
    ledger: Arc<L>,
    config: AttemptConfig,
    item_rules: Arc<dyn ItemRules>,
    in_flight: Mutex<HashSet<CorrelationId>>,
}

impl<S: AccountStore + ?Sized, L: AuditLedgerApi + ?Sized> RollbackCoordinator<S, L> {
    pub fn new(engine: TransitionEngine<S>, ledger: Arc<L>) -> Self {
        Self {
            engine,
            ledger,
            config: AttemptConfig::forced(),
            item_rules: Arc::new(StackAll),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Override attempt limits and backoff. Forced mode is always kept.
    pub fn with_config(mut self, config: AttemptConfig) -> Self {
        self.config = AttemptConfig {
            force: true,
            ..config
        };
        self
    }

    /// Slot shapes for restored items. Defaults to [`StackAll`].
    pub fn with_item_rules(mut self, item_rules: Arc<dyn ItemRules>) -> Self {
        self.item_rules = item_rules;
        self
    }

    fn claim(&self, correlation_id: &CorrelationId) -> Option<ClaimGuard<'_>> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(correlation_id.clone()) {
            return None;
        }
        Some(ClaimGuard {
            in_flight: &self.in_flight,
            correlation_id: correlation_id.clone(),
        })
    }

    /// Lifecycle of a correlation group.
    pub async fn group_state(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<CorrelationGroupState, RollbackError> {
        let rollbacks = self.ledger.find_rollbacks_of(correlation_id).await?;
        if rollbacks.iter().any(AuditEntry::is_complete_rollback) {
            return Ok(CorrelationGroupState::RolledBack);
        }

        let entries = self.ledger.find_by_correlation_key(correlation_id).await?;
        if entries.is_empty() {
            Ok(CorrelationGroupState::Unknown)
        } else {
            Ok(CorrelationGroupState::Open)
        }
    }

    /// Reverse every entry of `correlation_id`.
    pub async fn rollback(
        &self,
        correlation_id: &CorrelationId,
        guild_id: Option<GuildId>,
        actor_id: &UserId,
    ) -> Result<RollbackReport, RollbackError> {
        let entries = self.ledger.find_by_correlation_key(correlation_id).await?;
        if entries.is_empty() {
            return Err(RollbackError::NotFound(correlation_id.clone()));
        }

        let _claim = self
            .claim(correlation_id)
            .ok_or_else(|| RollbackError::InProgress(correlation_id.clone()))?;

        let prior = self.ledger.find_rollbacks_of(correlation_id).await?;
        if prior.iter().any(AuditEntry::is_complete_rollback) {
            return Err(RollbackError::AlreadyRolledBack(correlation_id.clone()));
        }
        let reversed_before: HashSet<Uuid> =
            prior.iter().flat_map(AuditEntry::reversed_entries).collect();

        let plan = RollbackPlan::build(&entries, &reversed_before, self.item_rules.as_ref());
        info!(
            correlation_id = %correlation_id,
            actor = %actor_id,
            pending = plan.pending(),
            already_reversed = plan.already_reversed,
            "[ec-04] Rolling back"
        );

        let mut reversed: Vec<Uuid> = Vec::new();
        for group in &plan.groups {
            if group.legs > 0 {
                if let Err(e) = self
                    .engine
                    .attempt(&group.target, &group.batch, self.config)
                    .await
                {
                    error!(
                        correlation_id = %correlation_id,
                        target = %group.target,
                        reversed = reversed.len(),
                        error = %e,
                        "[ec-04] Rollback replay failed"
                    );
                    if !reversed.is_empty() {
                        self.record(correlation_id, guild_id.clone(), actor_id, &reversed, false, &entries)
                            .await?;
                    }
                    return Err(RollbackError::Incomplete {
                        correlation_id: correlation_id.clone(),
                        reversed: reversed.len(),
                        reason: e.to_string(),
                    });
                }
            }
            reversed.extend(group.entry_ids.iter().copied());
        }

        let entry = self
            .record(correlation_id, guild_id, actor_id, &reversed, true, &entries)
            .await?;

        info!(
            correlation_id = %correlation_id,
            reversed = reversed.len(),
            rollback_entry = %entry.id,
            "[ec-04] Rollback complete"
        );

        Ok(RollbackReport {
            correlation_id: correlation_id.clone(),
            reversed_entries: reversed.len(),
            already_reversed: plan.already_reversed,
            rollback_entry_id: entry.id,
        })
    }

    async fn record(
        &self,
        correlation_id: &CorrelationId,
        guild_id: Option<GuildId>,
        actor_id: &UserId,
        reversed: &[Uuid],
        complete: bool,
        originals: &[AuditEntry],
    ) -> Result<AuditEntry, RollbackError> {
        let target = originals
            .first()
            .map(|e| e.target_id.clone())
            .unwrap_or_else(|| actor_id.clone());
        let ids: Vec<Value> = reversed.iter().map(|id| json!(id.to_string())).collect();

        let entry = NewAuditEntry::new(OperationType::Rollback, actor_id.clone(), target)
            .guild(guild_id)
            .meta(META_ORIGINAL_CORRELATION_ID, json!(correlation_id.to_string()))
            .meta(META_REVERSED_ENTRIES, Value::Array(ids))
            .meta(META_COMPLETE, json!(complete))
            .reason(format!("Rollback of {correlation_id}"));

        self.ledger.create(entry).await.map_err(|e| {
            // Inverses are committed but unrecorded; reconcile before retrying.
            error!(
                correlation_id = %correlation_id,
                reversed = ?reversed,
                complete,
                error = %e,
                "[ec-04] Rollback entry write failed"
            );
            RollbackError::Ledger(e)
        })
    }
}
