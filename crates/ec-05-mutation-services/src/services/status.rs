//! Moderation status changes.

use crate::context::{EntryTemplate, ServiceContext};
use crate::domain::{Receipt, ServiceError};
use ec_02_audit_ledger::OperationType;
use ec_03_transition_engine::SetStatus;
use serde_json::json;
use shared_types::{AccountStatus, CorrelationId, GuildId, UserId};
use std::sync::Arc;

pub struct StatusService {
    ctx: Arc<ServiceContext>,
}

impl StatusService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Set `target`'s status. Works on blocked and banned accounts too.
    pub async fn set_status(
        &self,
        actor: &UserId,
        target: &UserId,
        guild: Option<GuildId>,
        status: AccountStatus,
        reason: &str,
    ) -> Result<Receipt, ServiceError> {
        self.ctx.gate(actor, OperationType::StatusUpdate.as_str())?;

        let outcome = self
            .ctx
            .engine
            .attempt(target, &SetStatus::new(status), self.ctx.attempts())
            .await?;

        let correlation_id = CorrelationId::generate();
        let mut entry = EntryTemplate::new(OperationType::StatusUpdate, actor, guild, &correlation_id)
            .reason(reason)
            .entry(target)
            .meta("newStatus", json!(status.as_str()));
        if let Some(change) = outcome.status {
            entry = entry.meta("previousStatus", json!(change.before.as_str()));
        }
        self.ctx
            .record(OperationType::StatusUpdate, correlation_id, vec![outcome], vec![entry])
            .await
    }
}
