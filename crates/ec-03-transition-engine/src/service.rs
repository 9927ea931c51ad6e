//! # Transition Engine Service
//!
//! The retry loop. Holds no locks and no cached state between attempts.

use crate::domain::{AttemptConfig, EngineError, Snapshot};
use crate::ports::Transition;
use ec_01_account_store::AccountStore;
use shared_types::{DomainError, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Optimistic-concurrency executor over an `AccountStore`.
pub struct TransitionEngine<S: AccountStore + ?Sized> {
    store: Arc<S>,
}

impl<S: AccountStore + ?Sized> Clone for TransitionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AccountStore + ?Sized> TransitionEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run `transition` against `user_id` until it commits, is rejected, or
    /// runs out of attempts.
    pub async fn attempt<T: Transition>(
        &self,
        user_id: &UserId,
        transition: &T,
        config: AttemptConfig,
    ) -> Result<T::Output, EngineError> {
        let max_attempts = config.attempts();
        let operation = transition.operation();

        for attempt in 1..=max_attempts {
            let current = self.store.read(user_id).await?;

            if !config.force && transition.requires_active() && !current.is_active() {
                debug!(
                    user_id = %user_id,
                    operation,
                    status = %current.status,
                    "[ec-03] Rejected: account restricted"
                );
                return Err(DomainError::AccountRestricted {
                    user: user_id.clone(),
                    status: current.status,
                }
                .into());
            }

            let snapshot = Snapshot::new(current, transition.scope(), config.force);
            let next = match transition.compute_next(&snapshot) {
                Ok(next) => next,
                Err(e) => {
                    debug!(user_id = %user_id, operation, error = %e, "[ec-03] Rejected by domain rule");
                    return Err(e.into());
                }
            };

            let expected = snapshot.expectation_for(&next);
            debug!(
                user_id = %user_id,
                operation,
                attempt,
                version = %snapshot.version(),
                "[ec-03] Committing"
            );

            match self.store.compare_and_swap(user_id, &expected, &next).await? {
                Some(committed) => {
                    debug!(
                        user_id = %user_id,
                        operation,
                        attempt,
                        version = %committed.version,
                        "[ec-03] Committed"
                    );
                    return Ok(transition.project(&snapshot, &committed, &next));
                }
                None => {
                    debug!(user_id = %user_id, operation, attempt, "[ec-03] Conflict");
                    if attempt < max_attempts {
                        if let Some(backoff) = config.backoff {
                            tokio::time::sleep(backoff.delay(attempt)).await;
                        }
                    }
                }
            }
        }

        warn!(
            user_id = %user_id,
            operation,
            attempts = max_attempts,
            "[ec-03] Conflict retries exhausted"
        );
        Err(EngineError::Conflict {
            operation: operation.to_string(),
            attempts: max_attempts,
        })
    }
}
