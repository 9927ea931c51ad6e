//! Fault-Injecting Account Store
//!
//! Wraps another `AccountStore` and injects storage failures, permanent
//! conflicts or real competing writes. Used to exercise the engine's retry
//! and error paths and the services' compensation paths.

use crate::domain::{Expectation, NextState};
use crate::ports::AccountStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{AccountState, StorageError, UserId};
use tracing::debug;

/// Which faults to inject.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    /// Reads of this user fail with `StorageError::Unavailable`.
    pub fail_reads_for: Option<UserId>,
    /// Writes to this user fail with `StorageError::Timeout`.
    pub fail_cas_for: Option<UserId>,
    /// After this many successful commits, every write fails.
    pub fail_cas_after: Option<u64>,
    /// Every write reports a conflict without touching the document.
    pub always_conflict: bool,
    /// Number of competing writes to land just before the next writes.
    pub interfering_writes: u32,
    /// Patch applied by each competing write (an empty patch still bumps
    /// the version).
    pub interference: NextState,
}

/// `AccountStore` wrapper driven by a mutable `FaultPlan`.
pub struct FaultyAccountStore<S> {
    inner: S,
    plan: Mutex<FaultPlan>,
    commits: Mutex<u64>,
}

impl<S: AccountStore> FaultyAccountStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_plan(inner, FaultPlan::default())
    }

    pub fn with_plan(inner: S, plan: FaultPlan) -> Self {
        Self {
            inner,
            plan: Mutex::new(plan),
            commits: Mutex::new(0),
        }
    }

    /// Replace the fault plan.
    pub fn set_plan(&self, plan: FaultPlan) {
        *self.plan.lock() = plan;
    }

    /// Remove every fault.
    pub fn heal(&self) {
        self.set_plan(FaultPlan::default());
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Take one competing write from the budget, if any is left.
    fn take_interference(&self) -> Option<NextState> {
        let mut plan = self.plan.lock();
        if plan.interfering_writes == 0 {
            return None;
        }
        plan.interfering_writes -= 1;
        Some(plan.interference.clone())
    }
}

#[async_trait]
impl<S: AccountStore> AccountStore for FaultyAccountStore<S> {
    async fn read(&self, user_id: &UserId) -> Result<AccountState, StorageError> {
        let fail = self.plan.lock().fail_reads_for.as_ref() == Some(user_id);
        if fail {
            return Err(StorageError::Unavailable(format!("read of {user_id} refused")));
        }
        self.inner.read(user_id).await
    }

    async fn compare_and_swap(
        &self,
        user_id: &UserId,
        expected: &Expectation,
        next: &NextState,
    ) -> Result<Option<AccountState>, StorageError> {
        let (fail_user, exhausted, always_conflict) = {
            let plan = self.plan.lock();
            let commits = *self.commits.lock();
            (
                plan.fail_cas_for.as_ref() == Some(user_id),
                plan.fail_cas_after.is_some_and(|limit| commits >= limit),
                plan.always_conflict,
            )
        };

        if fail_user || exhausted {
            return Err(StorageError::Timeout(5_000));
        }
        if always_conflict {
            return Ok(None);
        }

        if let Some(patch) = self.take_interference() {
            let current = self.inner.read(user_id).await?;
            let competing = self
                .inner
                .compare_and_swap(user_id, &Expectation::Version(current.version), &patch)
                .await?;
            debug!(user_id = %user_id, landed = competing.is_some(), "[ec-01] Injected competing write");
        }

        let result = self.inner.compare_and_swap(user_id, expected, next).await?;
        if result.is_some() {
            *self.commits.lock() += 1;
        }
        Ok(result)
    }

    async fn remove(&self, user_id: &UserId) -> Result<bool, StorageError> {
        self.inner.remove(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryAccountStore;
    use shared_types::CurrencyValue;

    fn credit(amount: i64) -> NextState {
        NextState::new().with_balance("coins".into(), CurrencyValue::Scalar { amount })
    }

    #[tokio::test]
    async fn test_interference_causes_real_conflict() {
        let store = FaultyAccountStore::with_plan(
            InMemoryAccountStore::new(),
            FaultPlan {
                interfering_writes: 1,
                ..Default::default()
            },
        );
        let user = UserId::from("u1");
        let before = store.read(&user).await.unwrap();
        let expected = Expectation::Version(before.version);

        assert!(store.compare_and_swap(&user, &expected, &credit(5)).await.unwrap().is_none());

        let fresh = store.read(&user).await.unwrap();
        let result = store
            .compare_and_swap(&user, &Expectation::Version(fresh.version), &credit(5))
            .await
            .unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_failures_are_storage_errors() {
        let store = FaultyAccountStore::with_plan(
            InMemoryAccountStore::new(),
            FaultPlan {
                fail_reads_for: Some("u1".into()),
                fail_cas_for: Some("u2".into()),
                ..Default::default()
            },
        );

        assert!(matches!(
            store.read(&"u1".into()).await,
            Err(StorageError::Unavailable(_))
        ));

        let u2 = UserId::from("u2");
        let before = store.read(&u2).await.unwrap();
        let result = store
            .compare_and_swap(&u2, &Expectation::Version(before.version), &credit(1))
            .await;
        assert!(matches!(result, Err(StorageError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_fail_after_commit_budget() {
        let store = FaultyAccountStore::with_plan(
            InMemoryAccountStore::new(),
            FaultPlan {
                fail_cas_after: Some(1),
                ..Default::default()
            },
        );
        let user = UserId::from("u1");

        let s = store.read(&user).await.unwrap();
        assert!(store
            .compare_and_swap(&user, &Expectation::Version(s.version), &credit(1))
            .await
            .unwrap()
            .is_some());

        let s = store.read(&user).await.unwrap();
        assert!(store
            .compare_and_swap(&user, &Expectation::Version(s.version), &credit(2))
            .await
            .is_err());

        store.heal();
        assert!(store
            .compare_and_swap(&user, &Expectation::Version(s.version), &credit(2))
            .await
            .unwrap()
            .is_some());
    }
}
