//! In-Memory Ledger Store
//!
//! Flat rows keyed by entry id plus the secondary indexes a persistent
//! backend would keep: `metadata.correlationId`,
//! `metadata.originalCorrelationId` and `(guildId, operationType)`.

use crate::domain::{AuditEntry, LedgerFilter, LedgerPage, OperationType, Page};
use crate::ports::LedgerStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{CorrelationId, GuildId, StorageError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, trace};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    rows: HashMap<Uuid, AuditEntry>,
    by_correlation: HashMap<CorrelationId, Vec<Uuid>>,
    by_original: HashMap<CorrelationId, Vec<Uuid>>,
    by_guild_op: HashMap<(GuildId, OperationType), Vec<Uuid>>,
}

impl Tables {
    /// Narrowest candidate set an index can give for `filter`.
    fn candidates(&self, filter: &LedgerFilter) -> Vec<&AuditEntry> {
        let ids = if let Some(correlation) = &filter.correlation_id {
            Some(self.by_correlation.get(correlation))
        } else if let Some(original) = &filter.original_correlation_id {
            Some(self.by_original.get(original))
        } else if let (Some(guild), Some(op)) = (&filter.guild_id, filter.operation_type) {
            Some(self.by_guild_op.get(&(guild.clone(), op)))
        } else {
            None
        };

        match ids {
            Some(Some(ids)) => ids.iter().filter_map(|id| self.rows.get(id)).collect(),
            Some(None) => Vec::new(),
            None => self.rows.values().collect(),
        }
    }
}

/// In-memory append-only ledger store.
pub struct InMemoryLedgerStore {
    tables: RwLock<Tables>,
    sequence: AtomicU64,
    fail_inserts: AtomicBool,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            sequence: AtomicU64::new(0),
            fail_inserts: AtomicBool::new(false),
        }
    }

    /// Make every subsequent insert fail with `StorageError::Unavailable`.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Total number of stored entries.
    pub fn len(&self) -> usize {
        self.tables.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().rows.is_empty()
    }

    /// Every stored entry, chronological.
    pub fn all(&self) -> Vec<AuditEntry> {
        let tables = self.tables.read();
        let mut entries: Vec<AuditEntry> = tables.rows.values().cloned().collect();
        entries.sort_by_key(|e| (e.created_at, e.sequence));
        entries
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn insert(&self, entry: AuditEntry) -> Result<AuditEntry, StorageError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("ledger insert rejected".into()));
        }

        let mut tables = self.tables.write();
        if tables.rows.contains_key(&entry.id) {
            return Err(StorageError::Corrupted {
                key: entry.id.to_string(),
            });
        }

        if let Some(correlation) = entry.correlation_id() {
            tables
                .by_correlation
                .entry(correlation)
                .or_default()
                .push(entry.id);
        }
        if let Some(original) = entry.original_correlation_id() {
            tables.by_original.entry(original).or_default().push(entry.id);
        }
        if let Some(guild) = &entry.guild_id {
            tables
                .by_guild_op
                .entry((guild.clone(), entry.operation_type))
                .or_default()
                .push(entry.id);
        }
        tables.rows.insert(entry.id, entry.clone());

        trace!(id = %entry.id, sequence = entry.sequence, "[ec-02] Entry inserted");
        Ok(entry)
    }

    async fn query(&self, filter: &LedgerFilter, page: Page) -> Result<LedgerPage, StorageError> {
        let page = Page::new(page.page, page.page_size);
        let tables = self.tables.read();

        let mut matching: Vec<&AuditEntry> = tables
            .candidates(filter)
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect();
        matching.sort_by_key(|e| (e.created_at, e.sequence));

        let total_count = matching.len();
        let entries = matching
            .into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .cloned()
            .collect::<Vec<_>>();

        debug!(
            total = total_count,
            returned = entries.len(),
            page = page.page,
            "[ec-02] Ledger query"
        );

        Ok(LedgerPage {
            entries,
            total_count,
            page: page.page,
            page_size: page.page_size,
        })
    }
}
