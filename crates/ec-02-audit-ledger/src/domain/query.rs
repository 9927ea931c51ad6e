//! Ledger query filters and pagination.

use super::entities::{AuditEntry, OperationType};
use shared_types::{CorrelationId, GuildId, UserId};

/// Upper bound on `Page::page_size`.
pub const MAX_PAGE_SIZE: usize = 500;

/// Default page size when the caller does not care.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Conjunctive filter: every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    pub guild_id: Option<GuildId>,
    pub actor_id: Option<UserId>,
    pub target_id: Option<UserId>,
    pub operation_type: Option<OperationType>,
    pub correlation_id: Option<CorrelationId>,
    pub original_correlation_id: Option<CorrelationId>,
}

impl LedgerFilter {
    pub fn by_correlation(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            ..Self::default()
        }
    }

    pub fn rollbacks_of(correlation_id: CorrelationId) -> Self {
        Self {
            operation_type: Some(OperationType::Rollback),
            original_correlation_id: Some(correlation_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(guild) = &self.guild_id {
            if entry.guild_id.as_ref() != Some(guild) {
                return false;
            }
        }
        if let Some(actor) = &self.actor_id {
            if &entry.actor_id != actor {
                return false;
            }
        }
        if let Some(target) = &self.target_id {
            if &entry.target_id != target {
                return false;
            }
        }
        if let Some(op) = self.operation_type {
            if entry.operation_type != op {
                return false;
            }
        }
        if let Some(correlation) = &self.correlation_id {
            if entry.correlation_id().as_ref() != Some(correlation) {
                return false;
            }
        }
        if let Some(original) = &self.original_correlation_id {
            if entry.original_correlation_id().as_ref() != Some(original) {
                return false;
            }
        }
        true
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub page_size: usize,
}

impl Page {
    /// Build a page request, clamping both values into range.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn first(page_size: usize) -> Self {
        Self::new(1, page_size)
    }

    pub fn next(self) -> Self {
        Self::new(self.page + 1, self.page_size)
    }

    /// Index of the first entry on this page.
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// One page of chronologically ordered entries.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerPage {
    pub entries: Vec<AuditEntry>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

impl LedgerPage {
    /// True when no entries remain after this page.
    pub fn is_last(&self) -> bool {
        self.page * self.page_size >= self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamping() {
        assert_eq!(Page::new(0, 0), Page { page: 1, page_size: 1 });
        assert_eq!(Page::new(3, 10_000).page_size, MAX_PAGE_SIZE);
        assert_eq!(Page::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_last_page_detection() {
        let page = LedgerPage {
            entries: vec![],
            total_count: 25,
            page: 2,
            page_size: 10,
        };
        assert!(!page.is_last());
        assert!(LedgerPage { page: 3, ..page }.is_last());
    }
}
