//! Operation journal for picker proxies.
//!
//! Records every control operation from the moment it is issued until the
//! instance (or the failed load) answers it.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::PickerError;
use crate::types::OperationKind;

/// How an operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed(String),
}

impl Outcome {
    pub fn from_result(result: &Result<(), PickerError>) -> Self {
        match result {
            Ok(()) => Self::Completed,
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

/// An entry in the journal.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// Unique entry ID
    pub entry_id: String,
    /// Proxy that received the call
    pub proxy_id: String,
    /// Operation invoked
    pub op: OperationKind,
    /// When the caller invoked the operation
    pub issued_at: DateTime<Utc>,
    /// When the call was handed to the instance
    pub forwarded_at: Option<DateTime<Utc>>,
    /// When the call was answered
    pub completed_at: Option<DateTime<Utc>>,
    pub outcome: Option<Outcome>,
}

impl JournalEntry {
    /// Create an entry for a freshly issued call.
    pub fn issued(proxy_id: impl Into<String>, op: OperationKind, issued_at: DateTime<Utc>) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            proxy_id: proxy_id.into(),
            op,
            issued_at,
            forwarded_at: None,
            completed_at: None,
            outcome: None,
        }
    }

    /// Milliseconds from issue to answer.
    pub fn duration_ms(&self) -> Option<u64> {
        self.completed_at
            .map(|done| (done - self.issued_at).num_milliseconds().max(0) as u64)
    }
}

/// Bounded log of proxy operations (newest first).
pub struct OperationJournal {
    entries: Arc<RwLock<VecDeque<JournalEntry>>>,
    max_entries: usize,
}

impl OperationJournal {
    /// Create with custom max entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries,
        }
    }

    /// Log an issued call.
    pub async fn log_issued(&self, entry: JournalEntry) {
        let mut entries = self.entries.write().await;
        entries.push_front(entry);

        // Prune if over limit
        while entries.len() > self.max_entries {
            entries.pop_back();
        }
    }

    /// Mark a call as handed to the instance.
    pub async fn log_forwarded(&self, entry_id: &str) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.iter_mut().find(|e| e.entry_id == entry_id) {
            entry.forwarded_at = Some(Utc::now());
        }
    }

    /// Record how a call ended.
    pub async fn log_outcome(&self, entry_id: &str, outcome: Outcome) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.iter_mut().find(|e| e.entry_id == entry_id) {
            entry.completed_at = Some(Utc::now());
            entry.outcome = Some(outcome);
        }
    }

    /// Get recent entries.
    pub async fn recent(&self, limit: usize) -> Vec<JournalEntry> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    /// Get entry by ID.
    pub async fn get(&self, entry_id: &str) -> Option<JournalEntry> {
        let entries = self.entries.read().await;
        entries.iter().find(|e| e.entry_id == entry_id).cloned()
    }

    /// Get entries for an operation kind.
    pub async fn by_kind(&self, op: OperationKind, limit: usize) -> Vec<JournalEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| e.op == op)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Get statistics.
    pub async fn stats(&self) -> JournalStats {
        let entries = self.entries.read().await;

        let total = entries.len();
        let completed = entries
            .iter()
            .filter(|e| e.outcome == Some(Outcome::Completed))
            .count();
        let failed = entries
            .iter()
            .filter(|e| matches!(e.outcome, Some(Outcome::Failed(_))))
            .count();

        let durations: Vec<u64> = entries.iter().filter_map(JournalEntry::duration_ms).collect();
        let avg_duration_ms = if durations.is_empty() {
            0
        } else {
            durations.iter().sum::<u64>() / durations.len() as u64
        };

        JournalStats {
            total_operations: total,
            completed,
            failed,
            pending: total - completed - failed,
            avg_duration_ms,
        }
    }

    /// Clear the journal.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Get count.
    pub async fn count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}

/// Statistics from the journal.
#[derive(Debug, Clone)]
pub struct JournalStats {
    pub total_operations: usize,
    pub completed: usize,
    pub failed: usize,
    /// Issued but not yet answered
    pub pending: usize,
    pub avg_duration_ms: u64,
}
