//! Process-wide indexing progress, polled by the gateway.
//!
//! One live entry per repository currently indexing, keyed by the
//! lowercased repository identifier. Lifecycle: insert on job start,
//! update on each file completion, delete on terminal state. Not durable
//! across restarts.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Counters for one in-flight (or just-finished) indexing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexProgress {
    pub total: usize,
    pub processed: usize,
    pub started_at_ms: i64,
}

/// Cheap-clone handle to the shared progress map.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    entries: Arc<RwLock<HashMap<String, IndexProgress>>>,
}

fn key_for(repo: &str) -> String {
    repo.to_lowercase()
}

impl ProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job. Replaces any stale entry for the repository.
    pub fn start(&self, repo: &str, total: usize) {
        let entry = IndexProgress {
            total,
            processed: 0,
            started_at_ms: chrono::Utc::now().timestamp_millis(),
        };
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key_for(repo), entry);
        }
    }

    /// Count one more file as attempted. Saturates at `total`.
    pub fn record_processed(&self, repo: &str) {
        if let Ok(mut entries) = self.entries.write()
            && let Some(entry) = entries.get_mut(&key_for(repo))
            && entry.processed < entry.total
        {
            entry.processed += 1;
        }
    }

    #[must_use]
    pub fn get(&self, repo: &str) -> Option<IndexProgress> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&key_for(repo)).copied())
    }

    pub fn clear(&self, repo: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&key_for(repo));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_insert_update_delete() {
        let tracker = ProgressTracker::new();
        assert!(tracker.get("owner/repo").is_none());

        tracker.start("owner/repo", 3);
        let entry = tracker.get("owner/repo").unwrap();
        assert_eq!(entry.total, 3);
        assert_eq!(entry.processed, 0);
        assert!(entry.started_at_ms > 0);

        tracker.record_processed("owner/repo");
        tracker.record_processed("owner/repo");
        assert_eq!(tracker.get("owner/repo").unwrap().processed, 2);

        tracker.clear("owner/repo");
        assert!(tracker.get("owner/repo").is_none());
    }

    #[test]
    fn key_is_case_insensitive() {
        let tracker = ProgressTracker::new();
        tracker.start("Owner/Repo", 5);
        tracker.record_processed("owner/repo");
        assert_eq!(tracker.get("OWNER/REPO").unwrap().processed, 1);
    }

    #[test]
    fn processed_never_exceeds_total() {
        let tracker = ProgressTracker::new();
        tracker.start("r", 2);
        for _ in 0..5 {
            tracker.record_processed("r");
        }
        assert_eq!(tracker.get("r").unwrap().processed, 2);
    }

    #[test]
    fn record_on_missing_entry_is_noop() {
        let tracker = ProgressTracker::new();
        tracker.record_processed("ghost");
        assert!(tracker.get("ghost").is_none());
    }

    #[test]
    fn clones_share_state() {
        let tracker = ProgressTracker::new();
        let clone = tracker.clone();
        tracker.start("r", 1);
        assert!(clone.get("r").is_some());
    }
}
