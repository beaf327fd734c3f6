//! Injected search-usage tracking.
//!
//! Replaces process-wide mutable usage state with an explicit handle the
//! caller constructs and passes in. Cheap to clone; all clones share one
//! counter set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Point-in-time view of search usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub queries_issued: u64,
    pub queries_failed: u64,
    /// Last upstream-reported rate-limit or quota note, if any.
    pub last_limit_note: Option<String>,
}

/// Shared counter of search queries issued and upstream limit notes.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    issued: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    last_limit_note: Arc<Mutex<Option<String>>>,
}

impl UsageTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self) {
        self.issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Stores the most recent upstream limit note (quota warnings etc).
    pub fn record_limit_note(&self, note: &str) {
        if let Ok(mut guard) = self.last_limit_note.lock() {
            *guard = Some(note.to_owned());
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            queries_issued: self.issued.load(Ordering::Relaxed),
            queries_failed: self.failed.load(Ordering::Relaxed),
            last_limit_note: self
                .last_limit_note
                .lock()
                .ok()
                .and_then(|guard| guard.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let tracker = UsageTracker::new();
        let other = tracker.clone();
        tracker.record_query();
        other.record_query();
        other.record_failure();
        let snap = tracker.snapshot();
        assert_eq!(snap.queries_issued, 2);
        assert_eq!(snap.queries_failed, 1);
    }

    #[test]
    fn limit_note_keeps_latest() {
        let tracker = UsageTracker::new();
        tracker.record_limit_note("80% of monthly quota used");
        tracker.record_limit_note("95% of monthly quota used");
        assert_eq!(
            tracker.snapshot().last_limit_note.as_deref(),
            Some("95% of monthly quota used")
        );
    }
}
