//! Append-only audit trail of emitted signals
//!
//! Owned by the caller. The poller is the single writer and records only
//! BUY/SELL results; status readers take shared locks. The engine never
//! touches it.
//!
//! Retention is bounded: once `capacity` entries are held, the oldest one is
//! dropped on every record. The running total keeps counting.

use std::{
    collections::VecDeque,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::signal::SignalResult;

/// Entries retained by [`SignalJournal::new`].
pub const DEFAULT_JOURNAL_CAPACITY: usize = 500;

#[derive(Debug)]
struct JournalState {
    history: VecDeque<SignalResult>,
    capacity: usize,
    total: usize,
}

/// Thread-safe, bounded signal history.
#[derive(Debug)]
pub struct SignalJournal {
    state: RwLock<JournalState>,
}

impl Default for SignalJournal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_JOURNAL_CAPACITY)
    }
}

impl SignalJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Journal retaining at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: RwLock::new(JournalState {
                history: VecDeque::with_capacity(capacity.min(DEFAULT_JOURNAL_CAPACITY)),
                capacity,
                total: 0,
            }),
        }
    }

    // Poisoning is ignored: a push either lands or it doesn't.
    fn read(&self) -> RwLockReadGuard<'_, JournalState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, JournalState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a result and make it the last signal, evicting the oldest
    /// entry when full.
    pub fn record(&self, signal: SignalResult) {
        let mut state = self.write();
        if state.history.len() == state.capacity {
            state.history.pop_front();
        }
        state.history.push_back(signal);
        state.total += 1;
    }

    pub fn last_signal(&self) -> Option<SignalResult> {
        self.read().history.back().cloned()
    }

    /// Results recorded since creation, evicted ones included.
    pub fn total_signals(&self) -> usize {
        self.read().total
    }

    pub fn capacity(&self) -> usize {
        self.read().capacity
    }

    /// Snapshot of the retained history, oldest first.
    pub fn history(&self) -> Vec<SignalResult> {
        self.read().history.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::signal::NoSignalReason;

    #[test]
    fn test_empty() {
        let journal = SignalJournal::new();
        assert_eq!(journal.total_signals(), 0);
        assert_eq!(journal.capacity(), DEFAULT_JOURNAL_CAPACITY);
        assert!(journal.last_signal().is_none());
        assert!(journal.history().is_empty());
    }

    #[test]
    fn test_record_order() {
        let journal = SignalJournal::new();
        journal.record(SignalResult::no_signal(NoSignalReason::NoBias, 3.0));
        journal.record(SignalResult::no_signal(NoSignalReason::Misaligned, 3.0));

        assert_eq!(journal.total_signals(), 2);
        assert_eq!(
            journal.last_signal().and_then(|s| s.reason()),
            Some(NoSignalReason::Misaligned)
        );
        assert_eq!(
            journal.history()[0].reason(),
            Some(NoSignalReason::NoBias)
        );
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let journal = SignalJournal::with_capacity(2);
        journal.record(SignalResult::no_signal(NoSignalReason::NoBias, 1.0));
        journal.record(SignalResult::no_signal(NoSignalReason::NoBias, 2.0));
        journal.record(SignalResult::no_signal(NoSignalReason::NoBias, 3.0));

        let history = journal.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].risk_reward_ratio, 2.0);
        assert_eq!(journal.last_signal().map(|s| s.risk_reward_ratio), Some(3.0));
        assert_eq!(journal.total_signals(), 3);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let journal = SignalJournal::with_capacity(0);
        assert_eq!(journal.capacity(), 1);
        journal.record(SignalResult::no_signal(NoSignalReason::NoBias, 1.0));
        journal.record(SignalResult::no_signal(NoSignalReason::NoBias, 2.0));
        assert_eq!(journal.history().len(), 1);
        assert_eq!(journal.last_signal().map(|s| s.risk_reward_ratio), Some(2.0));
    }

    #[test]
    fn test_concurrent_writers() {
        let journal = Arc::new(SignalJournal::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let journal = Arc::clone(&journal);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        journal.record(SignalResult::no_signal(NoSignalReason::NoBias, 3.0));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(journal.total_signals(), 100);
        assert_eq!(journal.history().len(), 100);
    }
}
