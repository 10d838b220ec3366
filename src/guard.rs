use std::sync::atomic::{AtomicU64, Ordering};

/// A submitted query together with the counter value it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEvent {
    pub query: String,
    pub req_count: u64,
}

/// Tracks the most recently submitted request so that out-of-order responses
/// can be recognised and dropped.
///
/// The counter starts at zero, is bumped by exactly one per [`submit`], and
/// is never reset. A response is fresh only if it echoes the current value.
///
/// [`submit`]: StaleResponseGuard::submit
#[derive(Debug, Default)]
pub struct StaleResponseGuard {
    counter: AtomicU64,
}

impl StaleResponseGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, query: impl Into<String>) -> QueryEvent {
        let req_count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        QueryEvent {
            query: query.into(),
            req_count,
        }
    }

    /// Counter value of the latest submitted query, `0` before any submit.
    pub fn latest(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn is_fresh(&self, echoed: u64) -> bool {
        echoed == self.latest()
    }
}

#[test]
fn test_submit_increments_by_one() {
    let guard = StaleResponseGuard::new();
    assert_eq!(guard.latest(), 0);

    let first = guard.submit("cat");
    let second = guard.submit("catalog");
    assert_eq!(first.req_count, 1);
    assert_eq!(second.req_count, 2);
    assert_eq!(guard.latest(), 2);

    assert!(!guard.is_fresh(first.req_count));
    assert!(guard.is_fresh(second.req_count));
}
