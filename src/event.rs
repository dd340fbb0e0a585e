use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A single payment event, built fresh for each publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: u64,
}

impl PaymentEvent {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

/// Hands out strictly increasing identifiers starting at 1.
///
/// Identifiers are never returned to the pool, so a failed publish leaves a
/// permanent gap in the emitted sequence. Overflow wraps.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Last identifier handed out, 0 before the first call.
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_starts_at_one_and_increments() {
        let ids = IdGenerator::new();
        assert_eq!(ids.current(), 0);
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.next(), 2);
        assert_eq!(ids.next(), 3);
        assert_eq!(ids.current(), 3);
    }

    #[test]
    fn test_concurrent_calls_never_repeat() {
        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "identifier {} issued twice", id);
            }
        }

        assert_eq!(seen.len(), 1000);
        assert_eq!(ids.current(), 1000);
    }
}
