//! Append-only event history with an optional bound.
//!
//! Unbounded by default, so the full cumulative history of a session is
//! kept. With a capacity the log behaves as a ring buffer: the oldest entry
//! is dropped for each new one past the bound and the drop is counted.

use std::collections::VecDeque;
use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct EventLog<T> {
    entries: VecDeque<T>,
    capacity: Option<usize>,
    /// Total ever appended, evicted entries included
    appended: u64,
    evicted: u64,
}

impl<T> EventLog<T> {
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    /// `None` keeps everything. A capacity of zero is treated as one.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        let capacity = capacity.map(|c| c.max(1));
        Self {
            entries: VecDeque::with_capacity(capacity.unwrap_or(0).min(1024)),
            capacity,
            appended: 0,
            evicted: 0,
        }
    }

    pub fn push(&mut self, entry: T) {
        if let Some(cap) = self.capacity {
            if self.entries.len() == cap {
                self.entries.pop_front();
                self.evicted += 1;
            }
        }
        self.entries.push_back(entry);
        self.appended += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn total_appended(&self) -> u64 {
        self.appended
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }
}

impl<T: Display> EventLog<T> {
    /// Rendered text of every retained entry, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }
}

impl<T> Default for EventLog<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> Extend<T> for EventLog<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

impl<'a, T> IntoIterator for &'a EventLog<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut log = EventLog::unbounded();
        log.extend(0..500);

        assert_eq!(log.len(), 500);
        assert_eq!(log.evicted(), 0);
        assert_eq!(log.iter().next(), Some(&0));
        assert_eq!(log.last(), Some(&499));
    }

    #[test]
    fn test_bounded_drops_oldest() {
        let mut log = EventLog::with_capacity(Some(3));
        log.extend(1..=5);

        assert_eq!(log.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(log.evicted(), 2);
        assert_eq!(log.total_appended(), 5);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut log = EventLog::with_capacity(Some(0));
        log.push("a");
        log.push("b");
        assert_eq!(log.capacity(), Some(1));
        assert_eq!(log.lines(), vec!["b".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_bounded_log_keeps_newest(cap in 1usize..50, n in 0usize..200) {
            let mut log = EventLog::with_capacity(Some(cap));
            log.extend(0..n);

            let kept = n.min(cap);
            prop_assert_eq!(log.len(), kept);
            prop_assert_eq!(log.evicted() as usize, n - kept);
            let expected: Vec<usize> = (n - kept..n).collect();
            prop_assert_eq!(log.iter().copied().collect::<Vec<_>>(), expected);
        }
    }
}
