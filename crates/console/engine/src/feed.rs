//! Bounded activity feed of displayed signals

use std::collections::VecDeque;

use console_types::SignalDetail;

/// Newest-first list of signals that reached the operator directly
#[derive(Clone, Debug)]
pub struct ActivityFeed {
    capacity: usize,
    entries: VecDeque<SignalDetail>,
}

impl ActivityFeed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Insert at the front, evicting the oldest entry when full.
    pub fn push(&mut self, signal: SignalDetail) {
        self.entries.push_front(signal);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&SignalDetail> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalDetail> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<SignalDetail> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActivityFeed {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::SignalNormalizer;
    use console_types::RawSignal;

    fn signal(message: &str) -> SignalDetail {
        SignalNormalizer.normalize(RawSignal::new().with_message(message))
    }

    #[test]
    fn test_newest_first_and_bounded() {
        let mut feed = ActivityFeed::new(2);
        feed.push(signal("one"));
        feed.push(signal("two"));
        feed.push(signal("three"));
        let messages: Vec<_> = feed.iter().map(|s| s.message.as_str()).collect();
        assert_eq!(messages, vec!["three", "two"]);
        assert_eq!(feed.latest().unwrap().message, "three");
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut feed = ActivityFeed::new(0);
        feed.push(signal("x"));
        assert_eq!(feed.len(), 1);
    }
}
