use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::AssetId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

/// One reported threshold crossing: the same asset crossing the same
/// threshold in the same direction is only reported once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub asset_id: AssetId,
    pub direction: Direction,
    threshold_bits: u64,
}

impl AlertKey {
    pub fn new(asset_id: AssetId, direction: Direction, threshold: f64) -> Self {
        Self {
            asset_id,
            direction,
            // f64 is not Hash; the bit pattern is exact for a stored threshold.
            threshold_bits: threshold.to_bits(),
        }
    }

    pub fn threshold(&self) -> f64 {
        f64::from_bits(self.threshold_bits)
    }
}

/// Process-lifetime memory of alerts already sent.
///
/// Entries never expire; `reset` is the only way to forget them.
#[derive(Debug, Default)]
pub struct AlertCache {
    sent: Mutex<HashSet<AlertKey>>,
}

impl AlertCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_alerted(&self, key: &AlertKey) -> bool {
        self.sent.lock().contains(key)
    }

    pub fn record_alerted(&self, key: AlertKey) {
        self.sent.lock().insert(key);
    }

    /// Check-and-record under a single lock. Returns `true` if the key was new.
    pub fn mark_if_new(&self, key: AlertKey) -> bool {
        self.sent.lock().insert(key)
    }

    pub fn reset(&self) {
        self.sent.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn keys_differ_by_direction_and_threshold() {
        let cache = AlertCache::new();
        let buy = AlertKey::new(AssetId(1), Direction::Buy, 100.0);
        cache.record_alerted(buy);

        assert!(cache.has_alerted(&buy));
        assert!(!cache.has_alerted(&AlertKey::new(AssetId(1), Direction::Sell, 100.0)));
        assert!(!cache.has_alerted(&AlertKey::new(AssetId(1), Direction::Buy, 99.0)));
        assert!(!cache.has_alerted(&AlertKey::new(AssetId(2), Direction::Buy, 100.0)));
        assert_eq!(buy.threshold(), 100.0);
    }

    #[test]
    fn reset_forgets_everything() {
        let cache = AlertCache::new();
        assert!(cache.mark_if_new(AlertKey::new(AssetId(1), Direction::Buy, 1.0)));
        assert!(!cache.mark_if_new(AlertKey::new(AssetId(1), Direction::Buy, 1.0)));
        cache.reset();
        assert!(cache.is_empty());
        assert!(cache.mark_if_new(AlertKey::new(AssetId(1), Direction::Buy, 1.0)));
    }

    #[test]
    fn concurrent_marks_admit_exactly_one_winner() {
        let cache = Arc::new(AlertCache::new());
        let key = AlertKey::new(AssetId(9), Direction::Sell, 150.0);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.mark_if_new(key))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
