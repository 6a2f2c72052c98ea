use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::store::KeyValueStore;
use crate::store::schema::{WordStatsData, decode_stats, encode_stats, stats_storage_key};
use crate::words::Word;

pub const DEFAULT_RESET_THRESHOLD: u32 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordStat {
    #[serde(default)]
    pub appearance_count: u32,
    #[serde(default)]
    pub reset_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppearanceOutcome {
    pub stat: WordStat,
    pub did_reset: bool,
}

/// Exposure counters for every word of the active list.
#[derive(Clone, Debug, Default)]
pub struct WordStatsStore {
    stats: HashMap<String, WordStat>,
}

impl WordStatsStore {
    /// Restore the statistics saved for `list_id`. Missing or unreadable data
    /// yields an empty store.
    pub fn load(store: &dyn KeyValueStore, list_id: &str) -> Self {
        let key = stats_storage_key(list_id);
        let raw = match store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no saved statistics under {key}");
                return Self::default();
            }
            Err(e) => {
                warn!("could not read statistics {key}: {e}");
                return Self::default();
            }
        };

        match decode_stats(&raw) {
            Ok(data) => Self {
                stats: data.into_iter().collect(),
            },
            Err(e) => {
                warn!("discarding corrupt statistics {key}: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore, list_id: &str) -> Result<(), PersistenceError> {
        let data: WordStatsData = self
            .stats
            .iter()
            .map(|(w, s)| (w.clone(), *s))
            .collect();
        let json = encode_stats(&data)?;
        store.set(&stats_storage_key(list_id), &json)
    }

    pub fn ensure(&mut self, word: &str) -> WordStat {
        *self.stats.entry(word.to_string()).or_default()
    }

    pub fn ensure_all(&mut self, words: &[Word]) {
        for w in words {
            self.ensure(&w.word);
        }
    }

    /// Count one more appearance of `word`. Reaching `reset_threshold` wraps the
    /// appearance count to zero and carries into the reset count.
    pub fn record_appearance(&mut self, word: &str, reset_threshold: u32) -> AppearanceOutcome {
        let threshold = reset_threshold.max(1);
        let stat = self.stats.entry(word.to_string()).or_default();
        stat.appearance_count = stat.appearance_count.saturating_add(1);

        let did_reset = stat.appearance_count >= threshold;
        if did_reset {
            stat.appearance_count = 0;
            stat.reset_count = stat.reset_count.saturating_add(1);
            debug!(
                "'{word}' reached {threshold} appearances, reset count now {}",
                stat.reset_count
            );
        }

        AppearanceOutcome {
            stat: *stat,
            did_reset,
        }
    }

    /// Bring saved counters back under `reset_threshold`, carrying whole
    /// multiples of it into the reset count. Needed when the threshold was
    /// lowered since the statistics were written.
    pub fn normalize(&mut self, reset_threshold: u32) {
        let threshold = reset_threshold.max(1);
        for (word, stat) in self.stats.iter_mut() {
            if stat.appearance_count < threshold {
                continue;
            }
            let carried = stat.appearance_count / threshold;
            stat.reset_count = stat.reset_count.saturating_add(carried);
            stat.appearance_count %= threshold;
            debug!("normalized '{word}' to {stat:?} under threshold {threshold}");
        }
    }

    pub fn get(&self, word: &str) -> Option<WordStat> {
        self.stats.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKvStore;

    #[test]
    fn test_ensure_inserts_zeroed_entry_once() {
        let mut stats = WordStatsStore::default();
        assert_eq!(stats.ensure("apple"), WordStat::default());
        stats.record_appearance("apple", 10);
        assert_eq!(stats.ensure("apple").appearance_count, 1);
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn test_threshold_appearances_carry_into_reset_count() {
        let mut stats = WordStatsStore::default();
        let mut last = None;
        for _ in 0..10 {
            last = Some(stats.record_appearance("apple", 10));
        }
        let last = last.unwrap();
        assert!(last.did_reset);
        assert_eq!(
            last.stat,
            WordStat {
                appearance_count: 0,
                reset_count: 1
            }
        );
    }

    #[test]
    fn test_appearance_count_stays_below_threshold() {
        let mut stats = WordStatsStore::default();
        for threshold in [1, 2, 3, 7, 10] {
            let word = format!("w{threshold}");
            for n in 1..=50u32 {
                let outcome = stats.record_appearance(&word, threshold);
                assert!(outcome.stat.appearance_count < threshold);
                assert_eq!(outcome.stat.reset_count, n / threshold);
            }
        }
    }

    #[test]
    fn test_zero_threshold_is_treated_as_one() {
        let mut stats = WordStatsStore::default();
        let outcome = stats.record_appearance("a", 0);
        assert!(outcome.did_reset);
        assert_eq!(outcome.stat.appearance_count, 0);
        assert_eq!(outcome.stat.reset_count, 1);
    }

    #[test]
    fn test_normalize_carries_into_reset_count() {
        let mut kv = MemoryKvStore::new();
        kv.set(
            &stats_storage_key("t"),
            r#"{"cat":{"appearanceCount":7,"resetCount":1},"dog":{"appearanceCount":12,"resetCount":0},"ant":{"appearanceCount":3,"resetCount":2}}"#,
        )
        .unwrap();
        let mut stats = WordStatsStore::load(&kv, "t");
        stats.normalize(5);

        let expect = |a, r| WordStat {
            appearance_count: a,
            reset_count: r,
        };
        assert_eq!(stats.get("cat"), Some(expect(2, 2)));
        assert_eq!(stats.get("dog"), Some(expect(2, 2)));
        assert_eq!(stats.get("ant"), Some(expect(3, 2)));
    }

    #[test]
    fn test_saturated_counters_do_not_overflow() {
        let mut kv = MemoryKvStore::new();
        kv.set(
            &stats_storage_key("t"),
            r#"{"cat":{"appearanceCount":4294967295,"resetCount":4294967295}}"#,
        )
        .unwrap();
        let mut stats = WordStatsStore::load(&kv, "t");

        let outcome = stats.record_appearance("cat", 10);
        assert!(outcome.did_reset);
        assert_eq!(outcome.stat.appearance_count, 0);
        assert_eq!(outcome.stat.reset_count, u32::MAX);

        let mut stats = WordStatsStore::load(&kv, "t");
        stats.normalize(10);
        let stat = stats.get("cat").unwrap();
        assert!(stat.appearance_count < 10);
        assert_eq!(stat.reset_count, u32::MAX);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut kv = MemoryKvStore::new();
        let mut stats = WordStatsStore::default();
        stats.record_appearance("apple", 10);
        stats.record_appearance("apple", 10);
        stats.ensure("pear");
        stats.save(&mut kv, "lists/beginner.json").unwrap();

        let loaded = WordStatsStore::load(&kv, "lists/beginner.json");
        assert_eq!(loaded.get("apple").unwrap().appearance_count, 2);
        assert_eq!(loaded.get("pear"), Some(WordStat::default()));

        // Stats are scoped per list.
        assert!(WordStatsStore::load(&kv, "advanced").is_empty());
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let mut kv = MemoryKvStore::new();
        kv.set(&stats_storage_key("beginner"), "{ not json").unwrap();
        assert!(WordStatsStore::load(&kv, "beginner").is_empty());
    }
}
