use log::error;
use rand::Rng;

use crate::engine::word_stats::{WordStat, WordStatsStore};
use crate::words::Word;

pub const DEFAULT_RESET_PENALTY: f64 = 5.0;

/// Picks the next practice word, favouring words that have been seen less.
#[derive(Clone, Copy, Debug)]
pub struct WeightedSelector {
    reset_penalty: f64,
}

impl Default for WeightedSelector {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_PENALTY)
    }
}

impl WeightedSelector {
    pub fn new(reset_penalty: f64) -> Self {
        Self { reset_penalty }
    }

    pub fn weight(&self, stat: WordStat) -> f64 {
        1.0 / (stat.appearance_count as f64 + 1.0 + stat.reset_count as f64 * self.reset_penalty)
    }

    /// Index into `pool` of the chosen word, or `None` when the pool is empty.
    /// Words missing from `stats` weigh as if never seen.
    pub fn select_index<R: Rng + ?Sized>(
        &self,
        pool: &[Word],
        stats: &WordStatsStore,
        rng: &mut R,
    ) -> Option<usize> {
        match pool.len() {
            0 => return None,
            1 => return Some(0),
            _ => {}
        }

        let weights: Vec<f64> = pool
            .iter()
            .map(|w| self.weight(stats.get(&w.word).unwrap_or_default()))
            .collect();
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            error!("selection weights sum to {total}; falling back to first word");
            return Some(0);
        }

        let r = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if r <= cumulative {
                return Some(i);
            }
        }

        error!("cumulative walk ended without a pick (r = {r}, total = {total})");
        Some(0)
    }
}
