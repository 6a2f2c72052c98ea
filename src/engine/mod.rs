pub mod scoring;
pub mod selector;
pub mod word_stats;

pub use selector::WeightedSelector;
pub use word_stats::{AppearanceOutcome, WordStat, WordStatsStore};
