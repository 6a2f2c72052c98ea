use std::collections::BTreeMap;

use crate::engine::word_stats::WordStat;

const STATS_KEY_PREFIX: &str = "wordStats_";

/// Persisted shape of a list's statistics: `{"word": {"appearanceCount": n, "resetCount": m}}`.
/// Ordered so that saved files diff cleanly between sessions.
pub type WordStatsData = BTreeMap<String, WordStat>;

/// Storage key for the statistics of one word list. Every character that is
/// not an ASCII letter or digit becomes `_`.
pub fn stats_storage_key(list_id: &str) -> String {
    let sanitized: String = list_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{STATS_KEY_PREFIX}{sanitized}")
}

pub fn encode_stats(data: &WordStatsData) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

pub fn decode_stats(raw: &str) -> serde_json::Result<WordStatsData> {
    serde_json::from_str(raw)
}
