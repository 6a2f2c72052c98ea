pub const DEFAULT_POINTS_PER_WORD: u32 = 10;

/// Percentage of typed characters that were not errors. Nothing typed counts
/// as perfect.
pub fn accuracy(typed: u32, errors: u32) -> f64 {
    if typed == 0 {
        return 100.0;
    }
    typed.saturating_sub(errors) as f64 / typed as f64 * 100.0
}

pub fn accuracy_label(typed: u32, errors: u32) -> String {
    if typed == 0 {
        return "100%".to_string();
    }
    format!("{:.1}%", accuracy(typed, errors))
}

pub fn completion_points(correct: bool, points_per_word: u32) -> u32 {
    if correct { points_per_word } else { 0 }
}
