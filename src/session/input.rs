use crate::engine::scoring;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Correct,
    Incorrect,
    Current,
    Untouched,
}

/// Key that asks for the current word to be completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitKey {
    Space,
    Enter,
}

/// Per-position status of `input` typed against `target`, covering
/// `max(input.len(), target.len())` positions.
pub fn classify(input: &[char], target: &[char]) -> Vec<CharStatus> {
    let len = input.len().max(target.len());
    (0..len)
        .map(|i| {
            if i < input.len() {
                if i < target.len() && input[i] == target[i] {
                    CharStatus::Correct
                } else {
                    CharStatus::Incorrect
                }
            } else if i == input.len() && i < target.len() {
                CharStatus::Current
            } else {
                CharStatus::Untouched
            }
        })
        .collect()
}

/// Session-wide typed and error counters. Both only ever grow.
#[derive(Clone, Debug, Default)]
pub struct MatchTracker {
    pub typed: u32,
    pub errors: u32,
    prev_len: usize,
}

impl MatchTracker {
    /// Forget the previous input length when a new word is presented.
    pub fn start_word(&mut self) {
        self.prev_len = 0;
    }

    /// Account for an input change. Growth counts as one typed character no
    /// matter how many were added; the last character is checked against the
    /// target, overtyping excluded.
    pub fn observe(&mut self, input: &[char], target: &[char]) {
        let grew = input.len() > self.prev_len;
        self.prev_len = input.len();
        if !grew {
            return;
        }

        self.typed += 1;
        let last = input.len() - 1;
        if last < target.len() && input[last] != target[last] {
            self.errors += 1;
        }
    }

    pub fn accuracy(&self) -> f64 {
        scoring::accuracy(self.typed, self.errors)
    }

    pub fn accuracy_label(&self) -> String {
        scoring::accuracy_label(self.typed, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::CharStatus::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_classify_partial_mismatch() {
        assert_eq!(
            classify(&chars("helo"), &chars("hello")),
            vec![Correct, Correct, Correct, Incorrect, Current]
        );
    }

    #[test]
    fn test_classify_empty_input_marks_first_current() {
        assert_eq!(
            classify(&[], &chars("abc")),
            vec![Current, Untouched, Untouched]
        );
    }

    #[test]
    fn test_classify_overtyping_is_incorrect() {
        assert_eq!(
            classify(&chars("cats"), &chars("cat")),
            vec![Correct, Correct, Correct, Incorrect]
        );
    }

    #[test]
    fn test_classify_compares_scalar_values() {
        assert_eq!(
            classify(&chars("사과"), &chars("사랑")),
            vec![Correct, Incorrect]
        );
    }

    #[test]
    fn test_tracker_counts_growth_and_errors() {
        let target = chars("cat");
        let mut tracker = MatchTracker::default();
        tracker.observe(&chars("c"), &target);
        tracker.observe(&chars("cx"), &target);
        tracker.observe(&chars("c"), &target);
        tracker.observe(&chars("ca"), &target);
        tracker.observe(&chars("cat"), &target);
        assert_eq!(tracker.typed, 4);
        assert_eq!(tracker.errors, 1);
        assert_eq!(tracker.accuracy_label(), "75.0%");
    }

    #[test]
    fn test_overtyping_not_counted_as_error() {
        let target = chars("cat");
        let mut tracker = MatchTracker::default();
        tracker.observe(&chars("cats"), &target);
        assert_eq!(tracker.typed, 1);
        assert_eq!(tracker.errors, 0);
    }

    #[test]
    fn test_paste_counts_once() {
        let target = chars("hello");
        let mut tracker = MatchTracker::default();
        tracker.observe(&chars("hellx"), &target);
        assert_eq!(tracker.typed, 1);
        assert_eq!(tracker.errors, 1);
    }

    #[test]
    fn test_start_word_resets_growth_baseline() {
        let mut tracker = MatchTracker::default();
        tracker.observe(&chars("ab"), &chars("ab"));
        tracker.start_word();
        tracker.observe(&chars("x"), &chars("xy"));
        assert_eq!(tracker.typed, 2);
        assert_eq!(tracker.errors, 0);
    }

    #[test]
    fn test_untouched_tracker_is_perfect() {
        let tracker = MatchTracker::default();
        assert_eq!(tracker.accuracy(), 100.0);
        assert_eq!(tracker.accuracy_label(), "100%");
    }
}
