use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::scoring;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    TimeUp,
    PoolExhausted,
}

/// What the player sees when a session ends.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub list_id: String,
    pub total_typed: u32,
    pub total_errors: u32,
    pub accuracy: f64,
    pub words_completed: u32,
    pub score: u32,
    pub reason: EndReason,
    pub ended_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn accuracy_label(&self) -> String {
        scoring::accuracy_label(self.total_typed, self.total_errors)
    }

    pub fn reason_label(&self) -> &'static str {
        match self.reason {
            EndReason::TimeUp => "Time's up",
            EndReason::PoolExhausted => "Word pool exhausted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(typed: u32, errors: u32) -> SessionSummary {
        SessionSummary {
            list_id: "beginner".into(),
            total_typed: typed,
            total_errors: errors,
            accuracy: scoring::accuracy(typed, errors),
            words_completed: 2,
            score: 20,
            reason: EndReason::TimeUp,
            ended_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_accuracy_label() {
        assert_eq!(summary(10, 2).accuracy_label(), "80.0%");
        assert_eq!(summary(0, 0).accuracy_label(), "100%");
    }

    #[test]
    fn test_end_reason_serializes_snake_case() {
        let json = serde_json::to_string(&summary(1, 0)).unwrap();
        assert!(json.contains("\"reason\":\"time_up\""));
    }
}
