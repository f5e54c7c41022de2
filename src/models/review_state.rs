//! Per-card SM-2 scheduling record.
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Scheduling state attached to every flashcard.
///
/// Timestamps are epoch milliseconds. A `last_review` of 0 means the card
/// has never been reviewed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// 1.3 ..= 2.5
    pub ease_factor: f64,
    /// Days until the next review, 0 ..= 365.
    pub interval: u32,
    /// Consecutive successful reviews since the last failure.
    pub repetitions: u32,
    pub due_date: i64,
    pub last_review: i64,
}

/// Which part of the learning cycle a card is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearningStage {
    /// Never passed, or failed since the last pass.
    Learning,
    /// One or two successful reviews in a row.
    Young(u32),
    Mature,
}

impl ReviewState {
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.due_date).single()
    }

    pub fn last_reviewed_at(&self) -> Option<DateTime<Utc>> {
        if self.last_review == 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.last_review).single()
    }

    pub fn is_new(&self) -> bool {
        self.last_review == 0
    }

    pub fn stage(&self) -> LearningStage {
        match self.repetitions {
            0 => LearningStage::Learning,
            n @ 1..=2 => LearningStage::Young(n),
            _ => LearningStage::Mature,
        }
    }
}

/// Anything that carries a [`ReviewState`].
pub trait Reviewable {
    fn review_state(&self) -> &ReviewState;
}

impl Reviewable for ReviewState {
    fn review_state(&self) -> &ReviewState {
        self
    }
}

impl<T: Reviewable + ?Sized> Reviewable for &T {
    fn review_state(&self) -> &ReviewState {
        (**self).review_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(repetitions: u32, last_review: i64) -> ReviewState {
        ReviewState {
            ease_factor: 2.5,
            interval: 0,
            repetitions,
            due_date: 0,
            last_review,
        }
    }

    #[test]
    fn test_stage_buckets() {
        assert_eq!(state(0, 0).stage(), LearningStage::Learning);
        assert_eq!(state(1, 0).stage(), LearningStage::Young(1));
        assert_eq!(state(2, 0).stage(), LearningStage::Young(2));
        assert_eq!(state(3, 0).stage(), LearningStage::Mature);
        assert_eq!(state(40, 0).stage(), LearningStage::Mature);
    }

    #[test]
    fn test_never_reviewed_sentinel() {
        assert!(state(0, 0).is_new());
        assert_eq!(state(0, 0).last_reviewed_at(), None);

        let reviewed = state(1, 1_700_000_000_000);
        assert!(!reviewed.is_new());
        assert_eq!(
            reviewed.last_reviewed_at().map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn test_json_field_names_and_precision() {
        let original = ReviewState {
            ease_factor: 2.36,
            interval: 15,
            repetitions: 3,
            due_date: 1_700_086_400_123,
            last_review: 1_700_000_000_123,
        };

        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"easeFactor\":2.36"));
        assert!(json.contains("\"dueDate\":1700086400123"));
        assert!(json.contains("\"lastReview\":1700000000123"));

        let restored: ReviewState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.ease_factor.to_bits(), original.ease_factor.to_bits());
    }
}
