//! Flashcard is a pair <front, back> belonging to a deck, plus its scheduling state
use super::{ReviewState, Reviewable, sm2};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub deck_id: String,
    pub front: String,
    pub back: String,
    pub review_state: ReviewState,
    pub created_at: i64,
}

impl Flashcard {
    /// Creates a card with a fresh id that is due immediately.
    pub fn new<Tz: TimeZone>(
        deck_id: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
        now: &DateTime<Tz>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            deck_id: deck_id.into(),
            front: front.into(),
            back: back.into(),
            review_state: sm2::default_review_state(now),
            created_at: now.timestamp_millis(),
        }
    }

    /// Copy of this card carrying a new review state.
    pub fn with_review_state(&self, review_state: ReviewState) -> Self {
        Self {
            review_state,
            ..self.clone()
        }
    }
}

impl Reviewable for Flashcard {
    fn review_state(&self) -> &ReviewState {
        &self.review_state
    }
}
