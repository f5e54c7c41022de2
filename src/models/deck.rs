//! Deck groups flashcards under a title
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Deck {
    pub fn new<Tz: TimeZone>(
        title: impl Into<String>,
        description: impl Into<String>,
        now: &DateTime<Tz>,
    ) -> Self {
        let at = now.timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            created_at: at,
            updated_at: at,
        }
    }
}
