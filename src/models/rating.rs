//! Learner-facing ratings and the feedback shown after each one.
use super::sm2::{MAX_QUALITY, MIN_QUALITY};

/// The three study buttons and the SM-2 quality each one stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rating {
    Again,
    Good,
    Easy,
}

impl Rating {
    pub fn quality(self) -> i32 {
        match self {
            Rating::Again => 1,
            Rating::Good => 3,
            Rating::Easy => 5,
        }
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.quality()
    }
}

/// How a rating went, for the message shown after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Great,
    Good,
    NeedsReview,
}

impl Feedback {
    pub fn from_quality(quality: i32) -> Self {
        match quality.clamp(MIN_QUALITY, MAX_QUALITY) {
            4..=5 => Feedback::Great,
            2..=3 => Feedback::Good,
            _ => Feedback::NeedsReview,
        }
    }
}
