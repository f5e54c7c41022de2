//! Clock-driven front end to the SM-2 functions.

use super::sm2::{self, DueLabel};
use super::{ReviewState, Reviewable};
use crate::clock::{Clock, SystemClock};

/// Review scheduler that reads "now" from an injected [`Clock`].
///
/// Holds no card data. Callers must serialize the read-rate-write round-trip
/// for a given card; the scheduler only computes the next state.
#[derive(Clone, Debug, Default)]
pub struct ReviewScheduler<C: Clock = SystemClock> {
    clock: C,
}

impl<C: Clock> ReviewScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn create_default_review_state(&self) -> ReviewState {
        sm2::default_review_state(&self.clock.now())
    }

    pub fn calculate_next_review(&self, review_state: &ReviewState, quality: i32) -> ReviewState {
        sm2::calculate_next_review(review_state, quality, &self.clock.now())
    }

    pub fn is_due(&self, review_state: &ReviewState) -> bool {
        sm2::is_due(review_state, &self.clock.now())
    }

    pub fn due_cards<T: Reviewable + Clone>(&self, cards: &[T]) -> Vec<T> {
        sm2::due_cards(cards, &self.clock.now())
    }

    pub fn sort_by_due_date<T: Reviewable + Clone>(&self, cards: &[T]) -> Vec<T> {
        sm2::sort_by_due_date(cards)
    }

    pub fn due_queue<T: Reviewable + Clone>(&self, cards: &[T]) -> Vec<T> {
        sm2::due_queue(cards, &self.clock.now())
    }

    pub fn days_until_review(&self, review_state: &ReviewState) -> u32 {
        sm2::days_until_review(review_state, &self.clock.now())
    }

    pub fn format_due_date(&self, review_state: &ReviewState) -> DueLabel {
        sm2::format_due_date(review_state, &self.clock.now())
    }
}
