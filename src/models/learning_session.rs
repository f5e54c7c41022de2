//! Learning session management for spaced repetition practice.
//! Handles multi-round flashcard review with SM-2 algorithm integration.

use super::rating::Feedback;
use super::sm2::{self, DueLabel, PASSING_QUALITY};
use super::{Flashcard, ReviewState};
use crate::clock::Clock;
use crate::database::{CardStore, Result};

/// Session-local progress for one card.
#[derive(Clone, Debug)]
struct SessionCard {
    card: Flashcard,
    is_learned: bool,
    times_rated: u32,
}

/// What happened when a card was rated.
#[derive(Clone, Debug, PartialEq)]
pub struct RatingOutcome {
    pub card_id: String,
    pub review_state: ReviewState,
    pub feedback: Feedback,
    pub next_review: DueLabel,
}

/// Manages a study session over the due cards of one deck.
/// Cards that aren't mastered (quality < 3) are repeated in subsequent rounds.
pub struct StudySession<S: CardStore, C: Clock> {
    deck_id: String,
    cards: Vec<SessionCard>,
    current_round: Vec<usize>,
    current_index: usize,
    round_number: usize,
    store: S,
    clock: C,
}

impl<S: CardStore, C: Clock> StudySession<S, C> {
    /// Starts a session with the deck's cards that are due now, earliest due first.
    pub fn start(deck_id: impl Into<String>, store: S, clock: C) -> Result<Self> {
        let deck_id = deck_id.into();
        let now = clock.now();
        let deck_cards = store.cards_by_deck(&deck_id)?;
        let queue = sm2::due_queue(&deck_cards, &now);

        tracing::info!(
            deck_id = %deck_id,
            due = queue.len(),
            total = deck_cards.len(),
            "study session started"
        );

        let cards: Vec<_> = queue
            .into_iter()
            .map(|card| SessionCard {
                card,
                is_learned: false,
                times_rated: 0,
            })
            .collect();
        let current_round = (0..cards.len()).collect();

        Ok(Self {
            deck_id,
            cards,
            current_round,
            current_index: 0,
            round_number: 1,
            store,
            clock,
        })
    }

    pub fn deck_id(&self) -> &str {
        &self.deck_id
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.cards.get(idx))
            .map(|entry| &entry.card)
    }

    /// Rates the current card, persists its new review state, and moves on.
    ///
    /// Returns `Ok(None)` when there is no card left to rate. If the store
    /// rejects the write, the error is returned and the session is unchanged.
    pub fn rate_current_card(&mut self, quality: impl Into<i32>) -> Result<Option<RatingOutcome>> {
        let quality = quality.into();
        let Some(&idx) = self.current_round.get(self.current_index) else {
            return Ok(None);
        };
        let Some(entry) = self.cards.get(idx) else {
            return Ok(None);
        };

        let now = self.clock.now();
        let review_state = sm2::calculate_next_review(&entry.card.review_state, quality, &now);
        let updated = entry.card.with_review_state(review_state.clone());

        self.store.put_card(&updated)?;

        tracing::debug!(
            card_id = %updated.id,
            quality,
            interval = review_state.interval,
            repetitions = review_state.repetitions,
            due_date = review_state.due_date,
            "card rated"
        );

        let outcome = RatingOutcome {
            card_id: updated.id.clone(),
            feedback: Feedback::from_quality(quality),
            next_review: sm2::format_due_date(&review_state, &now),
            review_state,
        };

        if let Some(entry) = self.cards.get_mut(idx) {
            entry.card = updated;
            entry.is_learned = quality >= PASSING_QUALITY;
            entry.times_rated += 1;
        }
        self.next_card();

        Ok(Some(outcome))
    }

    fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with cards that weren't mastered (quality < 3).
    /// If no cards remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| self.cards.get(idx).is_some_and(|entry| !entry.is_learned))
            .collect();

        if failed.is_empty() {
            tracing::info!(
                deck_id = %self.deck_id,
                rounds = self.round_number,
                studied = self.studied_count(),
                "study session completed"
            );
            // Park past the end so no card is current
            self.current_index = self.current_round.len();
            return;
        }

        self.current_round = failed;
        self.current_index = 0;
        self.round_number += 1;
        tracing::info!(
            deck_id = %self.deck_id,
            round = self.round_number,
            cards = self.current_round.len(),
            "starting retry round"
        );
    }

    /// Cards in the current round rated 3 or better.
    pub fn learned_count(&self) -> usize {
        self.current_round
            .iter()
            .filter(|&&idx| self.cards.get(idx).is_some_and(|entry| entry.is_learned))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    /// Distinct cards rated at least once this session.
    pub fn studied_count(&self) -> usize {
        self.cards.iter().filter(|entry| entry.times_rated > 0).count()
    }

    /// Share of the session's cards rated at least once, 0-100.
    pub fn progress_percent(&self) -> f64 {
        if self.cards.is_empty() {
            return 100.0;
        }
        self.studied_count() as f64 * 100.0 / self.cards.len() as f64
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    /// Returns true when nothing was due or every card in the last round passed.
    pub fn is_completed(&self) -> bool {
        self.current_card().is_none()
    }

    /// Cards as they stand after this session's ratings, in study order.
    pub fn cards(&self) -> impl Iterator<Item = &Flashcard> {
        self.cards.iter().map(|entry| &entry.card)
    }
}
