//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates review intervals based on recall quality:
//! - Each card has an ease factor (EF) that adjusts after successful reviews
//! - Quality grades 0-2: repetitions reset and the card comes back tomorrow; EF is kept
//! - Quality grades 3-5: interval grows progressively (1 day → 6 days → interval × EF)
//! - EF stays within 1.3..=2.5 and intervals never exceed a year
//!
//! Every function here is pure: "now" is passed in, nothing is stored.

use super::{ReviewState, Reviewable};
use chrono::{DateTime, Days, TimeZone};
use std::fmt;

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 2.5;
pub const MAX_INTERVAL_DAYS: u32 = 365;

pub const MIN_QUALITY: i32 = 0;
pub const MAX_QUALITY: i32 = 5;
/// Lowest quality that counts as a successful recall.
pub const PASSING_QUALITY: i32 = 3;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Review state for a brand-new card: due immediately, never reviewed.
pub fn default_review_state<Tz: TimeZone>(now: &DateTime<Tz>) -> ReviewState {
    ReviewState {
        ease_factor: DEFAULT_EASE_FACTOR,
        interval: 0,
        repetitions: 0,
        due_date: now.timestamp_millis(),
        last_review: 0,
    }
}

/// Calculates the next review state according to the SM-2 algorithm.
/// quality: 0-5 (0 = complete blackout, 5 = perfect response); values outside
/// that range are saturated to the nearest bound.
pub fn calculate_next_review<Tz: TimeZone>(
    review_state: &ReviewState,
    quality: i32,
    now: &DateTime<Tz>,
) -> ReviewState {
    let quality = quality.clamp(MIN_QUALITY, MAX_QUALITY);

    let mut next = review_state.clone();
    next.last_review = now.timestamp_millis();

    if quality < PASSING_QUALITY {
        // Relearn from tomorrow; EF is left alone on failure
        next.repetitions = 0;
        next.interval = 1;
    } else {
        next.repetitions = review_state.repetitions.saturating_add(1);
        next.interval = match next.repetitions {
            1 => 1,
            2 => 6,
            // Grows with the EF from before this review
            _ => grow_interval(review_state.interval, review_state.ease_factor),
        };
        next.ease_factor = (review_state.ease_factor + ease_delta(quality))
            .clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR);
    }

    next.interval = next.interval.min(MAX_INTERVAL_DAYS);
    next.due_date = add_calendar_days(now, next.interval);
    next
}

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
fn ease_delta(quality: i32) -> f64 {
    let miss = f64::from(MAX_QUALITY - quality);
    0.1 - miss * (0.08 + miss * 0.02)
}

fn grow_interval(interval: u32, ease_factor: f64) -> u32 {
    let grown = (f64::from(interval) * ease_factor).round();
    // Saturates; the result is capped to a year by the caller anyway
    grown.min(f64::from(u32::MAX)).max(0.0) as u32
}

/// Same wall-clock time `days` calendar days later, in epoch milliseconds.
///
/// A target time that occurs twice (clocks turned back) resolves to the
/// earlier instant. A target that does not exist (clocks turned forward) or
/// lies outside chrono's range falls back to `days` × 24h of absolute time.
fn add_calendar_days<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> i64 {
    let due = now
        .naive_local()
        .checked_add_days(Days::new(u64::from(days)))
        .and_then(|local| now.timezone().from_local_datetime(&local).earliest());
    match due {
        Some(due) => due.timestamp_millis(),
        None => {
            tracing::warn!(
                days,
                "calendar day addition not representable, using absolute days"
            );
            now.timestamp_millis()
                .saturating_add(i64::from(days) * MILLIS_PER_DAY)
        }
    }
}

/// True once the scheduled review time has arrived.
pub fn is_due<Tz: TimeZone>(review_state: &ReviewState, now: &DateTime<Tz>) -> bool {
    now.timestamp_millis() >= review_state.due_date
}

/// Cards that are due, in their original order.
pub fn due_cards<T: Reviewable + Clone, Tz: TimeZone>(cards: &[T], now: &DateTime<Tz>) -> Vec<T> {
    cards
        .iter()
        .filter(|card| is_due(card.review_state(), now))
        .cloned()
        .collect()
}

/// Cards ordered by due date, earliest first. Ties keep their input order.
pub fn sort_by_due_date<T: Reviewable + Clone>(cards: &[T]) -> Vec<T> {
    let mut sorted = cards.to_vec();
    sorted.sort_by_key(|card| card.review_state().due_date);
    sorted
}

/// Due cards ordered for study.
pub fn due_queue<T: Reviewable + Clone, Tz: TimeZone>(cards: &[T], now: &DateTime<Tz>) -> Vec<T> {
    sort_by_due_date(&due_cards(cards, now))
}

/// Whole days until the card is due, rounded up; 0 if it is already due.
pub fn days_until_review<Tz: TimeZone>(review_state: &ReviewState, now: &DateTime<Tz>) -> u32 {
    let remaining = review_state
        .due_date
        .saturating_sub(now.timestamp_millis());
    if remaining <= 0 {
        return 0;
    }
    let days = remaining.div_euclid(MILLIS_PER_DAY) + i64::from(remaining % MILLIS_PER_DAY != 0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Coarse description of when a card comes up next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DueLabel {
    Today,
    Tomorrow,
    InDays(u32),
}

impl DueLabel {
    pub fn from_days(days: u32) -> Self {
        match days {
            0 => DueLabel::Today,
            1 => DueLabel::Tomorrow,
            n => DueLabel::InDays(n),
        }
    }
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueLabel::Today => write!(f, "due today"),
            DueLabel::Tomorrow => write!(f, "due tomorrow"),
            DueLabel::InDays(n) => write!(f, "due in {} days", n),
        }
    }
}

pub fn format_due_date<Tz: TimeZone>(review_state: &ReviewState, now: &DateTime<Tz>) -> DueLabel {
    DueLabel::from_days(days_until_review(review_state, now))
}
