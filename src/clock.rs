//! Time sources for the scheduler.
//!
//! Everything that needs "now" asks a [`Clock`] instead of reading the system
//! time directly, so a study session can run against a simulated date.

use chrono::{DateTime, Days, Local, TimeZone, Utc};
use std::sync::Mutex;

/// A source of the current instant.
pub trait Clock {
    /// Time zone used for calendar-day arithmetic.
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

impl<C: Clock + ?Sized> Clock for &C {
    type Tz = C::Tz;

    fn now(&self) -> DateTime<Self::Tz> {
        (**self).now()
    }
}

/// Wall-clock time in the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock<Tz: TimeZone = Utc> {
    now: Mutex<DateTime<Tz>>,
}

impl<Tz: TimeZone> FixedClock<Tz> {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Tz>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Moves the clock forward by whole calendar days.
    ///
    /// Returns false and leaves the clock where it was if the target date
    /// is out of range.
    pub fn advance_days(&self, days: u64) -> bool {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        match now.clone().checked_add_days(Days::new(days)) {
            Some(next) => {
                *now = next;
                true
            }
            None => false,
        }
    }
}

impl FixedClock<Utc> {
    /// Fixed clock at the given epoch-millisecond instant (UTC), or `None`
    /// if chrono cannot represent it.
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self::new)
    }
}

impl<Tz: TimeZone> Clock for FixedClock<Tz> {
    type Tz = Tz;

    fn now(&self) -> DateTime<Tz> {
        self.now.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
