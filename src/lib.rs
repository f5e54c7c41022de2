pub mod clock;
pub mod database;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use database::{CardStore, DatabaseConfig, MemoryStore, SqliteStore, StoreError};
pub use models::{
    Deck, DueLabel, Feedback, Flashcard, Rating, RatingOutcome, ReviewScheduler, ReviewState,
    Reviewable, StudySession,
};
