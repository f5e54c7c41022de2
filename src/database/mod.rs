//! Persistence for decks and flashcards.
//!
//! The scheduler never touches storage; study sessions talk to a
//! [`CardStore`] passed in by the caller.

pub mod db;
pub mod memory;
pub mod store;

pub use db::{DatabaseConfig, SqliteStore};
pub use memory::MemoryStore;
pub use store::CardStore;

/// Errors reported by card stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Deck or card not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed configuration
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    /// A lock was poisoned by a panicking writer
    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

/// Store result type
pub type Result<T> = std::result::Result<T, StoreError>;
