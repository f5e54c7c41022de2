//! SQLite card store
//!
//! Handles database initialization and CRUD operations for decks and
//! flashcards. Each review-state field lives in its own typed column so the
//! state round-trips exactly.

use super::{CardStore, Result, StoreError};
use crate::models::{Deck, Flashcard, ReviewState};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Where the SQLite database lives.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db.sqlite3"),
        }
    }
}

impl DatabaseConfig {
    /// Loads the config from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

const CARD_COLUMNS: &str = "id, deck_id, front, back, ease_factor, interval_days, repetitions, due_date, last_review, created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file named in the config.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let conn = Connection::open(&config.path)?;
        tracing::info!(path = %config.path.display(), "opened card database");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Creates the tables and indexes if they are missing.
    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS decks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS flashcards (
                id TEXT PRIMARY KEY,
                deck_id TEXT NOT NULL,
                front TEXT NOT NULL,
                back TEXT NOT NULL,
                ease_factor REAL NOT NULL DEFAULT 2.5,
                interval_days INTEGER NOT NULL DEFAULT 0,
                repetitions INTEGER NOT NULL DEFAULT 0,
                due_date INTEGER NOT NULL,
                last_review INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_flashcards_deck ON flashcards(deck_id);
            CREATE INDEX IF NOT EXISTS idx_flashcards_due ON flashcards(due_date);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn query_cards(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Flashcard>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let cards = stmt
            .query_map(params, card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Flashcard> {
    Ok(Flashcard {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        review_state: ReviewState {
            ease_factor: row.get(4)?,
            interval: row.get(5)?,
            repetitions: row.get(6)?,
            due_date: row.get(7)?,
            last_review: row.get(8)?,
        },
        created_at: row.get(9)?,
    })
}

fn deck_from_row(row: &Row<'_>) -> rusqlite::Result<Deck> {
    Ok(Deck {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl CardStore for SqliteStore {
    fn put_deck(&self, deck: &Deck) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO decks (id, title, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                deck.id,
                deck.title,
                deck.description,
                deck.created_at,
                deck.updated_at
            ],
        )?;
        Ok(())
    }

    fn get_deck(&self, id: &str) -> Result<Option<Deck>> {
        let deck = self
            .conn()?
            .query_row(
                "SELECT id, title, description, created_at, updated_at FROM decks WHERE id = ?1",
                params![id],
                deck_from_row,
            )
            .optional()?;
        Ok(deck)
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, created_at, updated_at FROM decks
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let decks = stmt
            .query_map([], deck_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(decks)
    }

    fn delete_deck(&self, id: &str) -> Result<()> {
        let removed = self
            .conn()?
            .execute("DELETE FROM decks WHERE id = ?1", params![id])?;
        tracing::debug!(deck_id = id, removed, "deleted deck");
        Ok(())
    }

    fn put_card(&self, card: &Flashcard) -> Result<()> {
        let conn = self.conn()?;

        let deck_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM decks WHERE id = ?1)",
            params![card.deck_id],
            |row| row.get(0),
        )?;
        if !deck_exists {
            return Err(StoreError::NotFound(format!("deck {}", card.deck_id)));
        }

        let state = &card.review_state;
        conn.execute(
            "INSERT INTO flashcards (id, deck_id, front, back, ease_factor, interval_days, repetitions, due_date, last_review, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                deck_id = excluded.deck_id,
                front = excluded.front,
                back = excluded.back,
                ease_factor = excluded.ease_factor,
                interval_days = excluded.interval_days,
                repetitions = excluded.repetitions,
                due_date = excluded.due_date,
                last_review = excluded.last_review,
                created_at = excluded.created_at",
            params![
                card.id,
                card.deck_id,
                card.front,
                card.back,
                state.ease_factor,
                state.interval,
                state.repetitions,
                state.due_date,
                state.last_review,
                card.created_at
            ],
        )?;
        Ok(())
    }

    fn get_card(&self, id: &str) -> Result<Option<Flashcard>> {
        let card = self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM flashcards WHERE id = ?1", CARD_COLUMNS),
                params![id],
                card_from_row,
            )
            .optional()?;
        Ok(card)
    }

    fn delete_card(&self, id: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM flashcards WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn cards_by_deck(&self, deck_id: &str) -> Result<Vec<Flashcard>> {
        self.query_cards(
            &format!(
                "SELECT {} FROM flashcards WHERE deck_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
                CARD_COLUMNS
            ),
            params![deck_id],
        )
    }

    fn cards_due_by(&self, deck_id: &str, now_millis: i64) -> Result<Vec<Flashcard>> {
        self.query_cards(
            &format!(
                "SELECT {} FROM flashcards WHERE deck_id = ?1 AND due_date <= ?2
                 ORDER BY due_date ASC, created_at ASC, rowid ASC",
                CARD_COLUMNS
            ),
            params![deck_id, now_millis],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sm2;
    use chrono::{TimeZone, Utc};

    fn setup() -> (SqliteStore, Deck) {
        let store = SqliteStore::open_in_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap();
        let deck = Deck::new("Polish Vocabulary", "basics", &now);
        store.put_deck(&deck).unwrap();
        (store, deck)
    }

    fn card_at(deck: &Deck, front: &str, created_at: i64, due_date: i64) -> Flashcard {
        let now = Utc.timestamp_millis_opt(created_at).unwrap();
        let mut card = Flashcard::new(deck.id.clone(), front, "-", &now);
        card.review_state.due_date = due_date;
        card
    }

    #[test]
    fn test_deck_roundtrip() {
        let (store, deck) = setup();
        assert_eq!(store.get_deck(&deck.id).unwrap(), Some(deck.clone()));
        assert_eq!(store.list_decks().unwrap(), vec![deck]);
        assert_eq!(store.get_deck("missing").unwrap(), None);
    }

    #[test]
    fn test_review_state_roundtrip_full_precision() {
        let (store, deck) = setup();
        let mut card = card_at(&deck, "cześć", 1_000, 2_000);
        card.review_state = ReviewState {
            ease_factor: 2.5 - 0.14 - 0.14 + 0.1,
            interval: 238,
            repetitions: 6,
            due_date: 1_712_345_678_901,
            last_review: 1_711_111_111_111,
        };
        store.put_card(&card).unwrap();

        let loaded = store.get_card(&card.id).unwrap().unwrap();
        assert_eq!(loaded, card);
        assert_eq!(
            loaded.review_state.ease_factor.to_bits(),
            card.review_state.ease_factor.to_bits()
        );
    }

    #[test]
    fn test_put_card_replaces_whole_record() {
        let (store, deck) = setup();
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap();
        let card = Flashcard::new(deck.id.clone(), "dziękuję", "thank you", &now);
        store.put_card(&card).unwrap();

        let reviewed = card.with_review_state(sm2::calculate_next_review(&card.review_state, 5, &now));
        store.put_card(&reviewed).unwrap();

        assert_eq!(store.get_card(&card.id).unwrap(), Some(reviewed));
        assert_eq!(store.cards_by_deck(&deck.id).unwrap().len(), 1);
    }

    #[test]
    fn test_put_card_requires_deck() {
        let (store, _) = setup();
        let card = Flashcard::new("no-such-deck", "proszę", "please", &Utc::now());
        let err = store.put_card(&card).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_cards_by_deck_in_creation_order() {
        let (store, deck) = setup();
        let other = Deck::new("Other", "", &Utc::now());
        store.put_deck(&other).unwrap();

        store.put_card(&card_at(&deck, "b", 20, 0)).unwrap();
        store.put_card(&card_at(&deck, "a", 10, 0)).unwrap();
        store.put_card(&card_at(&other, "x", 5, 0)).unwrap();

        let fronts: Vec<_> = store
            .cards_by_deck(&deck.id)
            .unwrap()
            .into_iter()
            .map(|c| c.front)
            .collect();
        assert_eq!(fronts, vec!["a", "b"]);
    }

    #[test]
    fn test_cards_due_by() {
        let (store, deck) = setup();
        store.put_card(&card_at(&deck, "late", 1, 300)).unwrap();
        store.put_card(&card_at(&deck, "future", 2, 900)).unwrap();
        store.put_card(&card_at(&deck, "early", 3, 100)).unwrap();
        store.put_card(&card_at(&deck, "tie", 4, 300)).unwrap();

        let fronts: Vec<_> = store
            .cards_due_by(&deck.id, 500)
            .unwrap()
            .into_iter()
            .map(|c| c.front)
            .collect();
        assert_eq!(fronts, vec!["early", "late", "tie"]);
    }

    #[test]
    fn test_delete_deck_cascades() {
        let (store, deck) = setup();
        let card = card_at(&deck, "a", 1, 1);
        store.put_card(&card).unwrap();

        store.delete_deck(&deck.id).unwrap();
        assert_eq!(store.get_deck(&deck.id).unwrap(), None);
        assert_eq!(store.get_card(&card.id).unwrap(), None);
    }

    #[test]
    fn test_delete_card() {
        let (store, deck) = setup();
        let card = card_at(&deck, "a", 1, 1);
        store.put_card(&card).unwrap();
        store.delete_card(&card.id).unwrap();
        assert_eq!(store.get_card(&card.id).unwrap(), None);
        // deleting twice is fine
        store.delete_card(&card.id).unwrap();
    }

    #[test]
    fn test_config_from_json_file() {
        let test_file = "test_db_config.json";
        fs::write(test_file, r#"{ "path": "decks.sqlite3" }"#).unwrap();

        let config = DatabaseConfig::from_json_file(test_file).unwrap();
        assert_eq!(config.path, PathBuf::from("decks.sqlite3"));

        let _ = fs::remove_file(test_file);
    }

    #[test]
    fn test_config_defaults_and_errors() {
        let test_file = "test_db_config_empty.json";
        fs::write(test_file, "{}").unwrap();
        assert_eq!(
            DatabaseConfig::from_json_file(test_file).unwrap(),
            DatabaseConfig::default()
        );
        let _ = fs::remove_file(test_file);

        let test_file = "test_db_config_invalid.json";
        fs::write(test_file, "{ this is not valid json }").unwrap();
        assert!(matches!(
            DatabaseConfig::from_json_file(test_file),
            Err(StoreError::Config(_))
        ));
        let _ = fs::remove_file(test_file);

        assert!(matches!(
            DatabaseConfig::from_json_file("nonexistent_config_xyz123.json"),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn test_open_file_database() {
        let path = PathBuf::from("test_open_file.sqlite3");
        let config = DatabaseConfig { path: path.clone() };
        {
            let store = SqliteStore::open(&config).unwrap();
            let deck = Deck::new("Persisted", "", &Utc::now());
            store.put_deck(&deck).unwrap();
        }
        let reopened = SqliteStore::open(&config).unwrap();
        assert_eq!(reopened.list_decks().unwrap().len(), 1);

        drop(reopened);
        let _ = fs::remove_file(path);
    }
}
