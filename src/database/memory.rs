//! In-memory card store with the same ordering rules as the SQLite one.

use super::{CardStore, Result, StoreError};
use crate::models::{Deck, Flashcard};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    decks: HashMap<String, (u64, Deck)>,
    cards: HashMap<String, (u64, Flashcard)>,
    // insertion counter, kept across replacements like a SQLite rowid
    next_seq: u64,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn sorted_cards<F>(&self, keep: F) -> Result<Vec<(u64, Flashcard)>>
    where
        F: Fn(&Flashcard) -> bool,
    {
        let tables = self.tables()?;
        let mut cards: Vec<_> = tables
            .cards
            .values()
            .filter(|(_, card)| keep(card))
            .cloned()
            .collect();
        cards.sort_by_key(|(seq, card)| (card.created_at, *seq));
        Ok(cards)
    }
}

impl CardStore for MemoryStore {
    fn put_deck(&self, deck: &Deck) -> Result<()> {
        let mut tables = self.tables()?;
        let existing = tables.decks.get(&deck.id).map(|(seq, _)| *seq);
        let seq = match existing {
            Some(seq) => seq,
            None => tables.next_seq(),
        };
        tables.decks.insert(deck.id.clone(), (seq, deck.clone()));
        Ok(())
    }

    fn get_deck(&self, id: &str) -> Result<Option<Deck>> {
        Ok(self.tables()?.decks.get(id).map(|(_, deck)| deck.clone()))
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        let tables = self.tables()?;
        let mut decks: Vec<_> = tables.decks.values().cloned().collect();
        decks.sort_by_key(|(seq, deck)| (deck.created_at, *seq));
        Ok(decks.into_iter().map(|(_, deck)| deck).collect())
    }

    fn delete_deck(&self, id: &str) -> Result<()> {
        let mut tables = self.tables()?;
        if tables.decks.remove(id).is_some() {
            tables.cards.retain(|_, (_, card)| card.deck_id != id);
        }
        Ok(())
    }

    fn put_card(&self, card: &Flashcard) -> Result<()> {
        let mut tables = self.tables()?;
        if !tables.decks.contains_key(&card.deck_id) {
            return Err(StoreError::NotFound(format!("deck {}", card.deck_id)));
        }
        let existing = tables.cards.get(&card.id).map(|(seq, _)| *seq);
        let seq = match existing {
            Some(seq) => seq,
            None => tables.next_seq(),
        };
        tables.cards.insert(card.id.clone(), (seq, card.clone()));
        Ok(())
    }

    fn get_card(&self, id: &str) -> Result<Option<Flashcard>> {
        Ok(self.tables()?.cards.get(id).map(|(_, card)| card.clone()))
    }

    fn delete_card(&self, id: &str) -> Result<()> {
        self.tables()?.cards.remove(id);
        Ok(())
    }

    fn cards_by_deck(&self, deck_id: &str) -> Result<Vec<Flashcard>> {
        let cards = self.sorted_cards(|card| card.deck_id == deck_id)?;
        Ok(cards.into_iter().map(|(_, card)| card).collect())
    }

    fn cards_due_by(&self, deck_id: &str, now_millis: i64) -> Result<Vec<Flashcard>> {
        let mut cards = self.sorted_cards(|card| {
            card.deck_id == deck_id && card.review_state.due_date <= now_millis
        })?;
        // stable, so ties stay in creation order
        cards.sort_by_key(|(_, card)| card.review_state.due_date);
        Ok(cards.into_iter().map(|(_, card)| card).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn card_at(deck: &Deck, front: &str, created_at: i64, due_date: i64) -> Flashcard {
        let now = Utc.timestamp_millis_opt(created_at).unwrap();
        let mut card = Flashcard::new(deck.id.clone(), front, "-", &now);
        card.review_state.due_date = due_date;
        card
    }

    fn fronts(cards: Vec<Flashcard>) -> Vec<String> {
        cards.into_iter().map(|c| c.front).collect()
    }

    #[test]
    fn test_same_ordering_as_sqlite() {
        let store = MemoryStore::new();
        let deck = Deck::new("Deck", "", &Utc.timestamp_millis_opt(0).unwrap());
        store.put_deck(&deck).unwrap();

        store.put_card(&card_at(&deck, "late", 1, 300)).unwrap();
        store.put_card(&card_at(&deck, "future", 2, 900)).unwrap();
        store.put_card(&card_at(&deck, "early", 3, 100)).unwrap();
        store.put_card(&card_at(&deck, "tie", 4, 300)).unwrap();

        assert_eq!(
            fronts(store.cards_by_deck(&deck.id).unwrap()),
            vec!["late", "future", "early", "tie"]
        );
        assert_eq!(
            fronts(store.cards_due_by(&deck.id, 500).unwrap()),
            vec!["early", "late", "tie"]
        );
    }

    #[test]
    fn test_replace_keeps_position() {
        let store = MemoryStore::new();
        let deck = Deck::new("Deck", "", &Utc.timestamp_millis_opt(0).unwrap());
        store.put_deck(&deck).unwrap();

        let first = card_at(&deck, "first", 7, 0);
        let second = card_at(&deck, "second", 7, 0);
        store.put_card(&first).unwrap();
        store.put_card(&second).unwrap();

        let mut edited = first.clone();
        edited.back = "edited".to_string();
        store.put_card(&edited).unwrap();

        let cards = store.cards_by_deck(&deck.id).unwrap();
        assert_eq!(cards[0], edited);
        assert_eq!(cards[1], second);
    }

    #[test]
    fn test_missing_deck_and_cascade() {
        let store = MemoryStore::new();
        let orphan = Flashcard::new("nope", "a", "b", &Utc::now());
        assert!(matches!(store.put_card(&orphan), Err(StoreError::NotFound(_))));

        let deck = Deck::new("Deck", "", &Utc::now());
        store.put_deck(&deck).unwrap();
        let card = card_at(&deck, "a", 1, 1);
        store.put_card(&card).unwrap();

        store.delete_deck(&deck.id).unwrap();
        assert_eq!(store.get_card(&card.id).unwrap(), None);
        assert!(store.list_decks().unwrap().is_empty());
    }
}
