//! Storage seam between study sessions and whatever keeps the cards.

use super::Result;
use crate::models::{Deck, Flashcard};

/// Key-value persistence for decks and cards.
///
/// Writes always replace the whole record; there are no partial updates.
/// Rating a card is a read-modify-write, so callers must not rate the same
/// card id from two places at once.
pub trait CardStore {
    fn put_deck(&self, deck: &Deck) -> Result<()>;

    fn get_deck(&self, id: &str) -> Result<Option<Deck>>;

    /// All decks, oldest first.
    fn list_decks(&self) -> Result<Vec<Deck>>;

    /// Removes a deck together with its cards.
    fn delete_deck(&self, id: &str) -> Result<()>;

    /// Inserts the card or replaces the stored copy.
    fn put_card(&self, card: &Flashcard) -> Result<()>;

    fn get_card(&self, id: &str) -> Result<Option<Flashcard>>;

    fn delete_card(&self, id: &str) -> Result<()>;

    /// Cards of a deck in creation order.
    fn cards_by_deck(&self, deck_id: &str) -> Result<Vec<Flashcard>>;

    /// Cards of a deck with `due_date <= now_millis`, earliest due first.
    fn cards_due_by(&self, deck_id: &str, now_millis: i64) -> Result<Vec<Flashcard>>;
}

impl<S: CardStore + ?Sized> CardStore for &S {
    fn put_deck(&self, deck: &Deck) -> Result<()> {
        (**self).put_deck(deck)
    }

    fn get_deck(&self, id: &str) -> Result<Option<Deck>> {
        (**self).get_deck(id)
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        (**self).list_decks()
    }

    fn delete_deck(&self, id: &str) -> Result<()> {
        (**self).delete_deck(id)
    }

    fn put_card(&self, card: &Flashcard) -> Result<()> {
        (**self).put_card(card)
    }

    fn get_card(&self, id: &str) -> Result<Option<Flashcard>> {
        (**self).get_card(id)
    }

    fn delete_card(&self, id: &str) -> Result<()> {
        (**self).delete_card(id)
    }

    fn cards_by_deck(&self, deck_id: &str) -> Result<Vec<Flashcard>> {
        (**self).cards_by_deck(deck_id)
    }

    fn cards_due_by(&self, deck_id: &str, now_millis: i64) -> Result<Vec<Flashcard>> {
        (**self).cards_due_by(deck_id, now_millis)
    }
}
