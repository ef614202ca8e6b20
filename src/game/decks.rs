use std::collections::HashSet;

use crate::game::cards_types::Card;
use crate::game::collection::Collection;
use crate::{AppError, AppResult};

/// Cards compiled for one fight, consumed front to back.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Compiles a player deck. Every name must be owned, unique, and the
    /// count may not exceed the collection's usable maximum.
    pub fn from_collection(collection: &Collection, names: &[String]) -> AppResult<Self> {
        if names.is_empty() {
            return Err(AppError::EmptyDeck);
        }
        if names.len() > collection.max_usable() {
            return Err(AppError::DeckTooLarge {
                requested: names.len(),
                max_usable: collection.max_usable(),
            });
        }

        let mut seen = HashSet::new();
        let mut cards = Vec::with_capacity(names.len());
        for name in names {
            if !seen.insert(name.as_str()) {
                return Err(AppError::DuplicateCard {
                    card_name: name.clone(),
                });
            }
            let template = collection
                .get(name)
                .ok_or_else(|| AppError::CardNotInCollection {
                    card_name: name.clone(),
                })?;
            cards.push(Card::new(template));
        }

        Ok(Self { cards })
    }

    /// Enemy wave: every card of the collection in order, no size cap.
    pub fn from_wave(collection: &Collection) -> Self {
        Self {
            cards: collection.iter().map(Card::new).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card_names(&self) -> Vec<String> {
        self.cards.iter().map(|card| card.name().to_string()).collect()
    }
}
