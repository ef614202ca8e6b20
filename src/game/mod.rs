pub mod card_loader;
pub mod cards_types;
pub mod collection;
pub mod decks;
pub mod dungeon;
pub mod element;
pub mod events;
pub mod fight;
pub mod reward;
pub mod world;
