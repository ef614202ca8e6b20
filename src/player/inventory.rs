use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::errors::validation::validate_difficulty;
use crate::game::card_loader::LegacyImport;
use crate::game::collection::Collection;
use crate::game::decks::Deck;
use crate::game::dungeon::Dungeon;
use crate::game::events::EventEmitter;
use crate::game::fight::{FightEngine, FightReport};
use crate::game::world::World;
use crate::persistence::{PlayerSave, UpgradedCard};
use crate::{AppError, AppResult};

/// A player's cards and deck selection for one world.
///
/// Starts uninitialized; `new_game`, `from_legacy` or `from_save` fill it in.
#[derive(Debug, Clone, Default)]
pub struct PlayerInventory {
    pub save_id: String,
    pub save_name: String,
    pub world_id: u32,
    pub difficulty: u8,
    collection: Option<Collection>,
    selected: Vec<String>,
}

impl fmt::Display for PlayerInventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Save: {} ({}), world: {}, cards: {}, deck: {:?}",
            self.save_name,
            self.save_id,
            self.world_id,
            self.collection.as_ref().map_or(0, Collection::len),
            self.selected
        )
    }
}

impl PlayerInventory {
    pub fn new_game(world: &World, save_name: &str, difficulty: u8) -> AppResult<Self> {
        validate_difficulty(difficulty)?;
        let mut inventory = Self {
            save_id: Uuid::new_v4().to_string(),
            save_name: save_name.to_string(),
            world_id: world.id(),
            difficulty,
            collection: Some(world.starter_collection()?),
            selected: Vec::new(),
        };
        if !world.starter_deck().is_empty() {
            inventory.select_cards(world.starter_deck().to_vec())?;
        }
        Ok(inventory)
    }

    /// Takes owned cards (with any stat overrides) and deck straight from a legacy file.
    pub fn from_legacy(world: &World, import: &LegacyImport, save_name: &str, difficulty: u8) -> AppResult<Self> {
        validate_difficulty(difficulty)?;
        let mut inventory = Self {
            save_id: Uuid::new_v4().to_string(),
            save_name: save_name.to_string(),
            world_id: world.id(),
            difficulty,
            collection: Some(Collection::from_templates(import.owned.iter().cloned())),
            selected: Vec::new(),
        };
        if !import.deck.is_empty() {
            inventory.select_cards(import.deck.clone())?;
        }
        Ok(inventory)
    }

    pub fn is_initialized(&self) -> bool {
        self.collection.is_some()
    }

    pub fn collection(&self) -> AppResult<&Collection> {
        self.collection
            .as_ref()
            .ok_or(AppError::InventoryNotInitialized)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn select_cards(&mut self, names: Vec<String>) -> AppResult<()> {
        Deck::from_collection(self.collection()?, &names)?;
        self.selected = names;
        Ok(())
    }

    pub fn compile_deck(&self) -> AppResult<Deck> {
        let collection = self.collection()?;
        if self.selected.is_empty() {
            return Err(AppError::DeckNotSelected);
        }
        Deck::from_collection(collection, &self.selected)
    }

    pub async fn fight(
        &mut self,
        world: &World,
        dungeon_name: &str,
        emitter: EventEmitter,
    ) -> AppResult<FightReport> {
        let mut dungeon = world.instantiate(dungeon_name)?;
        self.fight_in(&mut dungeon, emitter).await
    }

    /// Fights on a copy of the collection and keeps the rewarded copy only on a win.
    pub async fn fight_in(
        &mut self,
        dungeon: &mut Dungeon,
        emitter: EventEmitter,
    ) -> AppResult<FightReport> {
        let deck = self.compile_deck()?;
        let collection = self.collection()?.clone();

        let report = FightEngine::new(collection, deck, dungeon)
            .with_difficulty(self.difficulty)?
            .run(emitter)
            .await?;

        if let Some(rewarded) = &report.collection {
            self.collection = Some(rewarded.clone());
        }
        Ok(report)
    }

    pub fn to_save(&self, world: &World) -> AppResult<PlayerSave> {
        let collection = self.collection()?;
        let mut upgraded_cards = Vec::new();
        for card in collection.iter() {
            let original = world.catalog().require_card(card.name())?;
            let damage_diff = i64::from(card.base_damage()) - i64::from(original.base_damage());
            let health_diff = i64::from(card.base_health()) - i64::from(original.base_health());
            if damage_diff != 0 || health_diff != 0 {
                upgraded_cards.push(UpgradedCard {
                    card_name: card.name().to_string(),
                    health_diff,
                    damage_diff,
                });
            }
        }

        let save_timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();

        Ok(PlayerSave {
            unlocked_cards: collection.names(),
            selected_cards: self.selected.clone(),
            upgraded_cards,
            save_base: self.world_id,
            difficulty: self.difficulty,
            save_name: self.save_name.clone(),
            save_timestamp,
            save_id: self.save_id.clone(),
        })
    }

    pub fn from_save(save: &PlayerSave, world: &World) -> AppResult<Self> {
        validate_difficulty(save.difficulty)?;
        let mut collection = Collection::new();
        for name in &save.unlocked_cards {
            let original = world.catalog().require_card(name)?;
            let card = match save.upgraded_cards.iter().find(|up| &up.card_name == name) {
                Some(up) => original.with_delta(up.damage_diff, up.health_diff)?,
                None => original.clone(),
            };
            collection.add(card);
        }

        let mut inventory = Self {
            save_id: save.save_id.clone(),
            save_name: save.save_name.clone(),
            world_id: save.save_base,
            difficulty: save.difficulty,
            collection: Some(collection),
            selected: Vec::new(),
        };
        if !save.selected_cards.is_empty() {
            inventory.select_cards(save.selected_cards.clone())?;
        }
        Ok(inventory)
    }
}
