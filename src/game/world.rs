use crate::game::card_loader::{Catalog, LegacyImport};
use crate::game::collection::Collection;
use crate::game::dungeon::{Dungeon, DungeonTemplate};
use crate::{AppError, AppResult};

pub const STARTER_COLLECTION: &str = "starter";

/// A named list of catalog card names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCollection {
    pub name: String,
    pub cards: Vec<String>,
}

/// Immutable world definition: catalog, dungeon registry, starter inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    id: u32,
    template_name: String,
    catalog: Catalog,
    dungeons: Vec<DungeonTemplate>,
    collections: Vec<NamedCollection>,
    starter_deck: Vec<String>,
}

impl World {
    pub fn new(id: u32, template_name: impl Into<String>, catalog: Catalog) -> Self {
        Self {
            id,
            template_name: template_name.into(),
            catalog,
            dungeons: Vec::new(),
            collections: Vec::new(),
            starter_deck: Vec::new(),
        }
    }

    /// Builds a world from a legacy import; owned cards become the starter collection.
    pub fn from_legacy(id: u32, template_name: impl Into<String>, import: &LegacyImport) -> AppResult<Self> {
        let mut world = Self::new(id, template_name, import.catalog.clone());
        for dungeon in &import.dungeons {
            world.add_dungeon(dungeon.clone())?;
        }
        world.add_collection(NamedCollection {
            name: STARTER_COLLECTION.to_string(),
            cards: import.owned.iter().map(|card| card.name().to_string()).collect(),
        })?;
        world.set_starter_deck(import.deck.clone());
        Ok(world)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn add_dungeon(&mut self, dungeon: DungeonTemplate) -> AppResult<()> {
        if self.dungeon(dungeon.name()).is_some() {
            return Err(AppError::InvalidDungeon {
                dungeon_name: dungeon.name().to_string(),
                reason: "Dungeon is already registered".to_string(),
            });
        }
        for enemy in dungeon.enemies().iter() {
            self.catalog.require_card(enemy.name())?;
        }
        self.dungeons.push(dungeon);
        Ok(())
    }

    pub fn add_collection(&mut self, collection: NamedCollection) -> AppResult<()> {
        for name in &collection.cards {
            self.catalog.require_card(name)?;
        }
        self.collections.retain(|existing| existing.name != collection.name);
        self.collections.push(collection);
        Ok(())
    }

    pub fn set_starter_deck(&mut self, names: Vec<String>) {
        self.starter_deck = names;
    }

    pub fn dungeon(&self, name: &str) -> Option<&DungeonTemplate> {
        self.dungeons.iter().find(|dungeon| dungeon.name() == name)
    }

    pub fn dungeons(&self) -> &[DungeonTemplate] {
        &self.dungeons
    }

    pub fn collections(&self) -> &[NamedCollection] {
        &self.collections
    }

    pub fn starter_deck(&self) -> &[String] {
        &self.starter_deck
    }

    /// Creates a fresh encounter for the named dungeon.
    pub fn instantiate(&self, name: &str) -> AppResult<Dungeon> {
        self.dungeon(name)
            .map(Dungeon::new)
            .ok_or_else(|| AppError::UnknownDungeon {
                dungeon_name: name.to_string(),
            })
    }

    pub fn starter_collection(&self) -> AppResult<Collection> {
        match self
            .collections
            .iter()
            .find(|collection| collection.name == STARTER_COLLECTION)
        {
            Some(starter) => self.catalog.collection_of(&starter.cards),
            None => Ok(Collection::new()),
        }
    }
}
