use serde::{Deserialize, Serialize};

use crate::game::card_loader::Catalog;
use crate::game::cards_types::{BossProficiency, CardTemplate};
use crate::game::dungeon::{DungeonTemplate, DungeonType};
use crate::game::element::ElementType;
use crate::game::reward::{Reward, RewardExport};
use crate::game::world::{NamedCollection, World};
use crate::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    pub damage: u32,
    pub health: u32,
    #[serde(rename = "type")]
    pub element: ElementType,
}

/// Bosses keep only their proficiency; boosted stats are re-derived on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossRecord {
    pub boss_name: String,
    pub proficiency: BossProficiency,
    pub original_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    pub collection_name: String,
    pub cards: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSave {
    pub template_name: String,
    pub cards: Vec<CardRecord>,
    pub bosses: Vec<BossRecord>,
    pub collections: Vec<CollectionRecord>,
    pub starter_deck: Vec<String>,
    pub world_id: u32,
}

/// One dungeon, stored in its own file next to the world file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonSave {
    pub name: String,
    #[serde(rename = "type")]
    pub dungeon_type: DungeonType,
    pub cards: Vec<String>,
    pub boss: Option<String>,
    pub reward: RewardExport,
}

impl WorldSave {
    pub fn from_world(world: &World) -> Self {
        let catalog = world.catalog();
        Self {
            template_name: world.template_name().to_string(),
            cards: catalog
                .cards()
                .iter()
                .map(|card| CardRecord {
                    name: card.name().to_string(),
                    damage: card.base_damage(),
                    health: card.base_health(),
                    element: card.element(),
                })
                .collect(),
            bosses: catalog
                .bosses()
                .iter()
                .filter_map(|boss| {
                    boss.boss().map(|traits| BossRecord {
                        boss_name: traits.name.clone(),
                        proficiency: traits.proficiency,
                        original_name: boss.name().to_string(),
                    })
                })
                .collect(),
            collections: world
                .collections()
                .iter()
                .map(|collection| CollectionRecord {
                    collection_name: collection.name.clone(),
                    cards: collection.cards.clone(),
                })
                .collect(),
            starter_deck: world.starter_deck().to_vec(),
            world_id: world.id(),
        }
    }

    /// Rebuilds the world without dungeons; those are attached one file at a time.
    pub fn to_world(&self) -> AppResult<World> {
        let mut catalog = Catalog::new();
        for record in &self.cards {
            catalog.add_card(CardTemplate::new(
                record.name.clone(),
                record.damage,
                record.health,
                record.element,
            )?)?;
        }
        for record in &self.bosses {
            let original = catalog.require_card(&record.original_name)?;
            let boss = original.promote(record.boss_name.clone(), record.proficiency)?;
            catalog.add_boss(boss)?;
        }

        let mut world = World::new(self.world_id, self.template_name.clone(), catalog);
        for record in &self.collections {
            world.add_collection(NamedCollection {
                name: record.collection_name.clone(),
                cards: record.cards.clone(),
            })?;
        }
        world.set_starter_deck(self.starter_deck.clone());
        Ok(world)
    }
}

impl DungeonSave {
    pub fn from_template(template: &DungeonTemplate) -> Self {
        Self {
            name: template.name().to_string(),
            dungeon_type: template.dungeon_type(),
            cards: template.enemies().names(),
            boss: template.boss().map(|boss| boss.display_name().to_string()),
            reward: template.reward().export(),
        }
    }

    pub fn to_template(&self, catalog: &Catalog) -> AppResult<DungeonTemplate> {
        let enemies = catalog.collection_of(&self.cards)?;
        let boss = match &self.boss {
            Some(name) => Some(catalog.require_boss(name)?.clone()),
            None => None,
        };
        let reward = match &self.reward {
            RewardExport::Attribute { attribute } => Reward::Attribute(*attribute),
            RewardExport::Card { cards } => Reward::Card(
                cards
                    .iter()
                    .map(|name| catalog.require_card(name).cloned())
                    .collect::<AppResult<Vec<_>>>()?,
            ),
        };
        DungeonTemplate::new(self.dungeon_type, self.name.clone(), enemies, boss, reward)
    }
}
