use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::cards_types::{BossCard, CardTemplate};
use crate::game::collection::Collection;
use crate::game::decks::Deck;
use crate::game::reward::Reward;
use crate::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DungeonType {
    Small,
    Medium,
    Big,
}

impl DungeonType {
    pub fn has_boss(self) -> bool {
        !matches!(self, DungeonType::Small)
    }
}

impl fmt::Display for DungeonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DungeonType::Small => write!(f, "small"),
            DungeonType::Medium => write!(f, "medium"),
            DungeonType::Big => write!(f, "big"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonTemplate {
    dungeon_type: DungeonType,
    name: String,
    enemies: Collection,
    boss: Option<CardTemplate>,
    reward: Reward,
}

impl DungeonTemplate {
    pub fn new(
        dungeon_type: DungeonType,
        name: impl Into<String>,
        enemies: Collection,
        boss: Option<CardTemplate>,
        reward: Reward,
    ) -> AppResult<Self> {
        let name = name.into();
        let invalid = |reason: &str| AppError::InvalidDungeon {
            dungeon_name: name.clone(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("Dungeon name cannot be empty"));
        }
        if enemies.is_empty() {
            return Err(invalid("Wave must contain at least one card"));
        }
        match (&boss, dungeon_type.has_boss()) {
            (Some(_), false) => return Err(invalid("Small dungeons have no boss")),
            (None, true) => return Err(invalid("Dungeon requires a boss")),
            (Some(boss), true) if !boss.is_boss() => {
                return Err(invalid("Boss card has not been promoted"))
            }
            _ => {}
        }
        if matches!(reward, Reward::Card(_)) != matches!(dungeon_type, DungeonType::Big) {
            return Err(invalid("Only big dungeons grant new cards"));
        }

        Ok(Self {
            dungeon_type,
            name,
            enemies,
            boss,
            reward,
        })
    }

    pub fn dungeon_type(&self) -> DungeonType {
        self.dungeon_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enemies(&self) -> &Collection {
        &self.enemies
    }

    pub fn boss(&self) -> Option<&CardTemplate> {
        self.boss.as_ref()
    }

    pub fn reward(&self) -> &Reward {
        &self.reward
    }

    pub fn has_boss(&self) -> bool {
        self.boss.is_some()
    }
}

/// One instantiated encounter. Owns its own copy of the wave so fights never
/// touch the template, and keeps the boss alive across fights in this instance.
#[derive(Debug, Clone)]
pub struct Dungeon {
    template: DungeonTemplate,
    collection: Collection,
    boss: Option<BossCard>,
}

impl Dungeon {
    pub fn new(template: &DungeonTemplate) -> Self {
        Self {
            collection: template.enemies().clone(),
            boss: template.boss().and_then(BossCard::new),
            template: template.clone(),
        }
    }

    pub fn name(&self) -> &str {
        self.template.name()
    }

    pub fn dungeon_type(&self) -> DungeonType {
        self.template.dungeon_type()
    }

    pub fn template(&self) -> &DungeonTemplate {
        &self.template
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn wave_deck(&self) -> Deck {
        Deck::from_wave(&self.collection)
    }

    pub fn has_boss(&self) -> bool {
        self.boss.is_some()
    }

    pub fn boss(&self) -> Option<&BossCard> {
        self.boss.as_ref()
    }

    pub fn boss_mut(&mut self) -> Option<&mut BossCard> {
        self.boss.as_mut()
    }

    pub fn reward(&self) -> &Reward {
        self.template.reward()
    }
}
