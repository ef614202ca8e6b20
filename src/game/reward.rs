use serde::{Deserialize, Serialize};

use crate::game::cards_types::{CardAttribute, CardTemplate};
use crate::game::collection::Collection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reward {
    /// Upgrades the card that finished the fight.
    Attribute(CardAttribute),
    /// Grants the first listed card the player does not own yet.
    Card(Vec<CardTemplate>),
}

/// Persisted form of a reward; card rewards are stored by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RewardExport {
    Attribute { attribute: CardAttribute },
    Card { cards: Vec<String> },
}

impl Reward {
    pub fn grant(&self, player_collection: &mut Collection, last_played: &CardTemplate) -> String {
        match self {
            Reward::Attribute(attribute) => {
                match player_collection.upgrade(last_played.name(), *attribute) {
                    Some(upgraded) => match attribute {
                        CardAttribute::Damage => format!(
                            "{} damage +{} ({})",
                            upgraded.name(),
                            CardAttribute::DAMAGE_STEP,
                            upgraded.damage()
                        ),
                        CardAttribute::Health => format!(
                            "{} health +{} ({})",
                            upgraded.name(),
                            CardAttribute::HEALTH_STEP,
                            upgraded.health()
                        ),
                    },
                    None => format!("{} is not in the collection, no upgrade", last_played.name()),
                }
            }
            Reward::Card(cards) => {
                let unowned = cards
                    .iter()
                    .find(|card| !player_collection.contains(card.name()));
                match unowned {
                    Some(card) => {
                        player_collection.add(card.clone());
                        format!("New card: {}", card.name())
                    }
                    None => "Every card is already owned".to_string(),
                }
            }
        }
    }

    pub fn export(&self) -> RewardExport {
        match self {
            Reward::Attribute(attribute) => RewardExport::Attribute {
                attribute: *attribute,
            },
            Reward::Card(cards) => RewardExport::Card {
                cards: cards.iter().map(|card| card.name().to_string()).collect(),
            },
        }
    }
}
