//! Card catalog and the legacy semicolon-delimited import format.
//!
//! Row kinds:
//!
//! ```text
//! kartya;name;damage;health;type
//! vezer;name;damage;health;type[;sebzes|eletero]
//! gyujtemeny;name[;damage;health]
//! pakli;name
//! kazamata;egyszeru|kis|nagy;name;card1,card2,...[;boss][;sebzes|eletero]
//! ```
//!
//! `type` is one of `tuz`, `viz`, `fold`, `levego`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::game::cards_types::{BossProficiency, CardAttribute, CardTemplate};
use crate::game::collection::Collection;
use crate::game::dungeon::{DungeonTemplate, DungeonType};
use crate::game::element::ElementType;
use crate::game::reward::Reward;
use crate::{AppError, AppResult};

static ELEMENT_CODES: Lazy<HashMap<&'static str, ElementType>> = Lazy::new(|| {
    HashMap::from([
        ("tuz", ElementType::Fire),
        ("viz", ElementType::Water),
        ("fold", ElementType::Earth),
        ("levego", ElementType::Air),
        ("fire", ElementType::Fire),
        ("water", ElementType::Water),
        ("earth", ElementType::Earth),
        ("air", ElementType::Air),
        ("useless", ElementType::Useless),
    ])
});

pub fn parse_element(code: &str) -> Option<ElementType> {
    ELEMENT_CODES.get(code.trim().to_lowercase().as_str()).copied()
}

/// Registry of base cards and promoted bosses, both in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    cards: Vec<CardTemplate>,
    bosses: Vec<CardTemplate>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_card(&mut self, template: CardTemplate) -> AppResult<()> {
        if template.is_boss() {
            return self.add_boss(template);
        }
        if let Some(existing) = self.card(template.name()) {
            if *existing == template {
                return Ok(());
            }
            return Err(AppError::InvalidCard {
                card_name: template.name().to_string(),
                reason: "Card is already defined with different stats".to_string(),
            });
        }
        self.cards.push(template);
        Ok(())
    }

    pub fn add_boss(&mut self, template: CardTemplate) -> AppResult<()> {
        if !template.is_boss() {
            return Err(AppError::InvalidCard {
                card_name: template.name().to_string(),
                reason: "Card has not been promoted to a boss".to_string(),
            });
        }
        if self.boss(template.display_name()).is_some() {
            return Err(AppError::InvalidCard {
                card_name: template.display_name().to_string(),
                reason: "Boss is already defined".to_string(),
            });
        }
        self.bosses.push(template);
        Ok(())
    }

    pub fn card(&self, name: &str) -> Option<&CardTemplate> {
        self.cards.iter().find(|card| card.name() == name)
    }

    pub fn boss(&self, boss_name: &str) -> Option<&CardTemplate> {
        self.bosses
            .iter()
            .find(|boss| boss.display_name() == boss_name)
    }

    pub fn require_card(&self, name: &str) -> AppResult<&CardTemplate> {
        self.card(name).ok_or_else(|| AppError::UnknownCard {
            card_name: name.to_string(),
        })
    }

    pub fn require_boss(&self, boss_name: &str) -> AppResult<&CardTemplate> {
        self.boss(boss_name).ok_or_else(|| AppError::UnknownBoss {
            boss_name: boss_name.to_string(),
        })
    }

    pub fn cards(&self) -> &[CardTemplate] {
        &self.cards
    }

    pub fn bosses(&self) -> &[CardTemplate] {
        &self.bosses
    }

    /// Resolves names against the catalog into a collection, preserving order.
    pub fn collection_of(&self, names: &[String]) -> AppResult<Collection> {
        let mut collection = Collection::new();
        for name in names {
            collection.add(self.require_card(name)?.clone());
        }
        Ok(collection)
    }
}

/// Everything read from one legacy catalog file.
#[derive(Debug, Clone, Default)]
pub struct LegacyImport {
    pub catalog: Catalog,
    pub owned: Vec<CardTemplate>,
    pub deck: Vec<String>,
    pub dungeons: Vec<DungeonTemplate>,
}

struct PendingOwned {
    name: String,
    stats: Option<(u32, u32)>,
}

struct PendingDungeon {
    line: usize,
    dungeon_type: DungeonType,
    name: String,
    cards: Vec<String>,
    boss: Option<String>,
    reward: Option<CardAttribute>,
}

pub fn parse_legacy(text: &str) -> AppResult<LegacyImport> {
    let mut catalog = Catalog::new();
    let mut owned = Vec::new();
    let mut deck = Vec::new();
    let mut dungeons = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let row = raw.trim();
        if row.is_empty() || row.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = row.split(';').map(str::trim).collect();

        match fields[0] {
            "kartya" => {
                expect_fields(&fields, 5, 5, line)?;
                let template = parse_card(&fields, line)?;
                catalog.add_card(template)?;
            }
            "vezer" => {
                expect_fields(&fields, 5, 6, line)?;
                let base = parse_card(&fields, line)?;
                let proficiency = match fields.get(5) {
                    Some(code) => parse_proficiency(code, line)?,
                    None => BossProficiency::Damage,
                };
                let boss = base.promote(base.name(), proficiency)?;
                catalog.add_card(base)?;
                catalog.add_boss(boss)?;
            }
            "gyujtemeny" => {
                if fields.len() != 2 && fields.len() != 4 {
                    return Err(malformed(line, "expected gyujtemeny;name[;damage;health]"));
                }
                let stats = if fields.len() == 4 {
                    Some((parse_number(fields[2], line)?, parse_number(fields[3], line)?))
                } else {
                    None
                };
                owned.push(PendingOwned {
                    name: fields[1].to_string(),
                    stats,
                });
            }
            "pakli" => {
                expect_fields(&fields, 2, 2, line)?;
                deck.push(fields[1].to_string());
            }
            "kazamata" => {
                dungeons.push(parse_dungeon_row(&fields, line)?);
            }
            other => {
                return Err(malformed(line, &format!("unknown row kind '{}'", other)));
            }
        }
    }

    let owned = owned
        .into_iter()
        .map(|pending| resolve_owned(&catalog, pending))
        .collect::<AppResult<Vec<_>>>()?;
    let dungeons = dungeons
        .into_iter()
        .map(|pending| resolve_dungeon(&catalog, pending))
        .collect::<AppResult<Vec<_>>>()?;

    tracing::info!(
        "🃏 Imported {} cards, {} bosses, {} dungeons",
        catalog.cards().len(),
        catalog.bosses().len(),
        dungeons.len()
    );

    Ok(LegacyImport {
        catalog,
        owned,
        deck,
        dungeons,
    })
}

fn parse_card(fields: &[&str], line: usize) -> AppResult<CardTemplate> {
    let damage = parse_number(fields[2], line)?;
    let health = parse_number(fields[3], line)?;
    let element = parse_element(fields[4])
        .ok_or_else(|| malformed(line, &format!("unknown element '{}'", fields[4])))?;
    CardTemplate::new(fields[1], damage, health, element)
}

fn parse_dungeon_row(fields: &[&str], line: usize) -> AppResult<PendingDungeon> {
    if fields.len() < 4 {
        return Err(malformed(line, "expected kazamata;type;name;cards"));
    }
    let dungeon_type = match fields[1] {
        "egyszeru" | "small" => DungeonType::Small,
        "kis" | "medium" => DungeonType::Medium,
        "nagy" | "big" => DungeonType::Big,
        other => return Err(malformed(line, &format!("unknown dungeon type '{}'", other))),
    };
    let cards = fields[3]
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    let mut rest = fields[4..].iter();
    let boss = if dungeon_type.has_boss() {
        Some(
            rest.next()
                .ok_or_else(|| malformed(line, "dungeon is missing its boss"))?
                .to_string(),
        )
    } else {
        None
    };
    let reward = match rest.next() {
        Some(code) => Some(parse_attribute(code, line)?),
        None => None,
    };
    if rest.next().is_some() {
        return Err(malformed(line, "too many fields"));
    }

    Ok(PendingDungeon {
        line,
        dungeon_type,
        name: fields[2].to_string(),
        cards,
        boss,
        reward,
    })
}

fn resolve_owned(catalog: &Catalog, pending: PendingOwned) -> AppResult<CardTemplate> {
    let template = catalog.require_card(&pending.name)?;
    match pending.stats {
        Some((damage, health)) => template.with_delta(
            i64::from(damage) - i64::from(template.base_damage()),
            i64::from(health) - i64::from(template.base_health()),
        ),
        None => Ok(template.clone()),
    }
}

fn resolve_dungeon(catalog: &Catalog, pending: PendingDungeon) -> AppResult<DungeonTemplate> {
    let enemies = catalog.collection_of(&pending.cards)?;
    let boss = match &pending.boss {
        Some(name) => Some(catalog.require_boss(name)?.clone()),
        None => None,
    };
    let reward = match (pending.dungeon_type, pending.reward) {
        (DungeonType::Big, None) => Reward::Card(catalog.cards().to_vec()),
        (DungeonType::Big, Some(_)) => {
            return Err(malformed(pending.line, "big dungeons grant cards, not attributes"))
        }
        (_, Some(attribute)) => Reward::Attribute(attribute),
        (_, None) => return Err(malformed(pending.line, "dungeon is missing its reward")),
    };
    DungeonTemplate::new(pending.dungeon_type, pending.name, enemies, boss, reward)
}

fn parse_proficiency(code: &str, line: usize) -> AppResult<BossProficiency> {
    match parse_attribute(code, line)? {
        CardAttribute::Damage => Ok(BossProficiency::Damage),
        CardAttribute::Health => Ok(BossProficiency::Health),
    }
}

fn parse_attribute(code: &str, line: usize) -> AppResult<CardAttribute> {
    match code {
        "sebzes" | "damage" => Ok(CardAttribute::Damage),
        "eletero" | "health" => Ok(CardAttribute::Health),
        other => Err(malformed(line, &format!("unknown attribute '{}'", other))),
    }
}

fn parse_number(field: &str, line: usize) -> AppResult<u32> {
    field
        .parse()
        .map_err(|_| malformed(line, &format!("'{}' is not a number", field)))
}

fn expect_fields(fields: &[&str], min: usize, max: usize, line: usize) -> AppResult<()> {
    if fields.len() < min || fields.len() > max {
        return Err(malformed(
            line,
            &format!("expected {} fields, found {}", min, fields.len()),
        ));
    }
    Ok(())
}

fn malformed(line: usize, reason: &str) -> AppError {
    AppError::MalformedCatalogRow {
        line,
        reason: reason.to_string(),
    }
}
