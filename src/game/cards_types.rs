use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::errors::validation::{
    validate_card_name, validate_card_stats, MAX_DAMAGE, MAX_HEALTH,
};
use crate::game::element::ElementType;
use crate::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossProficiency {
    Damage,
    Health,
}

/// Stat targeted by an attribute reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardAttribute {
    Damage,
    Health,
}

impl CardAttribute {
    pub const DAMAGE_STEP: u32 = 1;
    pub const HEALTH_STEP: u32 = 2;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossTraits {
    pub name: String,
    pub proficiency: BossProficiency,
}

/// Immutable catalog entry. Changing a card means building a new template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    name: String,
    base_damage: u32,
    base_health: u32,
    element: ElementType,
    boss: Option<BossTraits>,
}

impl CardTemplate {
    pub fn new(
        name: impl Into<String>,
        base_damage: u32,
        base_health: u32,
        element: ElementType,
    ) -> AppResult<Self> {
        let name = name.into();
        validate_card_name(&name)?;
        validate_card_stats(&name, base_damage, base_health)?;
        Ok(Self {
            name,
            base_damage,
            base_health,
            element,
            boss: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_damage(&self) -> u32 {
        self.base_damage
    }

    pub fn base_health(&self) -> u32 {
        self.base_health
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    pub fn boss(&self) -> Option<&BossTraits> {
        self.boss.as_ref()
    }

    pub fn is_boss(&self) -> bool {
        self.boss.as_ref().is_some_and(|boss| !boss.name.is_empty())
    }

    /// Boss name for promoted templates, card name otherwise.
    pub fn display_name(&self) -> &str {
        match &self.boss {
            Some(boss) if !boss.name.is_empty() => &boss.name,
            _ => &self.name,
        }
    }

    /// Damage after the boss boost, if any.
    pub fn damage(&self) -> u32 {
        match &self.boss {
            Some(boss) if boss.proficiency == BossProficiency::Damage => {
                self.base_damage.saturating_mul(2)
            }
            _ => self.base_damage,
        }
    }

    /// Health after the boss boost, if any.
    pub fn health(&self) -> u32 {
        match &self.boss {
            Some(boss) if boss.proficiency == BossProficiency::Health => {
                self.base_health.saturating_mul(2)
            }
            _ => self.base_health,
        }
    }

    pub fn promote(&self, boss_name: impl Into<String>, proficiency: BossProficiency) -> AppResult<Self> {
        let boss_name = boss_name.into();
        validate_card_name(&boss_name)?;
        Ok(Self {
            boss: Some(BossTraits {
                name: boss_name,
                proficiency,
            }),
            ..self.clone()
        })
    }

    /// Upgraded stats stop at the card limits.
    pub fn with_upgrade(&self, attribute: CardAttribute) -> Self {
        match attribute {
            CardAttribute::Damage => Self {
                base_damage: (self.base_damage + CardAttribute::DAMAGE_STEP).min(MAX_DAMAGE),
                ..self.clone()
            },
            CardAttribute::Health => Self {
                base_health: (self.base_health + CardAttribute::HEALTH_STEP).min(MAX_HEALTH),
                ..self.clone()
            },
        }
    }

    /// Applies a signed stat delta, as recorded in player saves. The result
    /// must still satisfy the card limits.
    pub fn with_delta(&self, damage_diff: i64, health_diff: i64) -> AppResult<Self> {
        let shift = |value: u32, diff: i64| -> u32 {
            i64::from(value)
                .saturating_add(diff)
                .clamp(0, i64::from(u32::MAX)) as u32
        };
        let base_damage = shift(self.base_damage, damage_diff);
        let base_health = shift(self.base_health, health_diff);
        validate_card_stats(&self.name, base_damage, base_health)?;
        Ok(Self {
            base_damage,
            base_health,
            ..self.clone()
        })
    }
}

/// Battle-time instance of a template. Never persisted.
#[derive(Debug, Clone)]
pub struct Card {
    template: CardTemplate,
    damage: u32,
    current_health: u32,
}

impl Card {
    pub fn new(template: &CardTemplate) -> Self {
        Self {
            damage: template.damage(),
            current_health: template.health(),
            template: template.clone(),
        }
    }

    pub fn template(&self) -> &CardTemplate {
        &self.template
    }

    pub fn name(&self) -> &str {
        self.template.display_name()
    }

    pub fn element(&self) -> ElementType {
        self.template.element()
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn current_health(&self) -> u32 {
        self.current_health
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }

    /// Subtracts `amount`, flooring at zero. Returns true if this hit defeated the card.
    pub fn take_hit(&mut self, amount: u32) -> bool {
        let was_alive = !self.is_defeated();
        self.current_health = self.current_health.saturating_sub(amount);
        was_alive && self.is_defeated()
    }
}

#[derive(Debug, Clone)]
pub struct BossCard {
    card: Card,
}

impl BossCard {
    /// Returns None when the template carries no boss traits.
    pub fn new(template: &CardTemplate) -> Option<Self> {
        if !template.is_boss() {
            return None;
        }
        Some(Self {
            card: Card::new(template),
        })
    }

    pub fn card_mut(&mut self) -> &mut Card {
        &mut self.card
    }
}

impl Deref for BossCard {
    type Target = Card;

    fn deref(&self) -> &Self::Target {
        &self.card
    }
}
