//! Elemental damage resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Fire,
    Water,
    Earth,
    Air,
    Useless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplier {
    Half,
    Normal,
    Double,
}

impl Multiplier {
    pub fn as_f64(self) -> f64 {
        match self {
            Multiplier::Half => 0.5,
            Multiplier::Normal => 1.0,
            Multiplier::Double => 2.0,
        }
    }
}

impl ElementType {
    pub const ALL: [ElementType; 5] = [
        ElementType::Fire,
        ElementType::Water,
        ElementType::Earth,
        ElementType::Air,
        ElementType::Useless,
    ];

    /// Elements this one deals double damage to.
    pub fn beats(self) -> &'static [ElementType] {
        match self {
            ElementType::Air => &[ElementType::Water, ElementType::Earth],
            ElementType::Water => &[ElementType::Air, ElementType::Fire],
            ElementType::Fire => &[ElementType::Earth, ElementType::Water],
            ElementType::Earth => &[ElementType::Air, ElementType::Fire],
            ElementType::Useless => &[],
        }
    }

    pub fn multiplier_against(self, defender: ElementType) -> Multiplier {
        if self == defender || self == ElementType::Useless || defender == ElementType::Useless {
            Multiplier::Normal
        } else if self.beats().contains(&defender) {
            Multiplier::Double
        } else {
            // Each proper element beats two of the other three; the leftover one halves.
            Multiplier::Half
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Fire => "fire",
            ElementType::Water => "water",
            ElementType::Earth => "earth",
            ElementType::Air => "air",
            ElementType::Useless => "useless",
        };
        write!(f, "{}", name)
    }
}

/// Damage dealt by an attacker of `attacker` element to a `defender`.
///
/// The halved case floors; doubling and the neutral case are exact.
pub fn calculate_damage(base: u32, attacker: ElementType, defender: ElementType) -> u32 {
    match attacker.multiplier_against(defender) {
        Multiplier::Half => base / 2,
        Multiplier::Normal => base,
        Multiplier::Double => base.saturating_mul(2),
    }
}
