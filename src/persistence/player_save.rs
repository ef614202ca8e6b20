use serde::{Deserialize, Serialize};

/// Stat difference between an owned card and its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradedCard {
    pub card_name: String,
    pub health_diff: i64,
    pub damage_diff: i64,
}

/// Player progress for one world. Only modified cards are stored, as deltas
/// against the catalog, so catalog edits carry through on reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSave {
    pub unlocked_cards: Vec<String>,
    pub selected_cards: Vec<String>,
    pub upgraded_cards: Vec<UpgradedCard>,
    pub save_base: u32,
    pub difficulty: u8,
    pub save_name: String,
    pub save_timestamp: u64,
    pub save_id: String,
}
