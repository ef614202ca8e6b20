pub mod config;
pub mod errors;
pub mod game;
pub mod persistence;
pub mod player;

// Re-export commonly used items for convenience
pub use config::GameConfig;
pub use errors::{AppError, AppResult, ErrorCategory};
pub use game::card_loader::{parse_legacy, Catalog, LegacyImport};
pub use game::cards_types::{BossCard, BossProficiency, Card, CardAttribute, CardTemplate};
pub use game::collection::Collection;
pub use game::decks::Deck;
pub use game::dungeon::{Dungeon, DungeonTemplate, DungeonType};
pub use game::element::{calculate_damage, ElementType};
pub use game::events::{event_channel, EventEmitter, EventReceiver, FightEvent, PendingEvent};
pub use game::fight::{FightEngine, FightOutcome, FightReport, FightState};
pub use game::reward::{Reward, RewardExport};
pub use game::world::World;
pub use persistence::{PlayerSave, SaveStore, WorldSave};
pub use player::PlayerInventory;

#[cfg(test)]
mod tests {
    mod all;
}
