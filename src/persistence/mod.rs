pub mod envelope;
pub mod player_save;
pub mod store;
pub mod world_save;

pub use player_save::{PlayerSave, UpgradedCard};
pub use store::SaveStore;
pub use world_save::{BossRecord, CardRecord, CollectionRecord, DungeonSave, WorldSave};
