pub mod inventory;

pub use inventory::PlayerInventory;
