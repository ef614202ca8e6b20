use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Validation errors
    #[error("Deck of {requested} cards exceeds the usable maximum of {max_usable}")]
    DeckTooLarge { requested: usize, max_usable: usize },

    #[error("Deck must contain at least one card")]
    EmptyDeck,

    #[error("Card '{card_name}' is not in the collection")]
    CardNotInCollection { card_name: String },

    #[error("Card '{card_name}' is selected more than once")]
    DuplicateCard { card_name: String },

    #[error("Unknown card '{card_name}'")]
    UnknownCard { card_name: String },

    #[error("Unknown boss '{boss_name}'")]
    UnknownBoss { boss_name: String },

    #[error("Unknown dungeon '{dungeon_name}'")]
    UnknownDungeon { dungeon_name: String },

    #[error("Invalid card '{card_name}': {reason}")]
    InvalidCard { card_name: String, reason: String },

    #[error("Invalid dungeon '{dungeon_name}': {reason}")]
    InvalidDungeon {
        dungeon_name: String,
        reason: String,
    },

    #[error("Difficulty {difficulty} is out of range (max: {max})")]
    InvalidDifficulty { difficulty: u8, max: u8 },

    // Format errors
    #[error("Save header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch { expected: String, found: String },

    #[error("Malformed save payload: {message}")]
    MalformedPayload { message: String },

    #[error("Malformed catalog row at line {line}: {reason}")]
    MalformedCatalogRow { line: usize, reason: String },

    #[error("Unparseable file name '{file_name}'")]
    UnparseableFileName { file_name: String },

    // Not-found errors
    #[error("Save file '{path}' not found")]
    SaveNotFound { path: String },

    #[error("World {world_id} not found")]
    WorldNotFound { world_id: u32 },

    // State errors
    #[error("Player inventory is not initialized")]
    InventoryNotInitialized,

    #[error("No deck has been selected")]
    DeckNotSelected,

    #[error("Renderer stopped acknowledging events")]
    RendererDisconnected,

    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ValidationError,
    FormatError,
    NotFoundError,
    StateError,
    IoError,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::DeckTooLarge { .. }
            | AppError::EmptyDeck
            | AppError::CardNotInCollection { .. }
            | AppError::DuplicateCard { .. }
            | AppError::UnknownCard { .. }
            | AppError::UnknownBoss { .. }
            | AppError::UnknownDungeon { .. }
            | AppError::InvalidCard { .. }
            | AppError::InvalidDungeon { .. }
            | AppError::InvalidDifficulty { .. } => ErrorCategory::ValidationError,

            AppError::HeaderMismatch { .. }
            | AppError::MalformedPayload { .. }
            | AppError::MalformedCatalogRow { .. }
            | AppError::UnparseableFileName { .. } => ErrorCategory::FormatError,

            AppError::SaveNotFound { .. } | AppError::WorldNotFound { .. } => {
                ErrorCategory::NotFoundError
            }

            AppError::InventoryNotInitialized
            | AppError::DeckNotSelected
            | AppError::RendererDisconnected => ErrorCategory::StateError,

            AppError::Io { .. } => ErrorCategory::IoError,
        }
    }

    pub fn should_log(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::IoError | ErrorCategory::FormatError
        )
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            AppError::DeckTooLarge { .. } => "DeckTooLarge",
            AppError::EmptyDeck => "EmptyDeck",
            AppError::CardNotInCollection { .. } => "CardNotInCollection",
            AppError::DuplicateCard { .. } => "DuplicateCard",
            AppError::UnknownCard { .. } => "UnknownCard",
            AppError::UnknownBoss { .. } => "UnknownBoss",
            AppError::UnknownDungeon { .. } => "UnknownDungeon",
            AppError::InvalidCard { .. } => "InvalidCard",
            AppError::InvalidDungeon { .. } => "InvalidDungeon",
            AppError::InvalidDifficulty { .. } => "InvalidDifficulty",
            AppError::HeaderMismatch { .. } => "HeaderMismatch",
            AppError::MalformedPayload { .. } => "MalformedPayload",
            AppError::MalformedCatalogRow { .. } => "MalformedCatalogRow",
            AppError::UnparseableFileName { .. } => "UnparseableFileName",
            AppError::SaveNotFound { .. } => "SaveNotFound",
            AppError::WorldNotFound { .. } => "WorldNotFound",
            AppError::InventoryNotInitialized => "InventoryNotInitialized",
            AppError::DeckNotSelected => "DeckNotSelected",
            AppError::RendererDisconnected => "RendererDisconnected",
            AppError::Io { .. } => "Io",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::DeckTooLarge { max_usable, .. } => {
                format!("You can take at most {} cards into a fight", max_usable)
            }
            AppError::HeaderMismatch { .. } | AppError::MalformedPayload { .. } => {
                "The save file is corrupt".to_string()
            }
            AppError::SaveNotFound { .. } => "No save exists for this world".to_string(),
            AppError::InventoryNotInitialized => "Start or load a game first".to_string(),
            _ => self.to_string(),
        }
    }

    /// Maps an I/O failure on `path`, turning a missing file into a not-found error.
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            AppError::SaveNotFound {
                path: path.display().to_string(),
            }
        } else {
            AppError::Io {
                path: path.display().to_string(),
                message: error.to_string(),
            }
        }
    }
}

pub mod validation {
    use super::AppError;

    pub const MAX_CARD_NAME_LEN: usize = 16;
    pub const MIN_DAMAGE: u32 = 2;
    pub const MAX_DAMAGE: u32 = 100;
    pub const MIN_HEALTH: u32 = 1;
    pub const MAX_HEALTH: u32 = 100;
    pub const MAX_DIFFICULTY: u8 = 10;

    pub fn validate_card_name(name: &str) -> Result<(), AppError> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidCard {
                card_name: name.to_string(),
                reason: "Card name cannot be empty".to_string(),
            });
        }
        if name.chars().count() > MAX_CARD_NAME_LEN {
            return Err(AppError::InvalidCard {
                card_name: name.to_string(),
                reason: format!("Card name cannot exceed {} characters", MAX_CARD_NAME_LEN),
            });
        }
        Ok(())
    }

    pub fn validate_card_stats(name: &str, damage: u32, health: u32) -> Result<(), AppError> {
        if !(MIN_DAMAGE..=MAX_DAMAGE).contains(&damage) {
            return Err(AppError::InvalidCard {
                card_name: name.to_string(),
                reason: format!(
                    "Damage {} must be between {} and {}",
                    damage, MIN_DAMAGE, MAX_DAMAGE
                ),
            });
        }
        if !(MIN_HEALTH..=MAX_HEALTH).contains(&health) {
            return Err(AppError::InvalidCard {
                card_name: name.to_string(),
                reason: format!(
                    "Health {} must be between {} and {}",
                    health, MIN_HEALTH, MAX_HEALTH
                ),
            });
        }
        Ok(())
    }

    pub fn validate_difficulty(difficulty: u8) -> Result<(), AppError> {
        if difficulty > MAX_DIFFICULTY {
            return Err(AppError::InvalidDifficulty {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        Ok(())
    }
}
