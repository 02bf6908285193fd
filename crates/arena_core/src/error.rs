//! Error types for the combat core.

use thiserror::Error;

use crate::blueprint::CharacterId;

/// Result type alias using [`ArenaError`].
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Top-level error type for all combat core errors.
///
/// Invalid target state (a target that died or vanished mid-computation) is
/// never reported through this type; it is handled as "no target".
#[derive(Debug, Error)]
pub enum ArenaError {
    /// No class definition is registered under this name.
    #[error("Character class not found: {0}")]
    UnknownClass(String),

    /// No character with this ID exists in either roster.
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// Board cell lies outside the placement grid.
    #[error("Cell ({col}, {row}) is outside the board")]
    CellOutOfBounds {
        /// Column index.
        col: i32,
        /// Row index.
        row: i32,
    },

    /// Board cell already holds another character.
    #[error("Cell ({col}, {row}) is occupied by {occupant}")]
    CellOccupied {
        /// Column index.
        col: i32,
        /// Row index.
        row: i32,
        /// The character already standing there.
        occupant: CharacterId,
    },

    /// Data file parsing error.
    #[error("Failed to parse data '{path}': {message}")]
    DataParseError {
        /// Path or label of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Persistence collaborator failed to read or write blueprints.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Operation not allowed in the current battle state.
    #[error("Invalid battle state: {0}")]
    InvalidState(String),
}
