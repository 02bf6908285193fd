//! Character identity and the persisted blueprint shape.
//!
//! A [`Blueprint`] is everything needed to rebuild a character between
//! rounds or sessions. The persistence collaborator stores an ordered list of
//! them; the core only converts to and from runtime characters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::ClassData;
use crate::math::Vec2;
use crate::stats::{Progression, StatBlock};

/// Unique identifier for characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    /// Create an ID from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CharacterId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Which roster a character fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player's placed characters.
    Player,
    /// The opposing spawn.
    Enemy,
}

impl Side {
    /// The side this one fights against.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Persisted description of a character.
///
/// # Example JSON
///
/// ```json
/// {
///   "id": "a1",
///   "class": "knight",
///   "is_player": true,
///   "progression": { "level": 2, "experience": 1 },
///   "stats": { "max_health": 150.0, "armor": 10.0 },
///   "board_position": { "x": 657.0, "y": 535.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Unique character ID.
    pub id: CharacterId,

    /// Class name, looked up in the class registry.
    pub class: String,

    /// Whether the character belongs to the player roster.
    #[serde(default)]
    pub is_player: bool,

    /// Level and experience.
    #[serde(default)]
    pub progression: Progression,

    /// Full stat block. Missing fields take base values.
    #[serde(default)]
    pub stats: StatBlock,

    /// Last board position (world units).
    #[serde(default)]
    pub board_position: Vec2,
}

impl Blueprint {
    /// Create a level 1 blueprint carrying a class's starting stats.
    #[must_use]
    pub fn from_class(id: impl Into<CharacterId>, class: &ClassData) -> Self {
        Self {
            id: id.into(),
            class: class.id.clone(),
            is_player: false,
            progression: Progression::default(),
            stats: class.stats,
            board_position: Vec2::ZERO,
        }
    }

    /// Builder method to mark the blueprint as a player character.
    #[must_use]
    pub fn for_player(mut self) -> Self {
        self.is_player = true;
        self
    }

    /// Builder method to set the board position.
    #[must_use]
    pub fn at(mut self, position: Vec2) -> Self {
        self.board_position = position;
        self
    }

    /// The roster this blueprint belongs to.
    #[must_use]
    pub const fn side(&self) -> Side {
        if self.is_player {
            Side::Player
        } else {
            Side::Enemy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClassRegistry;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Player.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Player);
    }

    #[test]
    fn test_from_class_copies_stats() {
        let registry = ClassRegistry::builtin();
        let archer = registry.get("archer").unwrap();
        let blueprint = Blueprint::from_class("a1", archer)
            .for_player()
            .at(Vec2::new(10.0, 20.0));

        assert_eq!(blueprint.class, "archer");
        assert_eq!(blueprint.stats, archer.stats);
        assert_eq!(blueprint.side(), Side::Player);
        assert_eq!(blueprint.progression.level, 1);
        assert_eq!(blueprint.board_position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_missing_fields_default() {
        let blueprint: Blueprint = ron::from_str(r#"(id: "x", class: "rogue")"#).unwrap();
        assert_eq!(blueprint.id.as_str(), "x");
        assert!(!blueprint.is_player);
        assert_eq!(blueprint.stats, StatBlock::default());
        assert_eq!(blueprint.progression, Progression::default());
    }
}
