//! Registry of character classes keyed by class name.

use serde::{Deserialize, Serialize};

use super::class_data::{AttackStyle, ClassData};
use crate::error::{ArenaError, Result};
use crate::stats::StatBlock;

/// Ordered table of class definitions.
///
/// Lookups are by class name. Registering a class with an existing name
/// replaces the old definition in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassRegistry {
    classes: Vec<ClassData>,
}

impl ClassRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in knight, rogue, and archer classes.
    #[must_use]
    pub fn builtin() -> Self {
        let base = StatBlock::default();
        let mut registry = Self::new();

        registry.register(ClassData::new("knight").with_stats(StatBlock {
            armor: 10.0,
            resistance: 10.0,
            ..base
        }));
        registry.register(ClassData::new("rogue").with_stats(StatBlock {
            attack_speed: 1.5,
            speed: 50.0,
            attack_damage: 20.0,
            ..base
        }));
        registry.register(
            ClassData::new("archer")
                .with_stats(StatBlock {
                    attack_speed: 0.75,
                    speed: 40.0,
                    attack_damage: 30.0,
                    attack_range: 5.0,
                    ..base
                })
                .with_attack_style(AttackStyle::Ranged),
        );

        registry
    }

    /// Parse a registry from a RON list of [`ClassData`].
    ///
    /// `label` names the source in error messages.
    pub fn from_ron_str(label: &str, ron: &str) -> Result<Self> {
        let classes: Vec<ClassData> =
            ron::from_str(ron).map_err(|e| ArenaError::DataParseError {
                path: label.to_string(),
                message: e.to_string(),
            })?;

        let mut registry = Self::new();
        for class in classes {
            registry.register(class);
        }
        Ok(registry)
    }

    /// Add or replace a class definition.
    pub fn register(&mut self, class: ClassData) {
        if let Some(existing) = self.classes.iter_mut().find(|c| c.id == class.id) {
            *existing = class;
        } else {
            self.classes.push(class);
        }
    }

    /// Look up a class by name.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::UnknownClass`] if no class has this name.
    pub fn get(&self, name: &str) -> Result<&ClassData> {
        self.classes
            .iter()
            .find(|c| c.id == name)
            .ok_or_else(|| ArenaError::UnknownClass(name.to_string()))
    }

    /// Check if a class is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c.id == name)
    }

    /// Names of all registered classes, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.id.as_str()).collect()
    }

    /// Number of registered classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
