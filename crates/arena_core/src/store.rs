//! Persistence seam for player rosters.
//!
//! The core does not know where blueprints live. Hosts implement
//! [`RosterStore`] (a JSON file in the headless runner, memory in tests).

use crate::blueprint::{Blueprint, CharacterId};
use crate::error::Result;

/// Storage for the ordered list of player blueprints.
pub trait RosterStore {
    /// Read the saved roster.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Persistence`](crate::error::ArenaError::Persistence)
    /// if the backing storage cannot be read or decoded.
    fn load(&self) -> Result<Vec<Blueprint>>;

    /// Replace the saved roster.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::Persistence`](crate::error::ArenaError::Persistence)
    /// if the backing storage cannot be written.
    fn save(&mut self, blueprints: &[Blueprint]) -> Result<()>;
}

/// Load the saved roster, treating any failure as an empty roster.
pub fn load_or_empty(store: &dyn RosterStore) -> Vec<Blueprint> {
    match store.load() {
        Ok(blueprints) => blueprints,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load saved roster, starting empty");
            Vec::new()
        }
    }
}

/// Insert or replace one blueprint in the saved roster, keeping order.
///
/// # Errors
///
/// Propagates write failures from the store. A failed read is treated as an
/// empty roster.
pub fn upsert_blueprint(store: &mut dyn RosterStore, blueprint: Blueprint) -> Result<()> {
    let mut saved = load_or_empty(store);
    match saved.iter_mut().find(|b| b.id == blueprint.id) {
        Some(existing) => *existing = blueprint,
        None => saved.push(blueprint),
    }
    store.save(&saved)
}

/// Remove one blueprint from the saved roster.
///
/// # Errors
///
/// Propagates write failures from the store.
pub fn remove_blueprint(store: &mut dyn RosterStore, id: &CharacterId) -> Result<()> {
    let mut saved = load_or_empty(store);
    saved.retain(|b| &b.id != id);
    store.save(&saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClassRegistry;
    use crate::error::ArenaError;

    #[derive(Default)]
    struct VecStore {
        saved: Vec<Blueprint>,
        broken: bool,
    }

    impl RosterStore for VecStore {
        fn load(&self) -> Result<Vec<Blueprint>> {
            if self.broken {
                return Err(ArenaError::Persistence("disk on fire".into()));
            }
            Ok(self.saved.clone())
        }

        fn save(&mut self, blueprints: &[Blueprint]) -> Result<()> {
            self.saved = blueprints.to_vec();
            Ok(())
        }
    }

    fn blueprint(id: &str, class: &str) -> Blueprint {
        let registry = ClassRegistry::builtin();
        Blueprint::from_class(id, registry.get(class).unwrap()).for_player()
    }

    #[test]
    fn test_failed_load_degrades_to_empty() {
        let store = VecStore {
            broken: true,
            ..VecStore::default()
        };
        assert!(load_or_empty(&store).is_empty());
    }

    #[test]
    fn test_upsert_and_remove() {
        let mut store = VecStore::default();
        upsert_blueprint(&mut store, blueprint("a", "knight")).unwrap();
        upsert_blueprint(&mut store, blueprint("b", "rogue")).unwrap();
        upsert_blueprint(&mut store, blueprint("a", "archer")).unwrap();

        assert_eq!(store.saved.len(), 2);
        assert_eq!(store.saved[0].class, "archer");

        remove_blueprint(&mut store, &CharacterId::new("a")).unwrap();
        assert_eq!(store.saved.len(), 1);
        assert_eq!(store.saved[0].id, CharacterId::new("b"));
    }
}
