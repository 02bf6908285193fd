//! Ordered team rosters.

use crate::blueprint::{CharacterId, Side};
use crate::character::Character;

/// All characters fighting for one side, in stable order.
///
/// Order matters: the tick pass and targeting ties both follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    side: Side,
    members: Vec<Character>,
}

impl Roster {
    /// Create an empty roster for `side`.
    #[must_use]
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            members: Vec::new(),
        }
    }

    /// Side this roster fights for.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Add a character, or replace the one with the same ID in place.
    ///
    /// Returns the replaced character, if any.
    pub fn upsert(&mut self, character: Character) -> Option<Character> {
        match self.index_of(character.id()) {
            Some(index) => Some(std::mem::replace(&mut self.members[index], character)),
            None => {
                self.members.push(character);
                None
            }
        }
    }

    /// Remove a character by ID, keeping the order of the rest.
    pub fn remove(&mut self, id: &CharacterId) -> Option<Character> {
        let index = self.index_of(id)?;
        Some(self.members.remove(index))
    }

    /// Drop every member.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Look up a member.
    #[must_use]
    pub fn get(&self, id: &CharacterId) -> Option<&Character> {
        self.members.iter().find(|c| c.id() == id)
    }

    /// Look up a member mutably.
    pub fn get_mut(&mut self, id: &CharacterId) -> Option<&mut Character> {
        self.members.iter_mut().find(|c| c.id() == id)
    }

    /// Position of a member in roster order.
    #[must_use]
    pub fn index_of(&self, id: &CharacterId) -> Option<usize> {
        self.members.iter().position(|c| c.id() == id)
    }

    /// Check if a member with this ID exists.
    #[must_use]
    pub fn contains(&self, id: &CharacterId) -> bool {
        self.index_of(id).is_some()
    }

    /// Number of members that are still alive.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.members.iter().filter(|c| c.is_active()).count()
    }

    /// Snapshot of member IDs in roster order.
    #[must_use]
    pub fn ids(&self) -> Vec<CharacterId> {
        self.members.iter().map(|c| c.id().clone()).collect()
    }

    /// Iterate members in roster order.
    pub fn iter(&self) -> std::slice::Iter<'_, Character> {
        self.members.iter()
    }

    /// Iterate members mutably in roster order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Character> {
        self.members.iter_mut()
    }

    /// Number of members, dead or alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the roster has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Character;
    type IntoIter = std::slice::Iter<'a, Character>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::Blueprint;
    use crate::data::ClassRegistry;

    fn member(id: &str, class: &str) -> Character {
        let registry = ClassRegistry::builtin();
        let blueprint = Blueprint::from_class(id, registry.get(class).unwrap()).for_player();
        Character::from_blueprint(&blueprint, &registry).unwrap()
    }

    #[test]
    fn test_upsert_keeps_order() {
        let mut roster = Roster::new(Side::Player);
        roster.upsert(member("a", "knight"));
        roster.upsert(member("b", "rogue"));
        let replaced = roster.upsert(member("a", "archer")).unwrap();

        assert_eq!(replaced.class(), "knight");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.ids(), vec![CharacterId::new("a"), CharacterId::new("b")]);
        assert_eq!(roster.get(&CharacterId::new("a")).unwrap().class(), "archer");
    }

    #[test]
    fn test_active_count() {
        let mut roster = Roster::new(Side::Player);
        roster.upsert(member("a", "knight"));
        roster.upsert(member("b", "rogue"));
        assert_eq!(roster.active_count(), 2);

        roster.get_mut(&CharacterId::new("a")).unwrap().die();
        assert_eq!(roster.active_count(), 1);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut roster = Roster::new(Side::Enemy);
        roster.upsert(member("a", "knight"));
        roster.upsert(member("b", "knight"));
        roster.upsert(member("c", "knight"));

        assert!(roster.remove(&CharacterId::new("b")).is_some());
        assert!(roster.remove(&CharacterId::new("b")).is_none());
        assert_eq!(roster.ids(), vec![CharacterId::new("a"), CharacterId::new("c")]);
    }
}
