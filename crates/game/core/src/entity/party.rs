use tracing::info;

use crate::config::GameConfig;
use crate::env::{CatalogError, ContentCatalog};
use crate::monster::Monster;
use crate::state::{EntityId, MonsterId};

/// Where [`Party::add_monster`] placed a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartySlot {
    Party(usize),
    Storage,
}

/// Aggregated levels of a party.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelSummary {
    pub lowest: u32,
    pub highest: u32,
    pub average: u32,
}

/// An evolution that took place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvolutionRecord {
    pub monster: MonsterId,
    pub from: String,
    pub into: String,
}

/// Ordered party plus an overflow storage box.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Party {
    monsters: Vec<Monster>,
    storage: Vec<Monster>,
    limit: usize,
}

impl Default for Party {
    fn default() -> Self {
        Self::new(GameConfig::DEFAULT_PARTY_LIMIT)
    }
}

impl Party {
    /// Name of the storage box overflowing monsters go to.
    pub const STORAGE_BOX: &'static str = "Kennel";

    pub fn new(limit: usize) -> Self {
        Self {
            monsters: Vec::new(),
            storage: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Adds `monster` under `owner`, overflowing into storage when full.
    pub fn add_monster(&mut self, mut monster: Monster, owner: EntityId) -> PartySlot {
        monster.owner = Some(owner);
        if self.monsters.len() >= self.limit {
            self.storage.push(monster);
            PartySlot::Storage
        } else {
            self.monsters.push(monster);
            PartySlot::Party(self.monsters.len() - 1)
        }
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn monsters_mut(&mut self) -> &mut [Monster] {
        &mut self.monsters
    }

    pub fn storage(&self) -> &[Monster] {
        &self.storage
    }

    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    pub fn first(&self) -> Option<&Monster> {
        self.monsters.first()
    }

    pub fn first_mut(&mut self) -> Option<&mut Monster> {
        self.monsters.first_mut()
    }

    /// First party member of the given species.
    pub fn find(&self, slug: &str) -> Option<&Monster> {
        self.monsters.iter().find(|monster| monster.slug == slug)
    }

    pub fn find_mut(&mut self, slug: &str) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|monster| monster.slug == slug)
    }

    pub fn get(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.iter().find(|monster| monster.id == id)
    }

    pub fn get_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|monster| monster.id == id)
    }

    pub fn find_in_storage(&self, id: MonsterId) -> Option<&Monster> {
        self.storage.iter().find(|monster| monster.id == id)
    }

    pub fn index_of(&self, id: MonsterId) -> Option<usize> {
        self.monsters.iter().position(|monster| monster.id == id)
    }

    pub fn contains(&self, id: MonsterId) -> bool {
        self.index_of(id).is_some()
    }

    /// Takes a monster out of the party.
    pub fn remove(&mut self, id: MonsterId) -> Option<Monster> {
        let index = self.index_of(id)?;
        Some(self.monsters.remove(index))
    }

    pub fn remove_from_storage(&mut self, id: MonsterId) -> Option<Monster> {
        let index = self.storage.iter().position(|monster| monster.id == id)?;
        Some(self.storage.remove(index))
    }

    /// Releases a monster into the wild, clearing its owner.
    pub fn release(&mut self, id: MonsterId) -> Option<Monster> {
        let mut monster = self.remove(id)?;
        monster.owner = None;
        Some(monster)
    }

    pub fn switch(&mut self, a: usize, b: usize) -> bool {
        if a >= self.monsters.len() || b >= self.monsters.len() {
            return false;
        }
        self.monsters.swap(a, b);
        true
    }

    /// Members still able to fight, in party order.
    pub fn awake_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(|monster| !monster.is_fainted())
    }

    pub fn awake_count(&self) -> usize {
        self.awake_monsters().count()
    }

    /// True when no member can fight.
    pub fn is_defeated(&self) -> bool {
        self.awake_count() == 0
    }

    pub fn level_summary(&self) -> Option<LevelSummary> {
        if self.monsters.is_empty() {
            return None;
        }
        let levels = self.monsters.iter().map(|monster| monster.level);
        let lowest = levels.clone().min().unwrap_or(1);
        let highest = levels.clone().max().unwrap_or(1);
        let total: u64 = levels.map(u64::from).sum();
        let average = (total as f64 / self.monsters.len() as f64).round() as u32;
        Some(LevelSummary {
            lowest,
            highest,
            average,
        })
    }

    /// Heals every member to full and clears all statuses.
    pub fn restore(&mut self) {
        for monster in &mut self.monsters {
            monster.status.clear();
            monster.current_hp = monster.hp();
            monster.moves.iter_mut().for_each(|tech| tech.full_recharge());
        }
    }

    /// Evolves every member whose evolution level has been reached.
    pub fn evolve_pending(
        &mut self,
        catalog: &ContentCatalog,
    ) -> Result<Vec<EvolutionRecord>, CatalogError> {
        let mut records = Vec::new();
        for monster in &mut self.monsters {
            let Some(into) = monster.pending_evolution().map(str::to_owned) else {
                continue;
            };
            let evolved = catalog.create_monster(&into, monster.level, monster.id)?;
            let from = monster.slug.clone();
            monster.evolve_into(evolved);
            info!(monster = %monster.id, %from, %into, "monster evolved");
            records.push(EvolutionRecord {
                monster: monster.id,
                from,
                into,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monster(id: u32, level: u32) -> Monster {
        Monster::new(MonsterId(id), format!("mon{id}"), level).with_hp(20)
    }

    #[test]
    fn overflow_goes_to_storage() {
        let mut party = Party::new(2);
        assert_eq!(party.add_monster(monster(1, 5), EntityId::PLAYER), PartySlot::Party(0));
        assert_eq!(party.add_monster(monster(2, 5), EntityId::PLAYER), PartySlot::Party(1));
        assert_eq!(party.add_monster(monster(3, 5), EntityId::PLAYER), PartySlot::Storage);

        assert_eq!(party.len(), 2);
        let stored = party.find_in_storage(MonsterId(3)).map(|m| m.owner);
        assert_eq!(stored, Some(Some(EntityId::PLAYER)));
    }

    #[test]
    fn defeated_once_everyone_faints() {
        let mut party = Party::default();
        party.add_monster(monster(1, 5), EntityId(3));
        party.add_monster(monster(2, 5), EntityId(3));
        assert!(!party.is_defeated());

        for member in party.monsters_mut() {
            member.faint();
        }
        assert!(party.is_defeated());
        assert_eq!(party.awake_monsters().count(), 0);
    }

    #[test]
    fn release_clears_owner() {
        let mut party = Party::default();
        party.add_monster(monster(7, 5), EntityId(1));
        let released = party.release(MonsterId(7));

        assert_eq!(released.map(|m| m.owner), Some(None));
        assert!(party.is_empty());
    }

    #[test]
    fn level_summary_rounds_average() {
        let mut party = Party::default();
        assert_eq!(party.level_summary(), None);
        for (id, level) in [(1, 4), (2, 5), (3, 10)] {
            party.add_monster(monster(id, level), EntityId::PLAYER);
        }
        assert_eq!(
            party.level_summary(),
            Some(LevelSummary {
                lowest: 4,
                highest: 10,
                average: 6,
            })
        );
    }
}
