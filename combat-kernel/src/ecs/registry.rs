// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Stat registry
//!
//! Owns every per-entity column: the raw stats of the three stat categories
//! and the derived resources, resistances, combat stat blocks and death
//! flags. All columns share the same dense slot numbering, so removal is
//! mirrored through [`StatRegistry::swap_back`] on every one of them at once.
//!
//! The backing storage never leaves the registry; callers get per-cell
//! references and read-only column views.

use crate::ecs::component::{ColumnKey, EnumIndexedArray};
use crate::ecs::components::{CombatStatBlock, DeathFlags, Resist, Resource, Stat};
use crate::ecs::kinds::{
    CombatStatType, DamageType, ResistanceStatType, ResourceStatType, ResourceType,
    StatChangeType, StatTarget,
};
use crate::ecs::templates::EntityTypeData;

/// Column owner for all per-entity combat data
#[derive(Debug, Clone)]
pub struct StatRegistry {
    capacity: usize,
    resource_stats: EnumIndexedArray<ResourceStatType, Stat>,
    combat_stats: EnumIndexedArray<CombatStatType, Stat>,
    resistance_stats: EnumIndexedArray<ResistanceStatType, Stat>,
    resources: EnumIndexedArray<ResourceType, Resource>,
    resists: EnumIndexedArray<DamageType, Resist>,
    combat_blocks: Vec<CombatStatBlock>,
    death_flags: Vec<DeathFlags>,
}

impl StatRegistry {
    /// Allocate every column for `capacity` slots
    pub fn new(capacity: usize) -> Self {
        StatRegistry {
            capacity,
            resource_stats: EnumIndexedArray::new(capacity),
            combat_stats: EnumIndexedArray::new(capacity),
            resistance_stats: EnumIndexedArray::new(capacity),
            resources: EnumIndexedArray::new(capacity),
            resists: EnumIndexedArray::new(capacity),
            combat_blocks: vec![CombatStatBlock::default(); capacity],
            death_flags: vec![DeathFlags::NONE; capacity],
        }
    }

    /// Slots per column
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw modifiers of one stat
    pub fn stat(&self, target: StatTarget, slot: usize) -> &Stat {
        match target {
            StatTarget::Resource(s) => self.resource_stats.get(s, slot),
            StatTarget::Combat(s) => self.combat_stats.get(s, slot),
            StatTarget::Resistance(s) => self.resistance_stats.get(s, slot),
        }
    }

    fn stat_mut(&mut self, target: StatTarget, slot: usize) -> &mut Stat {
        match target {
            StatTarget::Resource(s) => self.resource_stats.get_mut(s, slot),
            StatTarget::Combat(s) => self.combat_stats.get_mut(s, slot),
            StatTarget::Resistance(s) => self.resistance_stats.get_mut(s, slot),
        }
    }

    /// Derived value of one stat
    pub fn stat_value(&self, target: StatTarget, slot: usize) -> f32 {
        self.stat(target, slot).calculate()
    }

    /// Apply a modifier to a raw stat and refresh its derived output
    ///
    /// Returns the change of the derived output: the new resource maximum
    /// minus the old one for resource stats, otherwise the change of the
    /// stat value itself.
    pub fn apply_stat_change(
        &mut self,
        target: StatTarget,
        slot: usize,
        change_type: StatChangeType,
        value: f32,
    ) -> f32 {
        let stat = self.stat_mut(target, slot);
        match change_type {
            StatChangeType::Flat => stat.flat_bonus += value,
            StatChangeType::MultiplierAdditive => stat.multiplier_additive += value,
            StatChangeType::MultiplierMultiplicative => stat.multiplier_multiplicative *= value,
        }
        self.apply_calculated(target, slot)
    }

    /// Recompute the derived output of a stat from its raw modifiers
    pub fn apply_calculated(&mut self, target: StatTarget, slot: usize) -> f32 {
        let value = self.stat_value(target, slot);
        match target {
            StatTarget::Resource(s) => self.resources.get_mut(s.resource(), slot).set_max(value),
            StatTarget::Combat(s) => self.combat_blocks[slot].set(s, value),
            StatTarget::Resistance(s) => self.resists.get_mut(s.damage_type(), slot).set(value),
        }
    }

    /// Current and maximum of a resource
    pub fn resource(&self, resource: ResourceType, slot: usize) -> &Resource {
        self.resources.get(resource, slot)
    }

    /// Mutable resource cell
    pub fn resource_mut(&mut self, resource: ResourceType, slot: usize) -> &mut Resource {
        self.resources.get_mut(resource, slot)
    }

    /// Column view of one resource across all slots
    pub fn resource_column(&self, resource: ResourceType) -> &[Resource] {
        self.resources.column(resource)
    }

    /// Resistance of one damage type
    pub fn resist(&self, damage_type: DamageType, slot: usize) -> &Resist {
        self.resists.get(damage_type, slot)
    }

    /// Packed combat stats
    pub fn combat_block(&self, slot: usize) -> &CombatStatBlock {
        &self.combat_blocks[slot]
    }

    /// Death flags
    pub fn death_flags(&self, slot: usize) -> DeathFlags {
        self.death_flags[slot]
    }

    /// Replace the death flags
    pub fn set_death_flags(&mut self, slot: usize, flags: DeathFlags) {
        self.death_flags[slot] = flags;
    }

    /// Write every stat of a template into a slot and derive its outputs
    ///
    /// Starting resources are clamped to the freshly computed maxima.
    pub fn init_from_template(&mut self, slot: usize, data: &EntityTypeData) {
        for &s in ResourceStatType::ALL {
            *self.resource_stats.get_mut(s, slot) = Stat::new(data.resource_stats[s.index()]);
            self.apply_calculated(s.into(), slot);
        }
        for &s in CombatStatType::ALL {
            *self.combat_stats.get_mut(s, slot) = Stat::new(data.combat_stats[s.index()]);
            self.apply_calculated(s.into(), slot);
        }
        for &s in ResistanceStatType::ALL {
            *self.resistance_stats.get_mut(s, slot) = Stat::new(data.resistance_stats[s.index()]);
            self.apply_calculated(s.into(), slot);
        }
        for &r in ResourceType::ALL {
            let cell = self.resources.get_mut(r, slot);
            cell.value = data.starting_resources[r.index()].clamp(0.0, cell.max.max(0.0));
        }
        self.death_flags[slot] = data.death_flags;
    }

    /// Copy the row at `moved_from` into `removed` in every column
    pub fn swap_back(&mut self, removed: usize, moved_from: usize) {
        self.resource_stats.swap_back(removed, moved_from);
        self.combat_stats.swap_back(removed, moved_from);
        self.resistance_stats.swap_back(removed, moved_from);
        self.resources.swap_back(removed, moved_from);
        self.resists.swap_back(removed, moved_from);
        self.combat_blocks[removed] = self.combat_blocks[moved_from];
        self.death_flags[removed] = self.death_flags[moved_from];
    }

    /// Reset a slot in every column to neutral values
    pub fn clear_slot(&mut self, slot: usize) {
        if slot >= self.capacity {
            return;
        }
        self.resource_stats.clear_slot(slot);
        self.combat_stats.clear_slot(slot);
        self.resistance_stats.clear_slot(slot);
        self.resources.clear_slot(slot);
        self.resists.clear_slot(slot);
        self.combat_blocks[slot] = CombatStatBlock::default();
        self.death_flags[slot] = DeathFlags::NONE;
    }

    /// Every value of a slot, for comparing rows in tests and tooling
    pub fn row(&self, slot: usize) -> StatRow {
        StatRow {
            resource_stats: ResourceStatType::ALL
                .iter()
                .map(|&s| *self.resource_stats.get(s, slot))
                .collect(),
            combat_stats: CombatStatType::ALL
                .iter()
                .map(|&s| *self.combat_stats.get(s, slot))
                .collect(),
            resistance_stats: ResistanceStatType::ALL
                .iter()
                .map(|&s| *self.resistance_stats.get(s, slot))
                .collect(),
            resources: ResourceType::ALL
                .iter()
                .map(|&r| *self.resources.get(r, slot))
                .collect(),
            resists: DamageType::ALL
                .iter()
                .map(|&d| *self.resists.get(d, slot))
                .collect(),
            combat_block: self.combat_blocks[slot],
            death_flags: self.death_flags[slot],
        }
    }
}

/// Snapshot of every column at one slot
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    /// Raw resource capacity stats
    pub resource_stats: Vec<Stat>,
    /// Raw combat stats
    pub combat_stats: Vec<Stat>,
    /// Raw resistance stats
    pub resistance_stats: Vec<Stat>,
    /// Resource pools
    pub resources: Vec<Resource>,
    /// Resistances
    pub resists: Vec<Resist>,
    /// Packed combat stats
    pub combat_block: CombatStatBlock,
    /// Death flags
    pub death_flags: DeathFlags,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::templates::EntityDefinition;

    fn template() -> EntityTypeData {
        let def = EntityDefinition::new("grunt")
            .with_resource(ResourceType::Health, 10.0)
            .with_resource(ResourceType::Armor, 5.0)
            .with_combat_stat(CombatStatType::AttackPower, 3.0)
            .with_resistance(ResistanceStatType::Physical, 100.0)
            .with_corpse();
        EntityTypeData::compile(&def).unwrap()
    }

    #[test]
    fn test_init_from_template() {
        let mut stats = StatRegistry::new(4);
        stats.init_from_template(1, &template());

        assert_eq!(*stats.resource(ResourceType::Health, 1), Resource::new(10.0, 10.0));
        assert_eq!(stats.resource(ResourceType::Armor, 1).max, 5.0);
        assert_eq!(stats.combat_block(1).attack_power, 3.0);
        assert_eq!(stats.resist(DamageType::Physical, 1).fraction, 0.5);
        assert!(stats.death_flags(1).contains(DeathFlags::LEAVES_CORPSE));
        assert_eq!(stats.resource(ResourceType::Health, 0).max, 0.0);
    }

    #[test]
    fn test_starting_resources_clamped_to_max() {
        let def = EntityDefinition::new("over")
            .with_resource(ResourceType::Health, 10.0)
            .with_starting(ResourceType::Health, 50.0);
        let data = EntityTypeData::compile(&def).unwrap();

        let mut stats = StatRegistry::new(1);
        stats.init_from_template(0, &data);
        assert_eq!(stats.resource(ResourceType::Health, 0).value, 10.0);
    }

    #[test]
    fn test_resource_stat_change_sets_max() {
        let mut stats = StatRegistry::new(1);
        stats.init_from_template(0, &template());

        let target = StatTarget::Resource(ResourceStatType::MaxHealth);
        let delta = stats.apply_stat_change(target, 0, StatChangeType::Flat, 3.0);
        assert_eq!(delta, 3.0);
        assert_eq!(*stats.resource(ResourceType::Health, 0), Resource::new(10.0, 13.0));

        let delta = stats.apply_stat_change(target, 0, StatChangeType::Flat, -8.0);
        assert_eq!(delta, -8.0);
        assert_eq!(*stats.resource(ResourceType::Health, 0), Resource::new(5.0, 5.0));
    }

    #[test]
    fn test_combat_and_resist_changes() {
        let mut stats = StatRegistry::new(1);
        stats.init_from_template(0, &template());

        let ap = StatTarget::Combat(CombatStatType::AttackPower);
        let delta = stats.apply_stat_change(ap, 0, StatChangeType::MultiplierMultiplicative, 2.0);
        assert_eq!(delta, 3.0);
        assert_eq!(stats.combat_block(0).attack_power, 6.0);

        let phys = StatTarget::Resistance(ResistanceStatType::Physical);
        let delta = stats.apply_stat_change(phys, 0, StatChangeType::MultiplierAdditive, -0.5);
        assert_eq!(delta, -50.0);
        let resist = stats.resist(DamageType::Physical, 0);
        assert_eq!(resist.value, 50.0);
        assert_eq!(resist.fraction, 50.0 / 150.0);
    }

    #[test]
    fn test_swap_back_moves_entire_row() {
        let mut stats = StatRegistry::new(5);
        for slot in 0..5 {
            let def = EntityDefinition::new("row")
                .with_resource(ResourceType::Health, 10.0 + slot as f32)
                .with_combat_stat(CombatStatType::Haste, slot as f32)
                .with_resistance(ResistanceStatType::True, slot as f32);
            stats.init_from_template(slot, &EntityTypeData::compile(&def).unwrap());
        }

        let last = stats.row(4);
        stats.swap_back(3, 4);
        assert_eq!(stats.row(3), last);
        assert_ne!(stats.row(2), last);
    }

    #[test]
    fn test_clear_slot_resets_to_neutral() {
        let mut stats = StatRegistry::new(2);
        stats.init_from_template(0, &template());
        stats.clear_slot(0);

        let row = stats.row(0);
        assert_eq!(row, stats.row(1));
        assert!(row.combat_stats.iter().all(|s| s.multiplier_multiplicative == 1.0));
    }
}
