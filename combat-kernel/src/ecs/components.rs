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
//! Per-entity combat components
//!
//! Raw stats carry the four modifier terms; resources, resistances and the
//! combat stat block are the derived outputs the pipeline writes after each
//! stat change.

use crate::ecs::kinds::CombatStatType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw stat modifiers
///
/// The derived value is `(base + flat) * (1 + additive) * multiplicative`.
///
/// # Examples
///
/// ```
/// use combat_kernel::ecs::components::Stat;
///
/// let stat = Stat::from_parts(5.0, 2.0, 0.5, 2.0);
/// assert_eq!(stat.calculate(), 21.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    /// Template base value
    pub base: f32,
    /// Sum of flat bonuses
    pub flat_bonus: f32,
    /// Sum of additive multipliers
    pub multiplier_additive: f32,
    /// Product of multiplicative multipliers
    pub multiplier_multiplicative: f32,
}

impl Stat {
    /// Stat with a base value and neutral modifiers
    pub fn new(base: f32) -> Self {
        Stat {
            base,
            flat_bonus: 0.0,
            multiplier_additive: 0.0,
            multiplier_multiplicative: 1.0,
        }
    }

    /// Stat with every modifier term given
    pub fn from_parts(base: f32, flat: f32, additive: f32, multiplicative: f32) -> Self {
        Stat {
            base,
            flat_bonus: flat,
            multiplier_additive: additive,
            multiplier_multiplicative: multiplicative,
        }
    }

    /// Derived value
    #[inline]
    pub fn calculate(&self) -> f32 {
        (self.base + self.flat_bonus)
            * (1.0 + self.multiplier_additive)
            * self.multiplier_multiplicative
    }
}

impl Default for Stat {
    fn default() -> Self {
        Stat::new(0.0)
    }
}

/// Current and maximum value of one resource pool
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Current value, kept within `[0, max]`
    pub value: f32,
    /// Capacity
    pub max: f32,
}

impl Resource {
    /// Resource with the value clamped into `[0, max]`
    pub fn new(value: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Resource {
            value: value.clamp(0.0, max),
            max,
        }
    }

    /// Set a new capacity, clamping the current value into `[0, max]`
    ///
    /// Returns `new_max - old_max`.
    pub fn set_max(&mut self, max: f32) -> f32 {
        let delta = max - self.max;
        self.max = max;
        self.value = self.value.min(max).max(0.0);
        delta
    }

    /// Fraction of capacity filled, zero for an empty pool
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.value / self.max
        }
    }
}

/// Resistance value and its damage reduction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resist {
    /// Derived resistance stat
    pub value: f32,
    /// Fraction of incoming damage removed
    pub fraction: f32,
}

impl Resist {
    /// Build from a resistance value
    pub fn new(value: f32) -> Self {
        Resist {
            value,
            fraction: Resist::fraction_of(value),
        }
    }

    /// Diminishing-returns curve `v / (v + 100)`, zero for `v <= 0`
    #[inline]
    pub fn fraction_of(value: f32) -> f32 {
        if value <= 0.0 {
            0.0
        } else {
            value / (value + 100.0)
        }
    }

    /// Replace the value and recompute the fraction
    ///
    /// Returns `new_value - old_value`.
    pub fn set(&mut self, value: f32) -> f32 {
        let delta = value - self.value;
        *self = Resist::new(value);
        delta
    }
}

/// Packed combat stats of one entity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatStatBlock {
    /// Attack power
    pub attack_power: f32,
    /// Haste
    pub haste: f32,
    /// Critical strike chance
    pub crit_chance: f32,
    /// Critical strike damage multiplier
    pub crit_multiplier: f32,
}

impl CombatStatBlock {
    /// Value of one field
    pub fn get(&self, stat: CombatStatType) -> f32 {
        match stat {
            CombatStatType::AttackPower => self.attack_power,
            CombatStatType::Haste => self.haste,
            CombatStatType::CritChance => self.crit_chance,
            CombatStatType::CritMultiplier => self.crit_multiplier,
        }
    }

    /// Overwrite one field, returning `new - old`
    pub fn set(&mut self, stat: CombatStatType, value: f32) -> f32 {
        let field = match stat {
            CombatStatType::AttackPower => &mut self.attack_power,
            CombatStatType::Haste => &mut self.haste,
            CombatStatType::CritChance => &mut self.crit_chance,
            CombatStatType::CritMultiplier => &mut self.crit_multiplier,
        };
        let delta = value - *field;
        *field = value;
        delta
    }
}

/// Death behavior and cause bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DeathFlags(u8);

impl DeathFlags {
    /// No flags
    pub const NONE: DeathFlags = DeathFlags(0);
    /// A corpse record is kept and the id is retired
    pub const LEAVES_CORPSE: DeathFlags = DeathFlags(1);
    /// The killing blow was a critical strike
    pub const WAS_CRITICAL: DeathFlags = DeathFlags(2);
    /// The entity was executed by an instant-kill change
    pub const WAS_EXECUTED: DeathFlags = DeathFlags(4);

    /// Raw bits
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set
    pub fn contains(&self, other: DeathFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`
    pub fn insert(&mut self, other: DeathFlags) {
        self.0 |= other.0;
    }

    /// Whether no bit is set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for DeathFlags {
    type Output = DeathFlags;

    fn bitor(self, rhs: DeathFlags) -> DeathFlags {
        DeathFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for DeathFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeathFlags({:#05b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_formula() {
        let stat = Stat::from_parts(5.0, 2.0, 0.5, 2.0);
        assert_eq!(stat.calculate(), 21.0);
    }

    #[test]
    fn test_default_stat_is_neutral() {
        let stat = Stat::default();
        assert_eq!(stat.multiplier_multiplicative, 1.0);
        assert_eq!(Stat::new(23.0).calculate(), 23.0);
    }

    #[test]
    fn test_resist_curve() {
        assert_eq!(Resist::fraction_of(0.0), 0.0);
        assert_eq!(Resist::fraction_of(-20.0), 0.0);
        assert_eq!(Resist::fraction_of(100.0), 0.5);

        let mut last = 0.0;
        for v in [1.0, 10.0, 100.0, 1_000.0, 100_000.0] {
            let f = Resist::fraction_of(v);
            assert!(f > last);
            assert!(f < 1.0);
            last = f;
        }
    }

    #[test]
    fn test_resource_set_max_clamps_value() {
        let mut res = Resource::new(10.0, 10.0);
        assert_eq!(res.set_max(6.0), -4.0);
        assert_eq!(res.value, 6.0);

        assert_eq!(res.set_max(12.0), 6.0);
        assert_eq!(res.value, 6.0);
        assert_eq!(res.fraction(), 0.5);
    }

    #[test]
    fn test_resource_new_clamps() {
        let res = Resource::new(15.0, 10.0);
        assert_eq!(res.value, 10.0);
        assert_eq!(Resource::new(-1.0, 10.0).value, 0.0);
    }

    #[test]
    fn test_combat_block_delta() {
        let mut block = CombatStatBlock::default();
        assert_eq!(block.set(CombatStatType::Haste, 4.0), 4.0);
        assert_eq!(block.set(CombatStatType::Haste, 3.0), -1.0);
        assert_eq!(block.get(CombatStatType::Haste), 3.0);
        assert_eq!(block.get(CombatStatType::AttackPower), 0.0);
    }

    #[test]
    fn test_death_flags() {
        let mut flags = DeathFlags::LEAVES_CORPSE;
        assert!(flags.contains(DeathFlags::LEAVES_CORPSE));
        assert!(!flags.contains(DeathFlags::WAS_EXECUTED));
        flags.insert(DeathFlags::WAS_EXECUTED);
        assert_eq!(flags, DeathFlags::LEAVES_CORPSE | DeathFlags::WAS_EXECUTED);
        assert!(DeathFlags::NONE.is_empty());
    }
}
