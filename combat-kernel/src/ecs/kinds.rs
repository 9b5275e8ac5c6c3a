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
//! Closed enumerations that key the per-entity columns

use crate::ecs::component::ColumnKey;
use serde::{Deserialize, Serialize};

/// Declare a closed enumeration usable as a column key
///
/// Variants are numbered from zero in declaration order; `ALL` lists them in
/// that order so `ALL[k.index()] == k` holds for every variant.
macro_rules! column_key {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl ColumnKey for $name {
            const ALL: &'static [Self] = &[ $( $name::$variant ),+ ];

            #[inline]
            fn index(self) -> usize {
                self as usize
            }
        }
    };
}

column_key! {
    /// Resource pools every entity carries
    pub enum ResourceType {
        /// Hit points; reaching zero kills the entity
        Health,
        /// Absorbing layer usually drained before health
        Armor,
        /// Mana, energy or similar
        PrimaryResource,
        /// Secondary class resource
        SecondaryResource,
    }
}

column_key! {
    /// Stats that set the capacity of a resource pool
    pub enum ResourceStatType {
        /// Capacity of [`ResourceType::Health`]
        MaxHealth,
        /// Capacity of [`ResourceType::Armor`]
        MaxArmor,
        /// Capacity of [`ResourceType::PrimaryResource`]
        MaxPrimaryResource,
        /// Capacity of [`ResourceType::SecondaryResource`]
        MaxSecondaryResource,
    }
}

column_key! {
    /// Offensive stats materialized in the combat stat block
    pub enum CombatStatType {
        /// Attack power
        AttackPower,
        /// Haste
        Haste,
        /// Critical strike chance
        CritChance,
        /// Critical strike damage multiplier
        CritMultiplier,
    }
}

column_key! {
    /// Stats that feed the resistance curve of one damage type
    pub enum ResistanceStatType {
        /// Resistance against [`DamageType::Physical`]
        Physical,
        /// Resistance against [`DamageType::Magical`]
        Magical,
        /// Resistance against [`DamageType::True`]
        True,
    }
}

column_key! {
    /// Damage types, one per resistance stat
    pub enum DamageType {
        /// Physical damage
        Physical,
        /// Magical damage
        Magical,
        /// True damage
        True,
    }
}

impl ResourceStatType {
    /// The resource whose maximum this stat sets
    pub fn resource(self) -> ResourceType {
        ResourceType::ALL[self.index()]
    }
}

impl ResistanceStatType {
    /// The damage type this stat resists
    pub fn damage_type(self) -> DamageType {
        DamageType::ALL[self.index()]
    }
}

impl Default for ResourceType {
    fn default() -> Self {
        ResourceType::Health
    }
}

impl Default for DamageType {
    fn default() -> Self {
        DamageType::Physical
    }
}

/// Category a [`StatTarget`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatCategory {
    /// Resource capacity stats
    Resource,
    /// Combat stats
    CombatStat,
    /// Resistance stats
    Resistance,
}

/// One (category, sub-index) stat cell of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatTarget {
    /// A resource capacity stat
    Resource(ResourceStatType),
    /// A combat stat
    Combat(CombatStatType),
    /// A resistance stat
    Resistance(ResistanceStatType),
}

impl StatTarget {
    /// Category of the target
    pub fn category(&self) -> StatCategory {
        match self {
            StatTarget::Resource(_) => StatCategory::Resource,
            StatTarget::Combat(_) => StatCategory::CombatStat,
            StatTarget::Resistance(_) => StatCategory::Resistance,
        }
    }

    /// Position of the target inside its category
    pub fn sub_index(&self) -> usize {
        match self {
            StatTarget::Resource(s) => s.index(),
            StatTarget::Combat(s) => s.index(),
            StatTarget::Resistance(s) => s.index(),
        }
    }
}

impl From<ResourceStatType> for StatTarget {
    fn from(stat: ResourceStatType) -> Self {
        StatTarget::Resource(stat)
    }
}

impl From<CombatStatType> for StatTarget {
    fn from(stat: CombatStatType) -> Self {
        StatTarget::Combat(stat)
    }
}

impl From<ResistanceStatType> for StatTarget {
    fn from(stat: ResistanceStatType) -> Self {
        StatTarget::Resistance(stat)
    }
}

/// How a stat change modifies the raw stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatChangeType {
    /// Added to the flat bonus
    Flat,
    /// Multiplied into the multiplicative multiplier
    MultiplierMultiplicative,
    /// Added to the additive multiplier
    MultiplierAdditive,
}

/// How the value of a resource change is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceChangeType {
    /// Absolute amount
    Flat,
    /// Fraction of the reference resource's maximum
    FractionOfMax,
    /// Fraction of the reference resource's current value
    FractionOfCurrent,
}
