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
//! Entity type templates
//!
//! Authored [`EntityDefinition`]s are compiled once into immutable
//! [`EntityTypeData`] and referenced by index at spawn time.

use crate::ecs::component::ColumnKey;
use crate::ecs::components::DeathFlags;
use crate::ecs::kinds::{CombatStatType, ResistanceStatType, ResourceStatType, ResourceType};
use crate::ecs::EntityId;
use crate::error::{CombatError, CombatResult};
use serde::{Deserialize, Serialize};

/// Authoring form of an entity type
///
/// Stat lists are in enum order and may be shorter than the enum; missing
/// entries are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDefinition {
    /// Display name
    pub name: String,
    /// Keep a corpse record and retire the id on death
    pub leaves_corpse: bool,
    /// Base values of the resource capacity stats
    pub resource_stats: Vec<f32>,
    /// Base values of the combat stats
    pub combat_stats: Vec<f32>,
    /// Base values of the resistance stats
    pub resistance_stats: Vec<f32>,
    /// Starting values of each resource pool, clamped to its max
    pub starting_resources: Vec<f32>,
}

impl EntityDefinition {
    /// Definition with only a name
    pub fn new(name: impl Into<String>) -> Self {
        EntityDefinition {
            name: name.into(),
            ..EntityDefinition::default()
        }
    }

    /// Set the base value of a resource capacity stat and fill the pool
    pub fn with_resource(mut self, resource: ResourceType, max: f32) -> Self {
        set_padded(&mut self.resource_stats, resource.index(), max);
        set_padded(&mut self.starting_resources, resource.index(), max);
        self
    }

    /// Set the base value of a combat stat
    pub fn with_combat_stat(mut self, stat: CombatStatType, value: f32) -> Self {
        set_padded(&mut self.combat_stats, stat.index(), value);
        self
    }

    /// Set the base value of a resistance stat
    pub fn with_resistance(mut self, stat: ResistanceStatType, value: f32) -> Self {
        set_padded(&mut self.resistance_stats, stat.index(), value);
        self
    }

    /// Set the starting value of a resource independently of its max
    pub fn with_starting(mut self, resource: ResourceType, value: f32) -> Self {
        set_padded(&mut self.starting_resources, resource.index(), value);
        self
    }

    /// Keep a corpse on death
    pub fn with_corpse(mut self) -> Self {
        self.leaves_corpse = true;
        self
    }
}

fn set_padded(values: &mut Vec<f32>, index: usize, value: f32) {
    if values.len() <= index {
        values.resize(index + 1, 0.0);
    }
    values[index] = value;
}

fn pad<const N: usize>(name: &str, field: &str, values: &[f32]) -> CombatResult<[f32; N]> {
    if values.len() > N {
        return Err(CombatError::InvalidTemplate {
            name: name.to_string(),
            reason: format!("{} has {} entries, expected at most {}", field, values.len(), N),
        });
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(CombatError::InvalidTemplate {
            name: name.to_string(),
            reason: format!("{} contains non-finite value {}", field, bad),
        });
    }
    let mut out = [0.0; N];
    out[..values.len()].copy_from_slice(values);
    Ok(out)
}

/// Compiled, immutable entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTypeData {
    /// Display name
    pub name: String,
    /// Death behavior copied onto every spawned entity
    pub death_flags: DeathFlags,
    /// Resource capacity stat bases, by [`ResourceStatType`]
    pub resource_stats: [f32; 4],
    /// Combat stat bases, by [`CombatStatType`]
    pub combat_stats: [f32; 4],
    /// Resistance stat bases, by [`ResistanceStatType`]
    pub resistance_stats: [f32; 3],
    /// Starting pool values, by [`ResourceType`]
    pub starting_resources: [f32; 4],
}

impl EntityTypeData {
    /// Compile one definition
    pub fn compile(def: &EntityDefinition) -> CombatResult<Self> {
        let name = def.name.as_str();
        Ok(EntityTypeData {
            name: def.name.clone(),
            death_flags: if def.leaves_corpse {
                DeathFlags::LEAVES_CORPSE
            } else {
                DeathFlags::NONE
            },
            resource_stats: pad(name, "resource_stats", &def.resource_stats)?,
            combat_stats: pad(name, "combat_stats", &def.combat_stats)?,
            resistance_stats: pad(name, "resistance_stats", &def.resistance_stats)?,
            starting_resources: pad(name, "starting_resources", &def.starting_resources)?,
        })
    }
}

/// Read-only list of compiled entity types
#[derive(Debug, Clone, Default)]
pub struct EntityTypeRegistry {
    types: Vec<EntityTypeData>,
}

impl EntityTypeRegistry {
    /// Compile every definition in order
    pub fn build(definitions: &[EntityDefinition]) -> CombatResult<Self> {
        let types = definitions
            .iter()
            .map(EntityTypeData::compile)
            .collect::<CombatResult<Vec<_>>>()?;
        Ok(EntityTypeRegistry { types })
    }

    /// Type at an index
    pub fn get(&self, index: usize) -> Option<&EntityTypeData> {
        self.types.get(index)
    }

    /// Index of the first type with this name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.types.iter().position(|t| t.name == name)
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// An entity waiting for its template to be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingInit {
    /// Entity to initialize
    pub id: EntityId,
    /// Template index
    pub type_index: usize,
}
