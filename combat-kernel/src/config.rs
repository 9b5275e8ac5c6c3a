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
//! Kernel configuration and world manifests
//!
//! A manifest bundles the kernel sizing with the authored entity types:
//!
//! ```toml
//! [kernel]
//! entity_capacity = 128
//!
//! [[entity_types]]
//! name = "footman"
//! resource_stats = [100.0, 20.0]
//! starting_resources = [100.0, 20.0]
//! ```

use crate::ecs::templates::EntityDefinition;
use crate::ecs::CombatWorld;
use crate::error::{CombatError, CombatResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizing and tuning of one kernel instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Maximum number of simultaneously live entities
    pub entity_capacity: usize,
    /// Size of the entity handle space; twice the entity capacity when unset
    pub id_capacity: Option<usize>,
    /// Initial capacity of each per-frame request buffer
    pub initial_buffer_size: usize,
    /// Request count from which data-parallel stages fan out
    pub parallel_threshold: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            entity_capacity: 64,
            id_capacity: None,
            initial_buffer_size: 5,
            parallel_threshold: 1024,
        }
    }
}

impl KernelConfig {
    /// Configuration for a given entity capacity
    pub fn new(entity_capacity: usize) -> Self {
        KernelConfig {
            entity_capacity,
            ..KernelConfig::default()
        }
    }

    /// Set an explicit handle-space ceiling
    pub fn with_id_capacity(mut self, id_capacity: usize) -> Self {
        self.id_capacity = Some(id_capacity);
        self
    }

    /// Set the initial request buffer size
    pub fn with_initial_buffer_size(mut self, size: usize) -> Self {
        self.initial_buffer_size = size;
        self
    }

    /// Set the request count at which stages run in parallel
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Effective handle-space ceiling
    pub fn resolved_id_capacity(&self) -> usize {
        self.id_capacity
            .unwrap_or_else(|| self.entity_capacity.saturating_mul(2))
    }

    /// Check the values are usable
    pub fn validate(&self) -> CombatResult<()> {
        if self.entity_capacity == 0 {
            return Err(CombatError::InvalidConfig(
                "entity_capacity must be greater than zero".to_string(),
            ));
        }
        let id_capacity = self.resolved_id_capacity();
        if id_capacity < self.entity_capacity {
            return Err(CombatError::InvalidConfig(format!(
                "id_capacity ({}) is smaller than entity_capacity ({})",
                id_capacity, self.entity_capacity
            )));
        }
        if id_capacity > i32::MAX as usize {
            return Err(CombatError::InvalidConfig(format!(
                "id_capacity ({}) exceeds the handle range",
                id_capacity
            )));
        }
        if self.parallel_threshold == 0 {
            return Err(CombatError::InvalidConfig(
                "parallel_threshold must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Kernel configuration plus the ordered list of authored entity types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldManifest {
    /// Kernel sizing
    #[serde(default)]
    pub kernel: KernelConfig,
    /// Entity types, referenced by position at spawn
    #[serde(default)]
    pub entity_types: Vec<EntityDefinition>,
}

impl WorldManifest {
    /// Parse a manifest from TOML text
    pub fn from_toml_str(input: &str) -> CombatResult<Self> {
        let manifest: WorldManifest = toml::from_str(input)?;
        manifest.kernel.validate()?;
        Ok(manifest)
    }

    /// Read and parse a manifest file
    pub fn from_path<P: AsRef<Path>>(path: P) -> CombatResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Compile the entity types and build a world with the default
    /// interceptors registered
    pub fn build(&self) -> CombatResult<CombatWorld> {
        CombatWorld::with_defaults(self.kernel.clone(), &self.entity_types)
    }
}
