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
//! # Combat Kernel
//!
//! A deterministic per-frame combat simulation kernel for many entities.
//!
//! ## Features
//!
//! - **Dense Storage**: entity handles map to contiguous slots shared by every
//!   stat and resource column, with O(1) lookup and swap-back removal
//! - **Request Pipeline**: gameplay code queues stat and resource changes;
//!   each frame resolves them in a fixed order of stages
//! - **Resource Flow**: fractional changes, resistances and spillover across
//!   an ordered list of pools
//! - **Timed Effects**: temporary stat changes and resource changes over time
//! - **Interceptors**: pluggable hooks such as shields at five pipeline points
//! - **Parallelization**: optional Rayon fan-out for large request batches
//!
//! ## Example
//!
//! ```rust
//! use combat_kernel::ecs::actions::{OrderOfModification, ResourceChangeRequest};
//! use combat_kernel::ecs::kinds::{DamageType, ResourceType};
//! use combat_kernel::ecs::templates::EntityDefinition;
//! use combat_kernel::{CombatWorld, KernelConfig};
//!
//! let knight = EntityDefinition::new("knight")
//!     .with_resource(ResourceType::Health, 10.0)
//!     .with_resource(ResourceType::Armor, 5.0);
//! let mut world = CombatWorld::with_defaults(KernelConfig::new(64), &[knight]).unwrap();
//!
//! let a = world.create_entity(0);
//! let b = world.create_entity(0);
//! world.tick(0.016);
//!
//! let hit = ResourceChangeRequest::damage(a, b, 8.0, DamageType::True)
//!     .with_order(OrderOfModification::armor_then_health());
//! world.enqueue_resource_change(hit);
//! world.tick(0.016);
//!
//! assert_eq!(world.resource_value(b, ResourceType::Armor), Some(0.0));
//! assert_eq!(world.resource_value(b, ResourceType::Health), Some(7.0));
//! ```

#![warn(missing_docs)]

/// Entity Component System implementation
pub mod ecs;

/// Built-in pipeline stages
pub mod systems;

/// Pluggable pipeline hooks
pub mod interceptors;

/// Kernel configuration and world manifests
pub mod config;

/// Error types
pub mod error;

pub mod death;
pub mod effects;

pub use config::{KernelConfig, WorldManifest};
pub use ecs::{CombatWorld, EntityId, FrameReport};
pub use error::{CombatError, CombatResult};
