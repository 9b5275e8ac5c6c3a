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
//! Interceptor API traits and context
//!
//! Interceptors are gameplay hooks that modify in-flight requests at fixed
//! points of the frame pipeline. Each one owns a per-entity payload store and
//! declares the [`Capability`] points it runs at.
//!
//! # Contracts
//!
//! Interceptors must:
//! - Only rewrite requests already queued; they cannot enqueue new ones
//! - Leave requests of entities they hold no payload for untouched
//! - Accept or reject payloads in [`Interceptor::add`] without panicking

use crate::ecs::actions::{
    ActionRegister, ResourceChangeRequest, ResourceChangeResult, StatChangeRequest,
    StatChangeResult,
};
use crate::ecs::kinds::DamageType;
use crate::ecs::registry::StatRegistry;
use crate::ecs::{EntityId, EntityMap};
use crate::error::CombatResult;
use std::any::Any;
use std::collections::HashMap;

/// Version of the interceptor API
///
/// Interceptors report the version they were built against; registration
/// rejects incompatible versions. Format: MAJOR.MINOR.PATCH.
pub const INTERCEPTOR_API_VERSION: &str = "0.1.0";

/// Pipeline points an interceptor can run at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// After fractional changes are flattened, before resistances
    ResourceBeforeResist,
    /// After resistances, before pools are modified
    ResourceBeforeApplication,
    /// After pools are modified, before death detection
    ResourceAfterApplication,
    /// Before stat changes are applied
    StatBeforeApplication,
    /// After stat changes are applied
    StatAfterApplication,
}

impl Capability {
    /// Every capability
    pub const ALL: [Capability; 5] = [
        Capability::ResourceBeforeResist,
        Capability::ResourceBeforeApplication,
        Capability::ResourceAfterApplication,
        Capability::StatBeforeApplication,
        Capability::StatAfterApplication,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Per-entity data held by an interceptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterceptorPayload {
    /// Remaining damage a shield stack absorbs
    Absorb {
        /// Absorb amount left
        amount: f32,
    },
    /// Scale damage of one type after resistances
    DamageTaken {
        /// Damage type affected
        damage_type: DamageType,
        /// Factor applied to the damage
        multiplier: f32,
    },
    /// Free-form values for interceptors outside this crate
    Custom([f32; 3]),
}

/// Multi-valued map from entity to payloads, in insertion order per entity
#[derive(Debug, Clone, Default)]
pub struct PayloadStore {
    map: HashMap<EntityId, Vec<InterceptorPayload>>,
}

impl PayloadStore {
    /// Create an empty store
    pub fn new() -> Self {
        PayloadStore::default()
    }

    /// Append a payload for an entity
    pub fn add(&mut self, id: EntityId, payload: InterceptorPayload) {
        self.map.entry(id).or_default().push(payload);
    }

    /// Drop every payload of an entity, returning how many were held
    pub fn remove(&mut self, id: EntityId) -> usize {
        self.map.remove(&id).map_or(0, |v| v.len())
    }

    /// Payloads of an entity
    pub fn get(&self, id: EntityId) -> &[InterceptorPayload] {
        self.map.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Mutable payload list of an entity
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Vec<InterceptorPayload>> {
        self.map.get_mut(&id)
    }

    /// Remove the entry of an entity once its list is empty
    pub fn prune(&mut self, id: EntityId) {
        if self.map.get(&id).map_or(false, |v| v.is_empty()) {
            self.map.remove(&id);
        }
    }

    /// Whether an entity holds any payload
    pub fn contains(&self, id: EntityId) -> bool {
        self.map.contains_key(&id)
    }

    /// Number of entities holding payloads
    pub fn entity_count(&self) -> usize {
        self.map.len()
    }

    /// Whether no payload is held
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Scoped access to frame state handed to interceptors
///
/// Requests may be rewritten in place; the columns, the entity map and the
/// results are read-only.
pub struct InterceptorContext<'a> {
    actions: &'a mut ActionRegister,
    stats: &'a StatRegistry,
    entities: &'a EntityMap,
    delta_time: f32,
}

impl<'a> InterceptorContext<'a> {
    /// Only the pipeline builds contexts.
    pub(crate) fn new(
        actions: &'a mut ActionRegister,
        stats: &'a StatRegistry,
        entities: &'a EntityMap,
        delta_time: f32,
    ) -> Self {
        InterceptorContext {
            actions,
            stats,
            entities,
            delta_time,
        }
    }

    /// Queued resource changes
    pub fn resource_requests(&self) -> &[ResourceChangeRequest] {
        self.actions.resource_requests()
    }

    /// Queued resource changes, rewritable in place
    pub fn resource_requests_mut(&mut self) -> &mut [ResourceChangeRequest] {
        self.actions.resource_requests_mut().as_mut_slice()
    }

    /// Queued stat changes
    pub fn stat_requests(&self) -> &[StatChangeRequest] {
        self.actions.stat_requests()
    }

    /// Queued stat changes, rewritable in place
    pub fn stat_requests_mut(&mut self) -> &mut [StatChangeRequest] {
        self.actions.stat_requests_mut().as_mut_slice()
    }

    /// Resource results produced so far this frame
    pub fn resource_results(&self) -> &[ResourceChangeResult] {
        self.actions.resource_results()
    }

    /// Stat results produced so far this frame
    pub fn stat_results(&self) -> &[StatChangeResult] {
        self.actions.stat_results()
    }

    /// Read-only column access
    pub fn stats(&self) -> &StatRegistry {
        self.stats
    }

    /// Read-only entity map
    pub fn entities(&self) -> &EntityMap {
        self.entities
    }

    /// Seconds simulated by this frame
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }
}

/// A pluggable pipeline hook
///
/// # Example
///
/// ```
/// use combat_kernel::ecs::EntityId;
/// use combat_kernel::error::CombatResult;
/// use combat_kernel::interceptors::{
///     Capability, Interceptor, InterceptorContext, InterceptorPayload, PayloadStore,
/// };
/// use std::any::Any;
///
/// #[derive(Default)]
/// struct Thorns {
///     store: PayloadStore,
/// }
///
/// impl Interceptor for Thorns {
///     fn name(&self) -> &str {
///         "thorns"
///     }
///
///     fn capabilities(&self) -> &[Capability] {
///         &[Capability::ResourceAfterApplication]
///     }
///
///     fn update(&mut self, _capability: Capability, _context: &mut InterceptorContext<'_>) {}
///
///     fn add(&mut self, id: EntityId, payload: InterceptorPayload) -> CombatResult<()> {
///         self.store.add(id, payload);
///         Ok(())
///     }
///
///     fn remove(&mut self, id: EntityId) -> usize {
///         self.store.remove(id)
///     }
///
///     fn payloads(&self, id: EntityId) -> &[InterceptorPayload] {
///         self.store.get(id)
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn Any {
///         self
///     }
/// }
/// ```
pub trait Interceptor: Send + Sync {
    /// Unique name
    fn name(&self) -> &str;

    /// Interceptor API version this hook was built against
    fn api_version(&self) -> &str {
        INTERCEPTOR_API_VERSION
    }

    /// Pipeline points this hook runs at
    fn capabilities(&self) -> &[Capability];

    /// Run at one of the declared pipeline points
    fn update(&mut self, capability: Capability, context: &mut InterceptorContext<'_>);

    /// Attach a payload to an entity
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CombatError::RejectedPayload`] for payload
    /// kinds or values the interceptor does not handle.
    fn add(&mut self, id: EntityId, payload: InterceptorPayload) -> CombatResult<()>;

    /// Drop every payload of an entity, returning how many were held
    fn remove(&mut self, id: EntityId) -> usize;

    /// Payloads currently held for an entity
    fn payloads(&self, id: EntityId) -> &[InterceptorPayload];

    /// Allow downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Allow mutable downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
