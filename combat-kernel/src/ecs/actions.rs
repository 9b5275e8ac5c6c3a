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
//! Change requests, their results and the per-frame action register
//!
//! Every mutation of combat state is requested through the [`ActionRegister`].
//! Requests are appended during a frame, resolved by the pipeline stages and
//! cleared exactly once at frame end.

use crate::ecs::kinds::{DamageType, ResourceChangeType, ResourceType, StatChangeType, StatTarget};
use crate::ecs::EntityId;
use serde::{Deserialize, Serialize};

/// Maximum number of pools one resource change can walk
pub const MAX_ORDER_LEN: usize = 4;

/// Maximum number of pool changes recorded per resource change
pub const MAX_RESULT_ENTRIES: usize = 3;

/// A pending modifier on one stat of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatChangeRequest {
    /// Entity that caused the change
    pub origin: EntityId,
    /// Entity whose stat changes
    pub target: EntityId,
    /// Dense slot of the target, resolved during indexing
    #[serde(skip)]
    pub target_index: Option<usize>,
    /// Modifier amount
    pub value: f32,
    /// Which stat is modified
    pub stat: StatTarget,
    /// How the modifier is applied
    pub change_type: StatChangeType,
}

impl StatChangeRequest {
    /// Build an unresolved request
    pub fn new(
        origin: EntityId,
        target: EntityId,
        stat: impl Into<StatTarget>,
        change_type: StatChangeType,
        value: f32,
    ) -> Self {
        StatChangeRequest {
            origin,
            target,
            target_index: None,
            value,
            stat: stat.into(),
            change_type,
        }
    }

    /// The request that undoes this one
    ///
    /// Flat and additive changes negate; multiplicative changes use the
    /// reciprocal, which does not exist for a zero or non-finite factor.
    pub fn inverted(&self) -> Option<StatChangeRequest> {
        let value = match self.change_type {
            StatChangeType::Flat | StatChangeType::MultiplierAdditive => -self.value,
            StatChangeType::MultiplierMultiplicative => {
                if self.value == 0.0 || !self.value.is_finite() {
                    return None;
                }
                1.0 / self.value
            }
        };
        Some(StatChangeRequest { value, ..*self })
    }
}

/// Outcome of one applied stat change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatChangeResult {
    /// Entity whose stat changed
    pub target: EntityId,
    /// Which stat changed
    pub stat: StatTarget,
    /// Slot of the target when the change was applied
    pub target_index: usize,
    /// Change of the derived output
    pub delta: f32,
}

/// Ordered list of resource pools a change walks through
///
/// Holds at most [`MAX_ORDER_LEN`] entries; further pushes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderOfModification {
    pools: [ResourceType; MAX_ORDER_LEN],
    len: u8,
}

impl OrderOfModification {
    /// Empty order
    pub fn new() -> Self {
        OrderOfModification::default()
    }

    /// Only the health pool
    pub fn health() -> Self {
        OrderOfModification::from_slice(&[ResourceType::Health])
    }

    /// Armor first, then health
    pub fn armor_then_health() -> Self {
        OrderOfModification::from_slice(&[ResourceType::Armor, ResourceType::Health])
    }

    /// Build from pools in order, ignoring entries past the capacity
    pub fn from_slice(pools: &[ResourceType]) -> Self {
        let mut order = OrderOfModification::new();
        for &pool in pools {
            order.push(pool);
        }
        order
    }

    /// Append a pool; returns `false` and leaves the order unchanged when full
    pub fn push(&mut self, pool: ResourceType) -> bool {
        let len = self.len as usize;
        if len >= MAX_ORDER_LEN {
            return false;
        }
        self.pools[len] = pool;
        self.len += 1;
        true
    }

    /// Number of pools
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether no pool is listed
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pool at a position
    pub fn get(&self, index: usize) -> Option<ResourceType> {
        self.as_slice().get(index).copied()
    }

    /// Pools in order
    pub fn as_slice(&self) -> &[ResourceType] {
        &self.pools[..self.len as usize]
    }

    /// Iterate over the pools in order
    pub fn iter(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.as_slice().iter().copied()
    }
}

impl Serialize for OrderOfModification {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OrderOfModification {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pools = Vec::<ResourceType>::deserialize(deserializer)?;
        Ok(OrderOfModification::from_slice(&pools))
    }
}

/// Modifiers carried by a resource change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceChangeFlags(u8);

impl ResourceChangeFlags {
    /// No flags
    pub const NONE: ResourceChangeFlags = ResourceChangeFlags(0);
    /// The change reflects another change; passed through for interceptors
    pub const IS_REFLECTION_CHANGE: ResourceChangeFlags = ResourceChangeFlags(1);
    /// Skip the resistance stage
    pub const BYPASS_REDUCTIONS: ResourceChangeFlags = ResourceChangeFlags(2);
    /// Force health to zero after the change is applied
    pub const INSTANT_KILL: ResourceChangeFlags = ResourceChangeFlags(4);

    /// Whether every bit of `other` is set
    pub fn contains(&self, other: ResourceChangeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`
    pub fn insert(&mut self, other: ResourceChangeFlags) {
        self.0 |= other.0;
    }

    /// Raw bits
    pub fn bits(&self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for ResourceChangeFlags {
    type Output = ResourceChangeFlags;

    fn bitor(self, rhs: ResourceChangeFlags) -> ResourceChangeFlags {
        ResourceChangeFlags(self.0 | rhs.0)
    }
}

/// A pending change to the resource pools of one entity
///
/// Negative values damage, positive values restore.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceChangeRequest {
    /// Entity that caused the change
    pub origin: EntityId,
    /// Entity whose resources change
    pub target: EntityId,
    /// Dense slot of the target, resolved during indexing
    #[serde(skip)]
    pub target_index: Option<usize>,
    /// Amount, interpreted according to `change_type`
    pub value: f32,
    /// Pools to drain or fill, in order
    pub order: OrderOfModification,
    /// How `value` is interpreted
    pub change_type: ResourceChangeType,
    /// Reference pool for fractional changes
    pub change_type_target: ResourceType,
    /// Damage type selecting the resistance
    pub damage_type: DamageType,
    /// Modifiers
    pub flags: ResourceChangeFlags,
}

impl ResourceChangeRequest {
    /// Flat change of `value` to the health pool
    pub fn new(origin: EntityId, target: EntityId, value: f32) -> Self {
        ResourceChangeRequest {
            origin,
            target,
            target_index: None,
            value,
            order: OrderOfModification::health(),
            change_type: ResourceChangeType::Flat,
            change_type_target: ResourceType::Health,
            damage_type: DamageType::Physical,
            flags: ResourceChangeFlags::NONE,
        }
    }

    /// Flat damage of `amount` of a damage type
    pub fn damage(origin: EntityId, target: EntityId, amount: f32, damage_type: DamageType) -> Self {
        ResourceChangeRequest {
            damage_type,
            ..ResourceChangeRequest::new(origin, target, -amount.abs())
        }
    }

    /// Flat restoration of `amount`
    pub fn heal(origin: EntityId, target: EntityId, amount: f32) -> Self {
        ResourceChangeRequest::new(origin, target, amount.abs())
    }

    /// Set the pool order
    pub fn with_order(mut self, order: OrderOfModification) -> Self {
        self.order = order;
        self
    }

    /// Interpret the value as a fraction of a reference pool
    pub fn with_change_type(mut self, change_type: ResourceChangeType, reference: ResourceType) -> Self {
        self.change_type = change_type;
        self.change_type_target = reference;
        self
    }

    /// Set the damage type
    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    /// Add flags
    pub fn with_flags(mut self, flags: ResourceChangeFlags) -> Self {
        self.flags.insert(flags);
        self
    }
}

/// One recorded pool change
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceEntry {
    /// Pool that changed
    pub resource: ResourceType,
    /// Value before the change
    pub from: f32,
    /// Value after the change
    pub to: f32,
}

/// Outcome of one applied resource change
///
/// Records up to [`MAX_RESULT_ENTRIES`] pools whose value actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceChangeResult {
    /// Entity that caused the change
    pub origin: EntityId,
    /// Entity whose resources changed
    pub target: EntityId,
    /// Slot of the target when the change was applied
    pub target_index: usize,
    /// Flags of the request
    pub flags: ResourceChangeFlags,
    entries: [ResourceEntry; MAX_RESULT_ENTRIES],
    count: u8,
}

impl ResourceChangeResult {
    /// Empty result for a request
    pub fn for_request(request: &ResourceChangeRequest, target_index: usize) -> Self {
        ResourceChangeResult {
            origin: request.origin,
            target: request.target,
            target_index,
            flags: request.flags,
            ..ResourceChangeResult::default()
        }
    }

    /// Record a pool change; entries past the cap are dropped
    pub fn add(&mut self, resource: ResourceType, from: f32, to: f32) {
        let count = self.count as usize;
        if count >= MAX_RESULT_ENTRIES {
            return;
        }
        self.entries[count] = ResourceEntry { resource, from, to };
        self.count += 1;
    }

    /// Recorded pool changes
    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries[..self.count as usize]
    }

    /// Recorded change of a specific pool
    pub fn entry(&self, resource: ResourceType) -> Option<&ResourceEntry> {
        self.entries().iter().find(|e| e.resource == resource)
    }

    /// Sum of `to - from` over the recorded entries
    pub fn total_change(&self) -> f32 {
        self.entries().iter().map(|e| e.to - e.from).sum()
    }
}

/// Per-frame request and result queues
#[derive(Debug, Clone, Default)]
pub struct ActionRegister {
    stat_requests: Vec<StatChangeRequest>,
    stat_results: Vec<StatChangeResult>,
    resource_requests: Vec<ResourceChangeRequest>,
    resource_results: Vec<ResourceChangeResult>,
}

impl ActionRegister {
    /// Queues with an initial capacity each
    pub fn with_capacity(capacity: usize) -> Self {
        ActionRegister {
            stat_requests: Vec::with_capacity(capacity),
            stat_results: Vec::with_capacity(capacity),
            resource_requests: Vec::with_capacity(capacity),
            resource_results: Vec::with_capacity(capacity),
        }
    }

    /// Queue a stat change
    pub fn push_stat_change(&mut self, request: StatChangeRequest) {
        self.stat_requests.push(request);
    }

    /// Queue a resource change
    pub fn push_resource_change(&mut self, request: ResourceChangeRequest) {
        self.resource_requests.push(request);
    }

    /// Queued stat changes
    pub fn stat_requests(&self) -> &[StatChangeRequest] {
        &self.stat_requests
    }

    /// Queued stat changes, mutable
    pub fn stat_requests_mut(&mut self) -> &mut Vec<StatChangeRequest> {
        &mut self.stat_requests
    }

    /// Queued resource changes
    pub fn resource_requests(&self) -> &[ResourceChangeRequest] {
        &self.resource_requests
    }

    /// Queued resource changes, mutable
    pub fn resource_requests_mut(&mut self) -> &mut Vec<ResourceChangeRequest> {
        &mut self.resource_requests
    }

    /// Stat results of this frame
    pub fn stat_results(&self) -> &[StatChangeResult] {
        &self.stat_results
    }

    /// Stat results of this frame, mutable
    pub fn stat_results_mut(&mut self) -> &mut Vec<StatChangeResult> {
        &mut self.stat_results
    }

    /// Resource results of this frame
    pub fn resource_results(&self) -> &[ResourceChangeResult] {
        &self.resource_results
    }

    /// Resource results of this frame, mutable
    pub fn resource_results_mut(&mut self) -> &mut Vec<ResourceChangeResult> {
        &mut self.resource_results
    }

    /// Stat requests alongside the stat result queue
    pub fn stat_requests_and_results(&mut self) -> (&[StatChangeRequest], &mut Vec<StatChangeResult>) {
        (&self.stat_requests, &mut self.stat_results)
    }

    /// Resource requests alongside the resource result queue
    pub fn resource_requests_and_results(
        &mut self,
    ) -> (&[ResourceChangeRequest], &mut Vec<ResourceChangeResult>) {
        (&self.resource_requests, &mut self.resource_results)
    }

    /// Drop queued requests against an entity
    pub fn purge_entity(&mut self, id: EntityId) {
        self.stat_requests.retain(|r| r.target != id);
        self.resource_requests.retain(|r| r.target != id);
    }

    /// Clear every queue, keeping capacity
    pub fn clear(&mut self) {
        self.stat_requests.clear();
        self.stat_results.clear();
        self.resource_requests.clear();
        self.resource_results.clear();
    }

    /// Clear results and every request the pipeline resolved
    ///
    /// Requests queued after the indexing stage never received a slot and
    /// stay queued for the next frame. Returns how many were kept.
    pub fn clear_processed(&mut self) -> usize {
        self.stat_requests.retain(|r| r.target_index.is_none());
        self.resource_requests.retain(|r| r.target_index.is_none());
        self.stat_results.clear();
        self.resource_results.clear();
        self.stat_requests.len() + self.resource_requests.len()
    }

    /// Whether every queue is empty
    pub fn is_empty(&self) -> bool {
        self.stat_requests.is_empty()
            && self.stat_results.is_empty()
            && self.resource_requests.is_empty()
            && self.resource_results.is_empty()
    }
}
