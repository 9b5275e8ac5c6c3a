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
//! Entity identifiers and the id <-> dense slot map
//!
//! Entities are opaque handles. Every live entity occupies exactly one slot in
//! `[0, len)` of every per-entity column; the [`EntityMap`] keeps the two-way
//! mapping between handles and slots and recycles freed handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle for a combat entity
///
/// `-1` is the invalid sentinel returned when allocation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(i32);

impl EntityId {
    /// The invalid sentinel handle
    pub const INVALID: EntityId = EntityId(-1);

    /// Create an EntityId from a raw value
    pub fn new(raw: i32) -> Self {
        EntityId(raw)
    }

    /// Get the raw value
    pub fn raw(&self) -> i32 {
        self.0
    }

    /// Whether this handle is not the invalid sentinel
    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }

    fn as_index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId::INVALID
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Outcome of removing one entity from the dense arrays
///
/// `moved_from` is the slot whose data was copied into `removed_index`, or
/// `None` when the removed entity already sat in the last slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedEntity {
    /// The handle that was removed
    pub id: EntityId,
    /// The slot the entity occupied
    pub removed_index: usize,
    /// The former last slot moved into `removed_index`
    pub moved_from: Option<usize>,
}

/// Bidirectional map between entity handles and dense slots
///
/// Capacity is fixed at construction. Fresh handles are handed out in
/// increasing order up to the id ceiling; freed handles that were recycled
/// are reused LIFO before any fresh handle.
#[derive(Debug, Clone)]
pub struct EntityMap {
    id_to_index: Vec<Option<usize>>,
    index_to_id: Vec<EntityId>,
    free_ids: Vec<EntityId>,
    count: usize,
    next_id: i32,
}

impl EntityMap {
    /// Create a map holding up to `entity_capacity` live entities with handles
    /// in `[0, id_capacity)`
    ///
    /// # Panics
    ///
    /// Panics if `id_capacity` is smaller than `entity_capacity` or does not
    /// fit the handle range.
    pub fn new(entity_capacity: usize, id_capacity: usize) -> Self {
        assert!(
            id_capacity >= entity_capacity,
            "Id capacity must be at least the entity capacity"
        );
        assert!(
            id_capacity <= i32::MAX as usize,
            "Id capacity exceeds the handle range"
        );

        EntityMap {
            id_to_index: vec![None; id_capacity],
            index_to_id: vec![EntityId::INVALID; entity_capacity],
            free_ids: Vec::with_capacity(entity_capacity),
            count: 0,
            next_id: 0,
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no entity is alive
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of simultaneously live entities
    pub fn capacity(&self) -> usize {
        self.index_to_id.len()
    }

    /// Size of the handle space
    pub fn id_capacity(&self) -> usize {
        self.id_to_index.len()
    }

    /// Number of recycled handles waiting for reuse
    pub fn free_id_count(&self) -> usize {
        self.free_ids.len()
    }

    /// Allocate a handle and the next dense slot
    ///
    /// Returns `None` when either the slot capacity or the handle space is
    /// exhausted. Nothing is modified in that case.
    pub fn allocate(&mut self) -> Option<(EntityId, usize)> {
        if self.count >= self.capacity() {
            return None;
        }

        let id = match self.free_ids.pop() {
            Some(id) => id,
            None => {
                if self.next_id as usize >= self.id_capacity() {
                    return None;
                }
                let id = EntityId(self.next_id);
                self.next_id += 1;
                id
            }
        };

        let slot = self.count;
        self.id_to_index[id.0 as usize] = Some(slot);
        self.index_to_id[slot] = id;
        self.count += 1;
        Some((id, slot))
    }

    /// Remove an entity with swap-back
    ///
    /// The last live slot is moved into the vacated one. The handle is not
    /// recycled; call [`EntityMap::recycle`] once the caller decides it may be
    /// reused. Returns `None` if the handle is not alive.
    pub fn free(&mut self, id: EntityId) -> Option<RemovedEntity> {
        let removed_index = self.index_of(id)?;
        let last_index = self.count - 1;
        let mut moved_from = None;

        if removed_index != last_index {
            let last_id = self.index_to_id[last_index];
            self.index_to_id[removed_index] = last_id;
            self.id_to_index[last_id.0 as usize] = Some(removed_index);
            moved_from = Some(last_index);
        }

        self.id_to_index[id.0 as usize] = None;
        self.index_to_id[last_index] = EntityId::INVALID;
        self.count -= 1;

        Some(RemovedEntity {
            id,
            removed_index,
            moved_from,
        })
    }

    /// Remove many entities in one pass
    ///
    /// `ids` must be ordered by descending slot so that no slot moved by an
    /// earlier removal is itself removed later in the batch. Handles that are
    /// not alive are skipped.
    pub fn free_many(&mut self, ids: &[EntityId]) -> Vec<RemovedEntity> {
        debug_assert!(
            ids.windows(2).all(|w| {
                match (self.index_of(w[0]), self.index_of(w[1])) {
                    (Some(a), Some(b)) => a > b,
                    _ => true,
                }
            }),
            "free_many requires ids sorted by descending slot"
        );

        ids.iter().filter_map(|&id| self.free(id)).collect()
    }

    /// Return a freed handle to the free list
    pub fn recycle(&mut self, id: EntityId) {
        debug_assert!(!self.is_alive(id), "Cannot recycle a live {}", id);
        debug_assert!(!self.free_ids.contains(&id), "{} recycled twice", id);
        if id.as_index().map_or(false, |i| i < self.id_capacity()) {
            self.free_ids.push(id);
        }
    }

    /// Dense slot of a live entity
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        let raw = id.as_index()?;
        self.id_to_index.get(raw).copied().flatten()
    }

    /// Handle stored in a slot, or [`EntityId::INVALID`] outside `[0, len)`
    pub fn id_of(&self, index: usize) -> EntityId {
        if index < self.count {
            self.index_to_id[index]
        } else {
            EntityId::INVALID
        }
    }

    /// Whether the handle refers to a live entity
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Live handles in slot order
    pub fn ids(&self) -> &[EntityId] {
        &self.index_to_id[..self.count]
    }

    /// Check that both directions of the map agree
    ///
    /// Every slot in `[0, len)` must map back to itself and exactly `len`
    /// handles may be mapped.
    pub fn is_consistent(&self) -> bool {
        let slots_ok = self
            .ids()
            .iter()
            .enumerate()
            .all(|(slot, id)| self.index_of(*id) == Some(slot));
        let mapped = self.id_to_index.iter().filter(|i| i.is_some()).count();
        slots_ok && mapped == self.count
    }
}
