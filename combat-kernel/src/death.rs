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
//! Death requests and corpses

use crate::ecs::components::DeathFlags;
use crate::ecs::EntityId;

/// An entity found dead this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathRequest {
    /// Dead entity
    pub id: EntityId,
    /// Slot it occupied when the death was detected
    pub slot: usize,
    /// Death flags of the entity plus the cause bits of this death
    pub flags: DeathFlags,
}

/// Record kept for an entity whose type leaves a corpse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadEntity {
    /// Retired id
    pub id: EntityId,
    /// Slot the entity occupied at death
    pub original_slot: usize,
    /// Health capacity at death
    pub max_health: f32,
    /// Armor capacity at death
    pub max_armor: f32,
    /// Simulated time of death in seconds
    pub time_of_death: f64,
}

/// Per-frame death requests plus the persistent corpse list
#[derive(Debug, Clone, Default)]
pub struct DeathRegistry {
    requests: Vec<DeathRequest>,
    corpses: Vec<DeadEntity>,
}

impl DeathRegistry {
    /// Registry with an initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        DeathRegistry {
            requests: Vec::with_capacity(capacity),
            corpses: Vec::with_capacity(capacity),
        }
    }

    /// Queue a death for this frame
    pub fn push_request(&mut self, request: DeathRequest) {
        self.requests.push(request);
    }

    /// Deaths detected this frame
    pub fn requests(&self) -> &[DeathRequest] {
        &self.requests
    }

    /// Deaths detected this frame, mutable
    pub fn requests_mut(&mut self) -> &mut Vec<DeathRequest> {
        &mut self.requests
    }

    /// Order this frame's deaths by descending slot for batch removal
    pub fn sort_for_removal(&mut self) {
        self.requests.sort_by(|a, b| b.slot.cmp(&a.slot));
    }

    /// Keep a corpse
    pub fn push_corpse(&mut self, corpse: DeadEntity) {
        self.corpses.push(corpse);
    }

    /// Every corpse kept so far
    pub fn corpses(&self) -> &[DeadEntity] {
        &self.corpses
    }

    /// Forget every corpse; their ids stay retired
    pub fn clear_corpses(&mut self) -> Vec<DeadEntity> {
        std::mem::take(&mut self.corpses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_for_removal_is_descending() {
        let mut deaths = DeathRegistry::with_capacity(3);
        for (id, slot) in [(0, 1), (1, 4), (2, 2)] {
            deaths.push_request(DeathRequest {
                id: EntityId::new(id),
                slot,
                flags: DeathFlags::NONE,
            });
        }
        deaths.sort_for_removal();
        let slots: Vec<_> = deaths.requests().iter().map(|r| r.slot).collect();
        assert_eq!(slots, vec![4, 2, 1]);
    }

    #[test]
    fn test_clear_corpses_returns_records() {
        let mut deaths = DeathRegistry::default();
        deaths.push_corpse(DeadEntity {
            id: EntityId::new(3),
            original_slot: 0,
            max_health: 10.0,
            max_armor: 0.0,
            time_of_death: 1.5,
        });
        let cleared = deaths.clear_corpses();
        assert_eq!(cleared.len(), 1);
        assert!(deaths.corpses().is_empty());
    }
}
