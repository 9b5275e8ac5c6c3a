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
//! Death detection and compaction
//!
//! Death is derived from this frame's resource results: the first result
//! leaving its target at or below zero health is the canonical death of that
//! entity, later ones are ignored. The dead are then removed in one batch
//! in descending slot order so that no slot moved by an earlier removal is
//! stale when a later removal runs.

use crate::death::{DeadEntity, DeathRequest};
use crate::ecs::actions::ResourceChangeFlags;
use crate::ecs::components::DeathFlags;
use crate::ecs::kinds::ResourceType;
use crate::ecs::{CombatWorld, EntityId, System};
use log::debug;
use std::collections::HashSet;

/// Detects deaths, keeps corpses and removes the dead from every column
pub struct DeathSystem;

impl System for DeathSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        if detect_deaths(world) == 0 {
            return;
        }
        remove_dead(world);
    }
}

/// Queue a death request per entity killed this frame
///
/// Returns the number of deaths found.
fn detect_deaths(world: &mut CombatWorld) -> usize {
    let results = world.actions.resource_results();
    if results.is_empty() {
        return 0;
    }

    let executed: HashSet<EntityId> = results
        .iter()
        .filter(|r| r.flags.contains(ResourceChangeFlags::INSTANT_KILL))
        .map(|r| r.target)
        .collect();
    let mut seen = HashSet::with_capacity(results.len());
    let mut found = 0;

    for result in results {
        // A mid-frame removal may have moved the target since the result
        // was recorded
        let Some(slot) = world.entities.index_of(result.target) else {
            continue;
        };
        let health = world.stats.resource(ResourceType::Health, slot);
        if health.value > 0.0 || !seen.insert(result.target) {
            continue;
        }

        let mut flags = world.stats.death_flags(slot);
        if executed.contains(&result.target) {
            flags.insert(DeathFlags::WAS_EXECUTED);
        }
        world.deaths.push_request(DeathRequest {
            id: result.target,
            slot,
            flags,
        });

        if flags.contains(DeathFlags::LEAVES_CORPSE) {
            world.deaths.push_corpse(DeadEntity {
                id: result.target,
                original_slot: slot,
                max_health: health.max,
                max_armor: world.stats.resource(ResourceType::Armor, slot).max,
                time_of_death: world.elapsed,
            });
        }
        found += 1;
    }
    found
}

/// Remove every entity in this frame's death requests
fn remove_dead(world: &mut CombatWorld) {
    world.deaths.sort_for_removal();
    let ids: Vec<EntityId> = world.deaths.requests().iter().map(|r| r.id).collect();

    for removed in world.entities.free_many(&ids) {
        if let Some(moved_from) = removed.moved_from {
            world.stats.swap_back(removed.removed_index, moved_from);
        }
    }

    for request in world.deaths.requests() {
        let corpse = request.flags.contains(DeathFlags::LEAVES_CORPSE);
        if !corpse {
            world.entities.recycle(request.id);
        }
        let effects = world.effects.remove_entity(request.id);
        let payloads = world.interceptors.remove_entity(request.id);
        debug!(
            "{} died at slot {} ({}, corpse: {}, {} effects and {} payloads dropped)",
            request.id, request.slot, request.flags, corpse, effects, payloads
        );
    }
}
