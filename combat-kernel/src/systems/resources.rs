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
//! Resource change resolution
//!
//! A resource change passes three steps, each one a separate system so that
//! interceptors can run between them:
//!
//! 1. **Flatten**: fractional changes become flat amounts, read from the
//!    reference pool as it was before any change of this frame was applied.
//! 2. **Resist**: damage is reduced by the target's resistance to its damage
//!    type. Restoration is never reduced.
//! 3. **Apply**: the amount walks the pool order. Each pool absorbs what it
//!    can within `[0, max]` and the remainder spills to the next pool.
//!    Whatever is left after the last pool is discarded.
//!
//! Flatten and resist only read the columns and write nothing but their own
//! request, so they fan out to the rayon pool for large batches. Application
//! stays sequential: two requests may hit the same pools.

use crate::ecs::actions::{ResourceChangeFlags, ResourceChangeRequest, ResourceChangeResult};
use crate::ecs::kinds::{ResourceChangeType, ResourceType};
use crate::ecs::registry::StatRegistry;
use crate::ecs::{CombatWorld, System};
use crate::systems::for_each_request;
use log::trace;

/// Converts fractional resource changes to flat amounts
pub struct FlattenResourceChangesSystem;

impl System for FlattenResourceChangesSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        let stats = &world.stats;
        let requests = world.actions.resource_requests_mut();
        for_each_request(requests, world.config.parallel_threshold, |request| {
            flatten(request, stats)
        });
    }
}

/// Scales damage by the target's resistance
pub struct ApplyResistsSystem;

impl System for ApplyResistsSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        let stats = &world.stats;
        let requests = world.actions.resource_requests_mut();
        for_each_request(requests, world.config.parallel_threshold, |request| {
            resist(request, stats)
        });
    }
}

/// Applies resource changes with spillover and records one result per
/// request
pub struct ApplyResourceChangesSystem;

impl System for ApplyResourceChangesSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        let (requests, results) = world.actions.resource_requests_and_results();
        for request in requests {
            let Some(slot) = request.target_index else {
                continue;
            };
            results.push(apply(&mut world.stats, request, slot));
        }

        if !requests.is_empty() {
            trace!("Applied {} resource changes", requests.len());
        }
    }
}

/// Rewrite a fractional change as a flat amount
pub(crate) fn flatten(request: &mut ResourceChangeRequest, stats: &StatRegistry) {
    let Some(slot) = request.target_index else {
        return;
    };
    let reference = stats.resource(request.change_type_target, slot);
    request.value = match request.change_type {
        ResourceChangeType::Flat => return,
        ResourceChangeType::FractionOfMax => request.value * reference.max,
        ResourceChangeType::FractionOfCurrent => request.value * reference.value,
    };
    request.change_type = ResourceChangeType::Flat;
}

/// Reduce damage by `1 - fraction` of the matching resistance
pub(crate) fn resist(request: &mut ResourceChangeRequest, stats: &StatRegistry) {
    let Some(slot) = request.target_index else {
        return;
    };
    if request.value >= 0.0 || request.flags.contains(ResourceChangeFlags::BYPASS_REDUCTIONS) {
        return;
    }
    request.value *= 1.0 - stats.resist(request.damage_type, slot).fraction;
}

/// Walk the pool order of one request
pub(crate) fn apply(
    stats: &mut StatRegistry,
    request: &ResourceChangeRequest,
    slot: usize,
) -> ResourceChangeResult {
    let mut result = ResourceChangeResult::for_request(request, slot);
    let mut remaining = request.value;

    for pool in request.order.iter() {
        if remaining == 0.0 {
            break;
        }
        let cell = stats.resource_mut(pool, slot);
        let before = cell.value;
        let wanted = before + remaining;
        cell.value = wanted.clamp(0.0, cell.max.max(0.0));
        remaining = wanted - cell.value;

        if cell.value != before {
            result.add(pool, before, cell.value);
        }
    }

    if request.flags.contains(ResourceChangeFlags::INSTANT_KILL) {
        let health = stats.resource_mut(ResourceType::Health, slot);
        if health.value != 0.0 {
            result.add(ResourceType::Health, health.value, 0.0);
            health.value = 0.0;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::actions::OrderOfModification;
    use crate::ecs::kinds::{DamageType, ResistanceStatType};
    use crate::ecs::templates::{EntityDefinition, EntityTypeData};
    use crate::ecs::EntityId;

    fn registry(health: f32, armor: f32) -> StatRegistry {
        let def = EntityDefinition::new("dummy")
            .with_resource(ResourceType::Health, health)
            .with_resource(ResourceType::Armor, armor)
            .with_resistance(ResistanceStatType::Magical, 100.0);
        let mut stats = StatRegistry::new(1);
        stats.init_from_template(0, &EntityTypeData::compile(&def).unwrap());
        stats
    }

    fn request(value: f32) -> ResourceChangeRequest {
        let mut request = ResourceChangeRequest::new(EntityId::new(1), EntityId::new(0), value);
        request.target_index = Some(0);
        request
    }

    #[test]
    fn test_spillover_discards_remainder() {
        let mut stats = registry(10.0, 10.0);
        stats.resource_mut(ResourceType::Armor, 0).value = 0.0;

        let request = request(-15.0).with_order(OrderOfModification::armor_then_health());
        let result = apply(&mut stats, &request, 0);

        assert_eq!(stats.resource(ResourceType::Armor, 0).value, 0.0);
        assert_eq!(stats.resource(ResourceType::Health, 0).value, 0.0);
        assert_eq!(result.entries().len(), 1);
        let health = result.entry(ResourceType::Health).unwrap();
        assert_eq!((health.from, health.to), (10.0, 0.0));
    }

    #[test]
    fn test_spillover_drains_pools_in_order() {
        let mut stats = registry(10.0, 4.0);
        let request = request(-6.0).with_order(OrderOfModification::armor_then_health());
        let result = apply(&mut stats, &request, 0);

        assert_eq!(stats.resource(ResourceType::Armor, 0).value, 0.0);
        assert_eq!(stats.resource(ResourceType::Health, 0).value, 8.0);
        assert_eq!(result.total_change(), -6.0);
    }

    #[test]
    fn test_zero_change_records_nothing() {
        let mut stats = registry(10.0, 10.0);
        let before = stats.row(0);
        let result = apply(&mut stats, &request(0.0), 0);
        assert!(result.entries().is_empty());
        assert_eq!(stats.row(0), before);
    }

    #[test]
    fn test_heal_capped_at_max() {
        let mut stats = registry(10.0, 0.0);
        stats.resource_mut(ResourceType::Health, 0).value = 7.0;
        let result = apply(&mut stats, &request(5.0), 0);
        assert_eq!(stats.resource(ResourceType::Health, 0).value, 10.0);
        assert_eq!(result.total_change(), 3.0);
    }

    #[test]
    fn test_instant_kill_zeroes_health() {
        let mut stats = registry(10.0, 0.0);
        let request = request(-1.0).with_flags(ResourceChangeFlags::INSTANT_KILL);
        let result = apply(&mut stats, &request, 0);

        assert_eq!(stats.resource(ResourceType::Health, 0).value, 0.0);
        assert_eq!(result.entries().len(), 2);
        assert_eq!(result.total_change(), -10.0);
    }

    #[test]
    fn test_flatten_reads_reference_pool() {
        let mut stats = registry(20.0, 10.0);
        stats.resource_mut(ResourceType::Armor, 0).value = 4.0;

        let mut of_max = request(-0.5).with_change_type(ResourceChangeType::FractionOfMax, ResourceType::Health);
        flatten(&mut of_max, &stats);
        assert_eq!(of_max.value, -10.0);
        assert_eq!(of_max.change_type, ResourceChangeType::Flat);

        let mut of_current =
            request(0.25).with_change_type(ResourceChangeType::FractionOfCurrent, ResourceType::Armor);
        flatten(&mut of_current, &stats);
        assert_eq!(of_current.value, 1.0);
    }

    #[test]
    fn test_resist_only_reduces_damage() {
        let stats = registry(10.0, 0.0);

        let mut magic = request(-10.0).with_damage_type(DamageType::Magical);
        resist(&mut magic, &stats);
        assert_eq!(magic.value, -5.0);

        let mut heal = request(10.0).with_damage_type(DamageType::Magical);
        resist(&mut heal, &stats);
        assert_eq!(heal.value, 10.0);

        let mut bypass = request(-10.0)
            .with_damage_type(DamageType::Magical)
            .with_flags(ResourceChangeFlags::BYPASS_REDUCTIONS);
        resist(&mut bypass, &stats);
        assert_eq!(bypass.value, -10.0);

        let mut physical = request(-10.0);
        resist(&mut physical, &stats);
        assert_eq!(physical.value, -10.0);
    }
}
