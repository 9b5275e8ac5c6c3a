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
//! Interceptor tests through the world API

use combat_kernel::ecs::actions::{
    OrderOfModification, ResourceChangeFlags, ResourceChangeRequest, StatChangeRequest,
};
use combat_kernel::ecs::kinds::{
    CombatStatType, DamageType, ResistanceStatType, ResourceType, StatChangeType, StatTarget,
};
use combat_kernel::ecs::templates::EntityDefinition;
use combat_kernel::ecs::EntityId;
use combat_kernel::error::{CombatError, CombatResult};
use combat_kernel::interceptors::{
    Capability, DamageTakenInterceptor, Interceptor, InterceptorContext, InterceptorPayload,
    PayloadStore, ShieldAbsorbInterceptor,
};
use combat_kernel::{CombatWorld, KernelConfig};
use std::any::Any;

fn sentinel() -> EntityDefinition {
    EntityDefinition::new("sentinel")
        .with_resource(ResourceType::Health, 10.0)
        .with_resource(ResourceType::Armor, 10.0)
        .with_resistance(ResistanceStatType::Magical, 100.0)
}

fn defaults_world() -> (CombatWorld, EntityId, EntityId) {
    let mut world = CombatWorld::with_defaults(KernelConfig::new(8), &[sentinel()]).unwrap();
    let a = world.create_entity(0);
    let b = world.create_entity(0);
    world.tick(0.0);
    (world, a, b)
}

fn armor_hit(origin: EntityId, target: EntityId, amount: f32) -> ResourceChangeRequest {
    ResourceChangeRequest::damage(origin, target, amount, DamageType::Physical)
        .with_order(OrderOfModification::from_slice(&[ResourceType::Armor]))
}

#[test]
fn test_shield_absorbs_before_armor() {
    let (mut world, shielded, attacker) = defaults_world();
    world
        .add_to_interceptor::<ShieldAbsorbInterceptor>(shielded, InterceptorPayload::Absorb { amount: 2.0 })
        .unwrap();

    world.enqueue_resource_change(armor_hit(attacker, shielded, 4.0));
    world.tick(0.1);
    assert_eq!(world.resource_value(shielded, ResourceType::Armor), Some(8.0));

    let shield = world.get_interceptor::<ShieldAbsorbInterceptor>().unwrap();
    assert_eq!(shield.remaining(shielded), 0.0);
    assert!(world
        .interceptor_payloads::<ShieldAbsorbInterceptor>(shielded)
        .unwrap()
        .is_empty());

    world.enqueue_resource_change(armor_hit(attacker, shielded, 4.0));
    world.tick(0.1);
    assert_eq!(world.resource_value(shielded, ResourceType::Armor), Some(4.0));
}

#[test]
fn test_shield_runs_before_resistance() {
    let (mut world, shielded, attacker) = defaults_world();
    world
        .add_to_interceptor::<ShieldAbsorbInterceptor>(shielded, InterceptorPayload::Absorb { amount: 4.0 })
        .unwrap();

    world.enqueue_resource_change(ResourceChangeRequest::damage(attacker, shielded, 10.0, DamageType::Magical));
    world.tick(0.1);

    // 10 - 4 absorbed = 6, halved by resistance
    assert_eq!(world.resource_value(shielded, ResourceType::Health), Some(7.0));
}

#[test]
fn test_shield_ignores_heals_and_other_targets() {
    let (mut world, shielded, other) = defaults_world();
    world
        .add_to_interceptor::<ShieldAbsorbInterceptor>(shielded, InterceptorPayload::Absorb { amount: 5.0 })
        .unwrap();

    world.enqueue_resource_change(armor_hit(shielded, other, 3.0));
    world.enqueue_resource_change(ResourceChangeRequest::heal(other, shielded, 3.0));
    world.tick(0.1);

    assert_eq!(world.resource_value(other, ResourceType::Armor), Some(7.0));
    let shield = world.get_interceptor::<ShieldAbsorbInterceptor>().unwrap();
    assert_eq!(shield.remaining(shielded), 5.0);
}

#[test]
fn test_damage_taken_scales_after_resistance() {
    let (mut world, target, attacker) = defaults_world();
    world
        .add_to_interceptor::<DamageTakenInterceptor>(
            target,
            InterceptorPayload::DamageTaken {
                damage_type: DamageType::Magical,
                multiplier: 1.5,
            },
        )
        .unwrap();

    world.enqueue_resource_change(ResourceChangeRequest::damage(attacker, target, 4.0, DamageType::Magical));
    world.enqueue_resource_change(ResourceChangeRequest::damage(attacker, target, 1.0, DamageType::Physical));
    world.tick(0.1);

    // Magical: 4 halved to 2, then 1.5x. Physical is not affected
    assert_eq!(world.resource_value(target, ResourceType::Health), Some(6.0));
}

#[test]
fn test_payload_validation() {
    let (mut world, a, _) = defaults_world();

    let negative = world.add_to_interceptor::<ShieldAbsorbInterceptor>(a, InterceptorPayload::Absorb { amount: -1.0 });
    assert!(matches!(negative, Err(CombatError::RejectedPayload { .. })));

    let wrong_kind = world.add_to_interceptor::<ShieldAbsorbInterceptor>(a, InterceptorPayload::Custom([0.0; 3]));
    assert!(matches!(wrong_kind, Err(CombatError::RejectedPayload { .. })));

    let ghost = EntityId::new(7);
    let dead = world.add_to_interceptor::<ShieldAbsorbInterceptor>(ghost, InterceptorPayload::Absorb { amount: 1.0 });
    assert!(matches!(dead, Err(CombatError::InvalidEntity(_))));
}

#[test]
fn test_unregistered_interceptor() {
    let mut world = CombatWorld::new(KernelConfig::new(2), &[sentinel()]).unwrap();
    let id = world.create_entity(0);

    let result = world.add_to_interceptor::<ShieldAbsorbInterceptor>(id, InterceptorPayload::Absorb { amount: 1.0 });
    assert!(matches!(result, Err(CombatError::UnknownInterceptor(_))));
    assert!(world.get_interceptor::<ShieldAbsorbInterceptor>().is_none());
}

#[test]
fn test_remove_from_interceptor() {
    let (mut world, a, b) = defaults_world();
    for amount in [1.0, 2.0] {
        world
            .add_to_interceptor::<ShieldAbsorbInterceptor>(a, InterceptorPayload::Absorb { amount })
            .unwrap();
    }
    assert_eq!(world.remove_from_interceptor::<ShieldAbsorbInterceptor>(a).unwrap(), 2);

    world.enqueue_resource_change(armor_hit(b, a, 3.0));
    world.tick(0.1);
    assert_eq!(world.resource_value(a, ResourceType::Armor), Some(7.0));
}

#[test]
fn test_payloads_dropped_on_death() {
    let (mut world, victim, killer) = defaults_world();
    world
        .add_to_interceptor::<ShieldAbsorbInterceptor>(victim, InterceptorPayload::Absorb { amount: 50.0 })
        .unwrap();

    world.enqueue_resource_change(
        ResourceChangeRequest::damage(killer, victim, 1.0, DamageType::True)
            .with_flags(ResourceChangeFlags::INSTANT_KILL),
    );
    world.tick(0.1);
    assert!(!world.is_alive(victim));

    let reborn = world.create_entity(0);
    assert_eq!(reborn, victim);
    let shield = world.get_interceptor::<ShieldAbsorbInterceptor>().unwrap();
    assert_eq!(shield.remaining(reborn), 0.0);
}

/// Doubles flat haste buffs on entities carrying a payload
#[derive(Default)]
struct HasteAmplifier {
    store: PayloadStore,
    seen_results: usize,
}

impl Interceptor for HasteAmplifier {
    fn name(&self) -> &str {
        "haste_amplifier"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::StatBeforeApplication, Capability::StatAfterApplication]
    }

    fn update(&mut self, capability: Capability, context: &mut InterceptorContext<'_>) {
        match capability {
            Capability::StatBeforeApplication => {
                for request in context.stat_requests_mut() {
                    let haste = request.stat == StatTarget::Combat(CombatStatType::Haste);
                    if haste && request.change_type == StatChangeType::Flat && self.store.contains(request.target) {
                        request.value *= 2.0;
                    }
                }
            }
            Capability::StatAfterApplication => {
                self.seen_results += context.stat_results().len();
            }
            _ => {}
        }
    }

    fn add(&mut self, id: EntityId, payload: InterceptorPayload) -> CombatResult<()> {
        self.store.add(id, payload);
        Ok(())
    }

    fn remove(&mut self, id: EntityId) -> usize {
        self.store.remove(id)
    }

    fn payloads(&self, id: EntityId) -> &[InterceptorPayload] {
        self.store.get(id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn test_custom_stat_interceptor() {
    let (mut world, a, b) = defaults_world();
    world.register_interceptor(Box::new(HasteAmplifier::default())).unwrap();
    world
        .add_to_interceptor::<HasteAmplifier>(a, InterceptorPayload::Custom([1.0, 0.0, 0.0]))
        .unwrap();

    for target in [a, b] {
        world.enqueue_stat_change(StatChangeRequest::new(target, target, CombatStatType::Haste, StatChangeType::Flat, 3.0));
    }
    world.tick(0.1);

    assert_eq!(world.combat_stats(a).unwrap().haste, 6.0);
    assert_eq!(world.combat_stats(b).unwrap().haste, 3.0);
    assert_eq!(world.get_interceptor::<HasteAmplifier>().unwrap().seen_results, 2);

    let names = world.interceptors().names_for(Capability::StatBeforeApplication);
    assert_eq!(names, vec!["haste_amplifier"]);
}

struct FutureInterceptor;

impl Interceptor for FutureInterceptor {
    fn name(&self) -> &str {
        "future"
    }

    fn api_version(&self) -> &str {
        "1.0.0"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::ResourceAfterApplication]
    }

    fn update(&mut self, _capability: Capability, _context: &mut InterceptorContext<'_>) {}

    fn add(&mut self, _id: EntityId, _payload: InterceptorPayload) -> CombatResult<()> {
        Ok(())
    }

    fn remove(&mut self, _id: EntityId) -> usize {
        0
    }

    fn payloads(&self, _id: EntityId) -> &[InterceptorPayload] {
        &[]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[test]
fn test_registration_rejections() {
    let (mut world, _, _) = defaults_world();

    let result = world.register_interceptor(Box::new(FutureInterceptor));
    assert!(matches!(result, Err(CombatError::IncompatibleVersion { .. })));

    let result = world.register_interceptor(Box::new(ShieldAbsorbInterceptor::new()));
    assert!(matches!(result, Err(CombatError::DuplicateInterceptor(_))));
    assert_eq!(world.interceptors().len(), 2);
}
