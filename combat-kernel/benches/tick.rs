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
//! Benchmarks for one combat frame
//!
//! These benchmarks measure:
//! - Resource request throughput through resist and spillover
//! - Stat request throughput
//! - Sequential vs parallel request processing
//! - Over-time effect injection

use combat_kernel::ecs::actions::{OrderOfModification, ResourceChangeRequest, StatChangeRequest};
use combat_kernel::ecs::kinds::{
    CombatStatType, DamageType, ResistanceStatType, ResourceType, StatChangeType,
};
use combat_kernel::ecs::templates::EntityDefinition;
use combat_kernel::{CombatWorld, EntityId, KernelConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn tank() -> EntityDefinition {
    EntityDefinition::new("tank")
        .with_resource(ResourceType::Health, 1.0e9)
        .with_resource(ResourceType::Armor, 1.0e9)
        .with_resistance(ResistanceStatType::Physical, 50.0)
        .with_combat_stat(CombatStatType::Haste, 10.0)
}

fn populated_world(count: usize, parallel_threshold: usize) -> (CombatWorld, Vec<EntityId>) {
    let config = KernelConfig::new(count)
        .with_initial_buffer_size(count * 2)
        .with_parallel_threshold(parallel_threshold);
    let mut world = CombatWorld::with_defaults(config, &[tank()]).unwrap();
    let ids = (0..count).map(|_| world.create_entity(0)).collect();
    world.tick(0.0);
    (world, ids)
}

fn queue_hits(world: &mut CombatWorld, ids: &[EntityId]) {
    for (i, &target) in ids.iter().enumerate() {
        let origin = ids[(i + 1) % ids.len()];
        world.enqueue_resource_change(
            ResourceChangeRequest::damage(origin, target, 3.0, DamageType::Physical)
                .with_order(OrderOfModification::armor_then_health()),
        );
    }
}

/// Benchmark: one hit per entity per frame
fn bench_resource_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("resource_frame");

    for entity_count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));

        group.bench_with_input(
            BenchmarkId::new("sequential", entity_count),
            entity_count,
            |b, &count| {
                let (mut world, ids) = populated_world(count, usize::MAX);
                b.iter(|| {
                    queue_hits(&mut world, &ids);
                    black_box(world.tick(0.016).resource_results.len());
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", entity_count),
            entity_count,
            |b, &count| {
                let (mut world, ids) = populated_world(count, 64);
                b.iter(|| {
                    queue_hits(&mut world, &ids);
                    black_box(world.tick(0.016).resource_results.len());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: one stat change per entity per frame
fn bench_stat_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("stat_frame");

    for entity_count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(entity_count),
            entity_count,
            |b, &count| {
                let (mut world, ids) = populated_world(count, 64);
                let mut sign = 1.0;
                b.iter(|| {
                    for &id in &ids {
                        world.enqueue_stat_change(StatChangeRequest::new(
                            id,
                            id,
                            CombatStatType::Haste,
                            StatChangeType::Flat,
                            sign,
                        ));
                    }
                    sign = -sign;
                    black_box(world.tick(0.016).stat_results.len());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark: frames with an over-time effect on every entity
fn bench_over_time_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("over_time_frame");

    for entity_count in [100, 1000].iter() {
        group.throughput(Throughput::Elements(*entity_count as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(entity_count),
            entity_count,
            |b, &count| {
                let (mut world, ids) = populated_world(count, 64);
                for &id in &ids {
                    world
                        .enqueue_resource_change_over_time(
                            ResourceChangeRequest::damage(id, id, 1.0, DamageType::True),
                            10.0,
                            1.0e9,
                        )
                        .unwrap();
                }
                b.iter(|| {
                    black_box(world.tick(0.1).resource_results.len());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    tick_benches,
    bench_resource_frame,
    bench_stat_frame,
    bench_over_time_frame
);
criterion_main!(tick_benches);
