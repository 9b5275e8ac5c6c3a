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
//! Staged system scheduler
//!
//! Systems are grouped into stages that execute strictly in order; a stage
//! completes before the next one starts. Within a stage, systems run in the
//! order they were added. Data parallelism happens inside individual systems,
//! never across them.

use crate::ecs::{CombatWorld, System};
use crate::interceptors::Capability;
use crate::systems::{
    ApplyResistsSystem, ApplyResourceChangesSystem, DeathSystem, EndFrameCleanupSystem,
    FlattenResourceChangesSystem, IndexerSystem, InterceptorPointSystem,
    ResolvePendingInitsSystem, ResourceChangesOverTimeSystem, StatChangeSystem,
    TemporaryStatChangesSystem,
};
use log::trace;

/// Stage identifier for grouping systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageId(pub usize);

impl StageId {
    /// Create a new stage ID
    pub fn new(id: usize) -> Self {
        StageId(id)
    }
}

/// Stages of the combat frame, in execution order
pub mod stages {
    use super::StageId;

    /// Apply templates to entities created since the last frame
    pub const INITIALIZATION: StageId = StageId(0);

    /// Resolve request targets to slots and drop stale requests
    pub const INDEXING: StageId = StageId(1);

    /// Count down temporary stat changes and revert expired ones
    pub const TEMPORARY_EFFECTS: StageId = StageId(2);

    /// Apply stat changes
    pub const STAT_CHANGES: StageId = StageId(3);

    /// Emit due resource changes over time
    pub const OVER_TIME: StageId = StageId(4);

    /// Flatten, resist and apply resource changes
    pub const RESOURCE_CHANGES: StageId = StageId(5);

    /// Detect deaths and compact the columns
    pub const DEATH: StageId = StageId(6);

    /// Publish the frame report and clear per-frame buffers
    pub const CLEANUP: StageId = StageId(7);
}

struct ScheduledSystem {
    system: Box<dyn System>,
    stage: StageId,
}

/// Ordered list of systems run once per frame
///
/// # Examples
///
/// ```
/// use combat_kernel::ecs::scheduler::{stages, Scheduler};
/// use combat_kernel::ecs::{CombatWorld, System};
///
/// struct Observer;
/// impl System for Observer {
///     fn run(&mut self, _world: &mut CombatWorld) {}
/// }
///
/// let mut scheduler = Scheduler::combat_frame();
/// scheduler.add_system(Observer, stages::CLEANUP);
/// assert_eq!(scheduler.stage_count(), 8);
/// ```
pub struct Scheduler {
    systems: Vec<ScheduledSystem>,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Scheduler {
            systems: Vec::new(),
        }
    }

    /// The standard combat frame pipeline
    pub fn combat_frame() -> Self {
        let mut scheduler = Scheduler::new();

        scheduler.add_system(ResolvePendingInitsSystem, stages::INITIALIZATION);
        scheduler.add_system(IndexerSystem, stages::INDEXING);
        scheduler.add_system(TemporaryStatChangesSystem, stages::TEMPORARY_EFFECTS);

        scheduler.add_system(
            InterceptorPointSystem::new(Capability::StatBeforeApplication),
            stages::STAT_CHANGES,
        );
        scheduler.add_system(StatChangeSystem, stages::STAT_CHANGES);
        scheduler.add_system(
            InterceptorPointSystem::new(Capability::StatAfterApplication),
            stages::STAT_CHANGES,
        );

        scheduler.add_system(ResourceChangesOverTimeSystem, stages::OVER_TIME);

        scheduler.add_system(FlattenResourceChangesSystem, stages::RESOURCE_CHANGES);
        scheduler.add_system(
            InterceptorPointSystem::new(Capability::ResourceBeforeResist),
            stages::RESOURCE_CHANGES,
        );
        scheduler.add_system(ApplyResistsSystem, stages::RESOURCE_CHANGES);
        scheduler.add_system(
            InterceptorPointSystem::new(Capability::ResourceBeforeApplication),
            stages::RESOURCE_CHANGES,
        );
        scheduler.add_system(ApplyResourceChangesSystem, stages::RESOURCE_CHANGES);
        scheduler.add_system(
            InterceptorPointSystem::new(Capability::ResourceAfterApplication),
            stages::RESOURCE_CHANGES,
        );

        scheduler.add_system(DeathSystem, stages::DEATH);
        scheduler.add_system(EndFrameCleanupSystem, stages::CLEANUP);
        scheduler
    }

    /// Add a system to a stage, after the systems already in it
    pub fn add_system<S: System + 'static>(&mut self, system: S, stage: StageId) {
        self.add_boxed(Box::new(system), stage);
    }

    fn add_boxed(&mut self, system: Box<dyn System>, stage: StageId) {
        // Stable insert keeps registration order within a stage
        let position = self.systems.partition_point(|s| s.stage <= stage);
        self.systems.insert(position, ScheduledSystem { system, stage });
    }

    /// Move every system of `other` into this scheduler
    pub fn append(&mut self, other: Scheduler) {
        for scheduled in other.systems {
            self.add_boxed(scheduled.system, scheduled.stage);
        }
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Number of stages in use
    pub fn stage_count(&self) -> usize {
        self.systems.last().map_or(0, |s| s.stage.0 + 1)
    }

    /// System names in execution order
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system.name()).collect()
    }

    /// Execute every system in stage order
    pub fn run(&mut self, world: &mut CombatWorld) {
        for scheduled in &mut self.systems {
            trace!("Running {} (stage {})", scheduled.system.name(), scheduled.stage.0);
            scheduled.system.run(world);
        }
    }

    /// Remove every system
    pub fn clear(&mut self) {
        self.systems.clear();
    }

    /// Whether no system is registered
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TestSystem {
        name: String,
        log: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl System for TestSystem {
        fn run(&mut self, _world: &mut CombatWorld) {
            self.log.lock().unwrap().push(self.name.clone());
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct CountingSystem(Arc<AtomicUsize>);

    impl System for CountingSystem {
        fn run(&mut self, _world: &mut CombatWorld) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn world() -> CombatWorld {
        CombatWorld::new(KernelConfig::new(4), &[]).unwrap()
    }

    #[test]
    fn test_stage_ordering_is_stable() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut scheduler = Scheduler::new();
        for (name, stage) in [("late", 2), ("early", 0), ("middle_a", 1), ("middle_b", 1)] {
            scheduler.add_system(
                TestSystem {
                    name: name.to_string(),
                    log: log.clone(),
                },
                StageId::new(stage),
            );
        }

        assert_eq!(scheduler.stage_count(), 3);
        scheduler.run(&mut world());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["early", "middle_a", "middle_b", "late"]
        );
    }

    #[test]
    fn test_combat_frame_layout() {
        let scheduler = Scheduler::combat_frame();
        assert_eq!(scheduler.stage_count(), 8);
        assert_eq!(scheduler.system_count(), 15);

        let names = scheduler.system_names();
        let flatten = names
            .iter()
            .position(|n| n.ends_with("FlattenResourceChangesSystem"))
            .unwrap();
        let resist = names
            .iter()
            .position(|n| n.ends_with("ApplyResistsSystem"))
            .unwrap();
        assert!(flatten < resist);
        assert!(names[0].ends_with("ResolvePendingInitsSystem"));
        assert!(names[names.len() - 1].ends_with("EndFrameCleanupSystem"));
    }

    #[test]
    fn test_append_and_clear() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        let mut other = Scheduler::new();
        other.add_system(CountingSystem(counter.clone()), stages::DEATH);
        other.add_system(CountingSystem(counter.clone()), stages::INDEXING);
        scheduler.append(other);
        assert_eq!(scheduler.system_count(), 2);

        scheduler.run(&mut world());
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        scheduler.clear();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.stage_count(), 0);
    }
}
