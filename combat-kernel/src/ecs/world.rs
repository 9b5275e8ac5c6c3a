//! World management
//!
//! The [`CombatWorld`] owns every piece of kernel state: the entity map, the
//! stat columns, the entity templates, the per-frame action register, timed
//! effects, deaths, interceptors and the frame scheduler. Gameplay code
//! interacts with it only through request and query operations; nothing
//! hands out references into the columns that outlive a call.

use crate::config::KernelConfig;
use crate::death::{DeadEntity, DeathRegistry, DeathRequest};
use crate::ecs::actions::{
    ActionRegister, ResourceChangeRequest, ResourceChangeResult, StatChangeRequest,
    StatChangeResult,
};
use crate::ecs::components::{CombatStatBlock, DeathFlags, Resist, Resource, Stat};
use crate::ecs::kinds::{DamageType, ResourceType, StatTarget};
use crate::ecs::registry::StatRegistry;
use crate::ecs::templates::{EntityDefinition, EntityTypeRegistry, PendingInit};
use crate::ecs::{EntityId, EntityMap, Scheduler, StageId, System};
use crate::effects::OverTimeEffectsRegistry;
use crate::error::{CombatError, CombatResult};
use crate::interceptors::{Interceptor, InterceptorPayload, InterceptorRegistry};
use crate::systems;
use log::{debug, warn};
use std::any::Any;

/// Everything that happened during one frame
///
/// Kept by the world until the next frame completes.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Seconds simulated by the frame
    pub delta_time: f32,
    /// Simulated time at the end of the frame
    pub elapsed: f64,
    /// Applied stat changes in application order
    pub stat_results: Vec<StatChangeResult>,
    /// Applied resource changes in application order
    pub resource_results: Vec<ResourceChangeResult>,
    /// Deaths, ordered by descending slot
    pub deaths: Vec<DeathRequest>,
}

impl FrameReport {
    /// Death request of an entity, if it died this frame
    pub fn death_of(&self, id: EntityId) -> Option<&DeathRequest> {
        self.deaths.iter().find(|d| d.id == id)
    }

    /// Resource results targeting an entity
    pub fn resource_results_for(&self, id: EntityId) -> impl Iterator<Item = &ResourceChangeResult> {
        self.resource_results.iter().filter(move |r| r.target == id)
    }
}

/// The combat simulation kernel
///
/// # Examples
///
/// ```
/// use combat_kernel::ecs::actions::ResourceChangeRequest;
/// use combat_kernel::ecs::kinds::{DamageType, ResourceType};
/// use combat_kernel::ecs::templates::EntityDefinition;
/// use combat_kernel::{CombatWorld, KernelConfig};
///
/// let grunt = EntityDefinition::new("grunt").with_resource(ResourceType::Health, 10.0);
/// let mut world = CombatWorld::new(KernelConfig::new(16), &[grunt]).unwrap();
///
/// let attacker = world.create_entity(0);
/// let target = world.create_entity(0);
/// world.tick(0.016);
///
/// world.enqueue_resource_change(ResourceChangeRequest::damage(attacker, target, 4.0, DamageType::Physical));
/// world.tick(0.016);
/// assert_eq!(world.resource_value(target, ResourceType::Health), Some(6.0));
/// ```
pub struct CombatWorld {
    pub(crate) config: KernelConfig,
    pub(crate) entities: EntityMap,
    pub(crate) stats: StatRegistry,
    pub(crate) types: EntityTypeRegistry,
    pub(crate) pending_inits: Vec<PendingInit>,
    pub(crate) actions: ActionRegister,
    pub(crate) effects: OverTimeEffectsRegistry,
    pub(crate) deaths: DeathRegistry,
    pub(crate) interceptors: InterceptorRegistry,
    pub(crate) delta_time: f32,
    pub(crate) elapsed: f64,
    pub(crate) frame_count: u64,
    pub(crate) last_frame: FrameReport,
    scheduler: Scheduler,
}

impl CombatWorld {
    /// Create a world with no interceptors
    ///
    /// The configuration is validated and every definition is compiled into
    /// an entity type; template indices follow the order of `definitions`.
    pub fn new(config: KernelConfig, definitions: &[EntityDefinition]) -> CombatResult<Self> {
        config.validate()?;
        let types = EntityTypeRegistry::build(definitions)?;
        let capacity = config.entity_capacity;
        let buffer = config.initial_buffer_size;

        Ok(CombatWorld {
            entities: EntityMap::new(capacity, config.resolved_id_capacity()),
            stats: StatRegistry::new(capacity),
            types,
            pending_inits: Vec::with_capacity(buffer),
            actions: ActionRegister::with_capacity(buffer),
            effects: OverTimeEffectsRegistry::with_capacity(buffer),
            deaths: DeathRegistry::with_capacity(buffer),
            interceptors: InterceptorRegistry::new(),
            delta_time: 0.0,
            elapsed: 0.0,
            frame_count: 0,
            last_frame: FrameReport::default(),
            scheduler: Scheduler::combat_frame(),
            config,
        })
    }

    /// Create a world with the built-in interceptors registered
    pub fn with_defaults(config: KernelConfig, definitions: &[EntityDefinition]) -> CombatResult<Self> {
        let mut world = Self::new(config, definitions)?;
        world.interceptors = InterceptorRegistry::with_defaults()?;
        Ok(world)
    }

    /// Register an interceptor at every pipeline point it declares
    pub fn register_interceptor(&mut self, interceptor: Box<dyn Interceptor>) -> CombatResult<()> {
        self.interceptors.register(interceptor)
    }

    /// Add a custom system to a stage, after the systems already in it
    ///
    /// Systems added while a frame runs take effect from the next frame.
    pub fn add_system<S: System + 'static>(&mut self, system: S, stage: StageId) {
        self.scheduler.add_system(system, stage);
    }

    /// Run one frame of the pipeline
    ///
    /// A negative or non-finite `delta_time` is treated as zero.
    pub fn tick(&mut self, delta_time: f32) -> &FrameReport {
        self.delta_time = if delta_time.is_finite() && delta_time >= 0.0 {
            delta_time
        } else {
            warn!("Ignoring invalid frame delta {}", delta_time);
            0.0
        };
        self.elapsed += f64::from(self.delta_time);
        self.frame_count += 1;

        let mut scheduler = std::mem::take(&mut self.scheduler);
        scheduler.run(self);
        let added = std::mem::replace(&mut self.scheduler, scheduler);
        self.scheduler.append(added);

        &self.last_frame
    }

    /// Allocate an entity of a template
    ///
    /// Stats are written when the next frame starts, or on an explicit
    /// [`CombatWorld::resolve_pending_inits`]. Returns [`EntityId::INVALID`]
    /// when the template does not exist or capacity is exhausted.
    pub fn create_entity(&mut self, type_index: usize) -> EntityId {
        if self.types.get(type_index).is_none() {
            warn!(
                "Unknown entity type index {} ({} types registered)",
                type_index,
                self.types.len()
            );
            return EntityId::INVALID;
        }
        let Some((id, slot)) = self.entities.allocate() else {
            warn!(
                "Entity capacity exhausted ({} live, {} ids)",
                self.entities.len(),
                self.entities.id_capacity()
            );
            return EntityId::INVALID;
        };

        self.stats.clear_slot(slot);
        self.pending_inits.push(PendingInit { id, type_index });
        id
    }

    /// Allocate an entity of a template looked up by name
    pub fn create_entity_by_name(&mut self, name: &str) -> EntityId {
        match self.types.find(name) {
            Some(index) => self.create_entity(index),
            None => {
                warn!("Unknown entity type '{}'", name);
                EntityId::INVALID
            }
        }
    }

    /// Apply templates to every entity created since the last frame
    ///
    /// Returns the number of entities initialized.
    pub fn resolve_pending_inits(&mut self) -> usize {
        systems::resolve_pending_inits(self)
    }

    /// Remove an entity immediately
    ///
    /// The id is recycled and no corpse is kept. Timed effects, interceptor
    /// payloads, pending initialization and queued requests of the entity
    /// are dropped. Returns `false` if the entity was not alive.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        let Some(removed) = self.entities.free(id) else {
            return false;
        };
        if let Some(moved_from) = removed.moved_from {
            self.stats.swap_back(removed.removed_index, moved_from);
        }
        self.entities.recycle(id);

        let effects = self.effects.remove_entity(id);
        let payloads = self.interceptors.remove_entity(id);
        self.pending_inits.retain(|p| p.id != id);
        self.actions.purge_entity(id);
        if removed.moved_from.is_some() {
            self.reindex_queued();
        }

        debug!(
            "Destroyed {} at slot {} ({} effects and {} payloads dropped)",
            id, removed.removed_index, effects, payloads
        );
        true
    }

    /// Re-resolve queued requests after a slot moved mid-frame
    fn reindex_queued(&mut self) {
        let entities = &self.entities;
        for request in self.actions.stat_requests_mut() {
            if request.target_index.is_some() {
                request.target_index = entities.index_of(request.target);
            }
        }
        for request in self.actions.resource_requests_mut() {
            if request.target_index.is_some() {
                request.target_index = entities.index_of(request.target);
            }
        }
    }

    /// Queue a resource change for the next frame
    pub fn enqueue_resource_change(&mut self, request: ResourceChangeRequest) {
        self.actions.push_resource_change(request);
    }

    /// Queue a stat change for the next frame
    pub fn enqueue_stat_change(&mut self, request: StatChangeRequest) {
        self.actions.push_stat_change(request);
    }

    /// Queue a stat change that is reverted after `duration` seconds
    ///
    /// # Errors
    ///
    /// [`CombatError::InvalidEntity`] if the target is not alive and
    /// [`CombatError::NonInvertible`] for a multiplicative change by zero or
    /// a non-finite factor.
    pub fn enqueue_temporary_stat_change(
        &mut self,
        request: StatChangeRequest,
        duration: f32,
    ) -> CombatResult<()> {
        if !self.entities.is_alive(request.target) {
            return Err(CombatError::InvalidEntity(request.target));
        }
        if request.inverted().is_none() {
            warn!(
                "Rejected temporary {:?} change of {} on {}",
                request.change_type, request.value, request.target
            );
            return Err(CombatError::NonInvertible(format!(
                "{:?} by {}",
                request.change_type, request.value
            )));
        }

        self.actions.push_stat_change(request);
        self.effects.add_temporary(request, duration);
        Ok(())
    }

    /// Re-apply a resource change `frequency` times per second for
    /// `duration` seconds
    ///
    /// The first application falls due one period after the next frame
    /// starts.
    ///
    /// # Errors
    ///
    /// [`CombatError::InvalidEntity`] if the target is not alive and
    /// [`CombatError::InvalidFrequency`] for a frequency that is not a
    /// positive finite number.
    pub fn enqueue_resource_change_over_time(
        &mut self,
        request: ResourceChangeRequest,
        frequency: f32,
        duration: f32,
    ) -> CombatResult<()> {
        if !self.entities.is_alive(request.target) {
            return Err(CombatError::InvalidEntity(request.target));
        }
        if !(frequency.is_finite() && frequency > 0.0) {
            warn!("Rejected over-time change on {} with frequency {}", request.target, frequency);
            return Err(CombatError::InvalidFrequency(frequency));
        }

        self.effects.add_over_time(request, frequency, duration);
        Ok(())
    }

    /// Interceptor of type `T`
    pub fn get_interceptor<T: Interceptor + Any>(&self) -> Option<&T> {
        self.interceptors.get::<T>()
    }

    /// Interceptor of type `T`, mutable
    pub fn get_interceptor_mut<T: Interceptor + Any>(&mut self) -> Option<&mut T> {
        self.interceptors.get_mut::<T>()
    }

    /// Attach a payload to an entity in the interceptor of type `T`
    ///
    /// # Errors
    ///
    /// [`CombatError::InvalidEntity`] if the entity is not alive,
    /// [`CombatError::UnknownInterceptor`] if no `T` is registered, or the
    /// interceptor's own rejection of the payload.
    pub fn add_to_interceptor<T: Interceptor + Any>(
        &mut self,
        id: EntityId,
        payload: InterceptorPayload,
    ) -> CombatResult<()> {
        if !self.entities.is_alive(id) {
            return Err(CombatError::InvalidEntity(id));
        }
        self.interceptors.add_to::<T>(id, payload).map_err(|err| {
            warn!("Payload for {} not added: {}", id, err);
            err
        })
    }

    /// Drop every payload of an entity from the interceptor of type `T`
    pub fn remove_from_interceptor<T: Interceptor + Any>(&mut self, id: EntityId) -> CombatResult<usize> {
        self.interceptors.remove_from::<T>(id)
    }

    /// Payloads of an entity in the interceptor of type `T`
    pub fn interceptor_payloads<T: Interceptor + Any>(
        &self,
        id: EntityId,
    ) -> CombatResult<&[InterceptorPayload]> {
        self.interceptors.payloads::<T>(id)
    }

    /// Registered interceptors
    pub fn interceptors(&self) -> &InterceptorRegistry {
        &self.interceptors
    }

    /// Current and maximum of a resource
    pub fn resource(&self, id: EntityId, resource: ResourceType) -> Option<Resource> {
        let slot = self.entities.index_of(id)?;
        Some(*self.stats.resource(resource, slot))
    }

    /// Current value of a resource
    pub fn resource_value(&self, id: EntityId, resource: ResourceType) -> Option<f32> {
        self.resource(id, resource).map(|r| r.value)
    }

    /// Raw modifiers of a stat
    pub fn stat(&self, id: EntityId, target: impl Into<StatTarget>) -> Option<Stat> {
        let slot = self.entities.index_of(id)?;
        Some(*self.stats.stat(target.into(), slot))
    }

    /// Derived value of a stat
    pub fn stat_value(&self, id: EntityId, target: impl Into<StatTarget>) -> Option<f32> {
        self.stat(id, target).map(|s| s.calculate())
    }

    /// Packed combat stats
    pub fn combat_stats(&self, id: EntityId) -> Option<CombatStatBlock> {
        let slot = self.entities.index_of(id)?;
        Some(*self.stats.combat_block(slot))
    }

    /// Resistance against a damage type
    pub fn resistance(&self, id: EntityId, damage_type: DamageType) -> Option<Resist> {
        let slot = self.entities.index_of(id)?;
        Some(*self.stats.resist(damage_type, slot))
    }

    /// Death flags
    pub fn death_flags(&self, id: EntityId) -> Option<DeathFlags> {
        let slot = self.entities.index_of(id)?;
        Some(self.stats.death_flags(slot))
    }

    /// Whether the handle refers to a live entity
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.is_alive(id)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live handles in slot order
    pub fn entity_ids(&self) -> &[EntityId] {
        self.entities.ids()
    }

    /// Simulated seconds since the world was created
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of frames run
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Corpses kept so far
    pub fn corpses(&self) -> &[DeadEntity] {
        self.deaths.corpses()
    }

    /// Forget every corpse; their ids are never reused
    pub fn clear_corpses(&mut self) -> Vec<DeadEntity> {
        self.deaths.clear_corpses()
    }

    /// Report of the last completed frame
    pub fn last_frame(&self) -> &FrameReport {
        &self.last_frame
    }

    /// Configuration the world was built with
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Compiled entity templates
    pub fn entity_types(&self) -> &EntityTypeRegistry {
        &self.types
    }

    /// Entity map
    pub fn entities(&self) -> &EntityMap {
        &self.entities
    }

    /// Stat columns
    pub fn stats(&self) -> &StatRegistry {
        &self.stats
    }

    /// Requests queued for the next frame
    pub fn actions(&self) -> &ActionRegister {
        &self.actions
    }

    /// Timed effects
    pub fn effects(&self) -> &OverTimeEffectsRegistry {
        &self.effects
    }

    /// Entities waiting for their template
    pub fn pending_init_count(&self) -> usize {
        self.pending_inits.len()
    }

    /// Whether the entity map agrees with itself and the columns
    pub fn is_consistent(&self) -> bool {
        self.entities.is_consistent()
            && self.stats.capacity() == self.entities.capacity()
            && self.entities.len() <= self.stats.capacity()
    }
}

impl std::fmt::Debug for CombatWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatWorld")
            .field("entities", &self.entities.len())
            .field("capacity", &self.entities.capacity())
            .field("frame", &self.frame_count)
            .field("elapsed", &self.elapsed)
            .field("interceptors", &self.interceptors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::actions::OrderOfModification;
    use crate::ecs::kinds::{CombatStatType, StatChangeType};

    fn grunt() -> EntityDefinition {
        EntityDefinition::new("grunt")
            .with_resource(ResourceType::Health, 10.0)
            .with_combat_stat(CombatStatType::AttackPower, 5.0)
    }

    fn world(capacity: usize) -> CombatWorld {
        CombatWorld::new(KernelConfig::new(capacity), &[grunt()]).unwrap()
    }

    #[test]
    fn test_create_defers_initialization() {
        let mut world = world(4);
        let id = world.create_entity(0);
        assert!(world.is_alive(id));
        assert_eq!(world.pending_init_count(), 1);
        assert_eq!(world.resource_value(id, ResourceType::Health), Some(0.0));

        assert_eq!(world.resolve_pending_inits(), 1);
        assert_eq!(world.resource_value(id, ResourceType::Health), Some(10.0));
        assert_eq!(world.pending_init_count(), 0);
    }

    #[test]
    fn test_create_fails_closed() {
        let mut world = world(1);
        assert!(!world.create_entity(3).is_valid());
        assert!(world.create_entity(0).is_valid());
        assert!(!world.create_entity(0).is_valid());
        assert_eq!(world.entity_count(), 1);
        assert!(!world.create_entity_by_name("missing").is_valid());
    }

    #[test]
    fn test_destroy_before_init_skips_template() {
        let mut world = world(2);
        let a = world.create_entity(0);
        let b = world.create_entity(0);
        assert!(world.destroy_entity(a));
        assert!(!world.destroy_entity(a));

        assert_eq!(world.resolve_pending_inits(), 1);
        assert_eq!(world.resource_value(b, ResourceType::Health), Some(10.0));
        assert!(world.is_consistent());
    }

    #[test]
    fn test_destroy_recycles_id() {
        let mut world = world(2);
        let a = world.create_entity(0);
        world.destroy_entity(a);
        assert_eq!(world.create_entity(0), a);
    }

    #[test]
    fn test_tick_advances_time() {
        let mut world = world(1);
        world.tick(0.5);
        let report = world.tick(0.25);
        assert_eq!(report.frame, 2);
        assert_eq!(report.elapsed, 0.75);

        world.tick(-1.0);
        assert_eq!(world.elapsed(), 0.75);
        assert_eq!(world.frame_count(), 3);
    }

    #[test]
    fn test_queries_on_dead_entity() {
        let world = world(1);
        let ghost = EntityId::new(0);
        assert!(world.resource(ghost, ResourceType::Health).is_none());
        assert!(world.stat_value(ghost, CombatStatType::Haste).is_none());
        assert!(world.death_flags(ghost).is_none());
    }

    #[test]
    fn test_temporary_change_rejections() {
        let mut world = world(1);
        let id = world.create_entity(0);
        let zero = StatChangeRequest::new(
            id,
            id,
            CombatStatType::AttackPower,
            StatChangeType::MultiplierMultiplicative,
            0.0,
        );
        assert!(matches!(
            world.enqueue_temporary_stat_change(zero, 1.0),
            Err(CombatError::NonInvertible(_))
        ));

        let dead = StatChangeRequest { target: EntityId::new(5), value: 2.0, ..zero };
        assert!(matches!(
            world.enqueue_temporary_stat_change(dead, 1.0),
            Err(CombatError::InvalidEntity(_))
        ));
        assert!(world.actions().stat_requests().is_empty());
    }

    #[test]
    fn test_over_time_rejects_bad_frequency() {
        let mut world = world(1);
        let id = world.create_entity(0);
        let request = ResourceChangeRequest::new(id, id, -1.0);
        for frequency in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                world.enqueue_resource_change_over_time(request, frequency, 1.0),
                Err(CombatError::InvalidFrequency(_))
            ));
        }
        assert!(world.effects().is_empty());
    }

    #[test]
    fn test_destroy_reindexes_queued_requests() {
        let mut world = world(3);
        let a = world.create_entity(0);
        let _b = world.create_entity(0);
        let c = world.create_entity(0);
        world.resolve_pending_inits();

        let mut request = ResourceChangeRequest::new(a, c, -1.0).with_order(OrderOfModification::health());
        request.target_index = Some(2);
        world.actions.push_resource_change(request);

        world.destroy_entity(a);
        assert_eq!(world.actions().resource_requests()[0].target_index, Some(0));
    }
}
