//! Entity Component System (ECS) core of the combat kernel
//!
//! This module provides:
//! - Entity handles mapped to dense slots with swap-back removal
//! - Struct-of-arrays columns keyed by closed enumerations
//! - Change requests and the per-frame action register
//! - The world, the system trait and the staged scheduler

mod entity;
mod system;
mod world;

pub mod actions;
pub mod component;
pub mod components;
pub mod kinds;
pub mod registry;
pub mod scheduler;
pub mod templates;

pub use entity::{EntityId, EntityMap, RemovedEntity};
pub use scheduler::{stages, Scheduler, StageId};
pub use system::System;
pub use world::{CombatWorld, FrameReport};
