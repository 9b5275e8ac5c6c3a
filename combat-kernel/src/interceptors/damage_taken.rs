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
//! Damage taken modifiers
//!
//! Scales damage of a given type after resistances, e.g. vulnerability
//! debuffs (`multiplier > 1`) or damage reduction auras (`multiplier < 1`).
//! Multiple modifiers on one entity multiply together.

use crate::ecs::kinds::DamageType;
use crate::ecs::EntityId;
use crate::error::{CombatError, CombatResult};
use crate::interceptors::api::{
    Capability, Interceptor, InterceptorContext, InterceptorPayload, PayloadStore,
};
use std::any::Any;

/// Multiplies incoming damage per damage type
#[derive(Debug, Default)]
pub struct DamageTakenInterceptor {
    store: PayloadStore,
}

impl DamageTakenInterceptor {
    /// Create an interceptor without modifiers
    pub fn new() -> Self {
        DamageTakenInterceptor::default()
    }

    /// Combined multiplier for one entity and damage type
    pub fn multiplier(&self, id: EntityId, damage_type: DamageType) -> f32 {
        self.store
            .get(id)
            .iter()
            .filter_map(|p| match p {
                InterceptorPayload::DamageTaken {
                    damage_type: t,
                    multiplier,
                } if *t == damage_type => Some(*multiplier),
                _ => None,
            })
            .product()
    }
}

impl Interceptor for DamageTakenInterceptor {
    fn name(&self) -> &str {
        "damage_taken"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::ResourceBeforeApplication]
    }

    fn update(&mut self, _capability: Capability, context: &mut InterceptorContext<'_>) {
        if self.store.is_empty() {
            return;
        }
        for request in context.resource_requests_mut() {
            let resolved = request.target_index.is_some();
            if resolved && request.value < 0.0 && self.store.contains(request.target) {
                request.value *= self.multiplier(request.target, request.damage_type);
            }
        }
    }

    fn add(&mut self, id: EntityId, payload: InterceptorPayload) -> CombatResult<()> {
        match payload {
            InterceptorPayload::DamageTaken { multiplier, .. }
                if multiplier >= 0.0 && multiplier.is_finite() =>
            {
                self.store.add(id, payload);
                Ok(())
            }
            other => Err(CombatError::RejectedPayload {
                interceptor: self.name().to_string(),
                reason: format!("expected a non-negative DamageTaken multiplier, got {:?}", other),
            }),
        }
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
