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
//! Shield absorption
//!
//! Shield stacks soak up damage before resistances are applied. Stacks are
//! consumed oldest first; a depleted stack is removed.

use crate::ecs::actions::ResourceChangeRequest;
use crate::ecs::EntityId;
use crate::error::{CombatError, CombatResult};
use crate::interceptors::api::{
    Capability, Interceptor, InterceptorContext, InterceptorPayload, PayloadStore,
};
use std::any::Any;

/// Absorbs incoming damage with stacking shields
#[derive(Debug, Default)]
pub struct ShieldAbsorbInterceptor {
    store: PayloadStore,
}

impl ShieldAbsorbInterceptor {
    /// Create an interceptor without shields
    pub fn new() -> Self {
        ShieldAbsorbInterceptor::default()
    }

    /// Total absorb left on an entity
    pub fn remaining(&self, id: EntityId) -> f32 {
        self.store
            .get(id)
            .iter()
            .map(|p| match p {
                InterceptorPayload::Absorb { amount } => *amount,
                _ => 0.0,
            })
            .sum()
    }

    fn absorb(&mut self, request: &mut ResourceChangeRequest) {
        if request.value >= 0.0 || request.target_index.is_none() {
            return;
        }
        let Some(stacks) = self.store.get_mut(request.target) else {
            return;
        };

        for stack in stacks.iter_mut() {
            if let InterceptorPayload::Absorb { amount } = stack {
                *amount += request.value;
                request.value = amount.min(0.0);
                *amount = amount.max(0.0);
            }
            if request.value == 0.0 {
                break;
            }
        }
        stacks.retain(|p| !matches!(p, InterceptorPayload::Absorb { amount } if *amount <= 0.0));
        self.store.prune(request.target);
    }
}

impl Interceptor for ShieldAbsorbInterceptor {
    fn name(&self) -> &str {
        "shield_absorb"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::ResourceBeforeResist]
    }

    fn update(&mut self, _capability: Capability, context: &mut InterceptorContext<'_>) {
        if self.store.is_empty() {
            return;
        }
        for request in context.resource_requests_mut() {
            self.absorb(request);
        }
    }

    fn add(&mut self, id: EntityId, payload: InterceptorPayload) -> CombatResult<()> {
        match payload {
            InterceptorPayload::Absorb { amount } if amount > 0.0 && amount.is_finite() => {
                self.store.add(id, payload);
                Ok(())
            }
            other => Err(CombatError::RejectedPayload {
                interceptor: self.name().to_string(),
                reason: format!("expected a positive Absorb amount, got {:?}", other),
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
