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

use crate::ecs::{CombatWorld, System};
use crate::interceptors::{Capability, InterceptorContext};

/// Runs every interceptor registered for one pipeline point
///
/// Interceptors may rewrite queued requests in place but must not retarget
/// them: slots were resolved before any interceptor point runs.
pub struct InterceptorPointSystem {
    capability: Capability,
}

impl InterceptorPointSystem {
    /// System for a pipeline point
    pub fn new(capability: Capability) -> Self {
        InterceptorPointSystem { capability }
    }

    /// The pipeline point this system runs
    pub fn capability(&self) -> Capability {
        self.capability
    }
}

impl System for InterceptorPointSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        if world.interceptors.is_empty() {
            return;
        }
        let mut context = InterceptorContext::new(
            &mut world.actions,
            &world.stats,
            &world.entities,
            world.delta_time,
        );
        world.interceptors.run(self.capability, &mut context);
    }

    fn name(&self) -> &str {
        match self.capability {
            Capability::StatBeforeApplication => "interceptors::stat_before_application",
            Capability::StatAfterApplication => "interceptors::stat_after_application",
            Capability::ResourceBeforeResist => "interceptors::resource_before_resist",
            Capability::ResourceBeforeApplication => "interceptors::resource_before_application",
            Capability::ResourceAfterApplication => "interceptors::resource_after_application",
        }
    }
}
