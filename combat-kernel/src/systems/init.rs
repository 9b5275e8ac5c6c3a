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
//! Deferred template initialization

use crate::ecs::{CombatWorld, System};
use log::trace;

/// Writes template stats into entities created since the last frame
pub struct ResolvePendingInitsSystem;

impl System for ResolvePendingInitsSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        resolve_pending_inits(world);
    }
}

/// Initialize every pending entity that is still alive
///
/// Returns the number of entities initialized.
pub(crate) fn resolve_pending_inits(world: &mut CombatWorld) -> usize {
    let mut applied = 0;
    for init in world.pending_inits.drain(..) {
        // Destroyed before its first frame
        let Some(slot) = world.entities.index_of(init.id) else {
            continue;
        };
        let Some(data) = world.types.get(init.type_index) else {
            continue;
        };
        world.stats.init_from_template(slot, data);
        applied += 1;
    }

    if applied > 0 {
        trace!("Initialized {} entities", applied);
    }
    applied
}
