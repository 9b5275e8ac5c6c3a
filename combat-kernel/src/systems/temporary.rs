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
use crate::systems::resolve_targets;
use log::trace;

/// Counts down temporary stat changes and queues the inverse of every one
/// that expired
///
/// Inverses are resolved on injection, after the indexing stage has run.
pub struct TemporaryStatChangesSystem;

impl System for TemporaryStatChangesSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        let requests = world.actions.stat_requests_mut();
        let start = requests.len();
        world.effects.tick_temporary(world.delta_time, requests);

        let expired = requests.len() - start;
        if expired == 0 {
            return;
        }
        let stale = resolve_targets(requests, start, &world.entities, world.config.parallel_threshold);
        trace!("Reverting {} temporary stat changes", expired - stale);
    }
}
