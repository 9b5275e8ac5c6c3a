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
//! Stat change application

use crate::ecs::actions::StatChangeResult;
use crate::ecs::{CombatWorld, System};
use log::trace;

/// Applies every resolved stat change in queue order
///
/// Each change updates the raw modifier, recomputes the derived value and
/// routes it to the matching output: resource maxima, the combat stat block
/// or the resistance. One result per applied request records the change of
/// that output.
pub struct StatChangeSystem;

impl System for StatChangeSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        let (requests, results) = world.actions.stat_requests_and_results();
        for request in requests {
            let Some(slot) = request.target_index else {
                continue;
            };
            let delta = world
                .stats
                .apply_stat_change(request.stat, slot, request.change_type, request.value);
            results.push(StatChangeResult {
                target: request.target,
                stat: request.stat,
                target_index: slot,
                delta,
            });
        }

        if !requests.is_empty() {
            trace!("Applied {} stat changes", results.len());
        }
    }
}
