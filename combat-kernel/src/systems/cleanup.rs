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
use log::trace;
use std::mem;

/// Publishes the frame report and clears every per-frame buffer
///
/// Results and death requests are swapped into the report rather than
/// copied; the previous report's buffers are cleared and reused. Requests
/// queued after indexing are kept for the next frame.
pub struct EndFrameCleanupSystem;

impl System for EndFrameCleanupSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        let report = &mut world.last_frame;
        report.frame = world.frame_count;
        report.delta_time = world.delta_time;
        report.elapsed = world.elapsed;
        mem::swap(&mut report.stat_results, world.actions.stat_results_mut());
        mem::swap(&mut report.resource_results, world.actions.resource_results_mut());
        mem::swap(&mut report.deaths, world.deaths.requests_mut());

        let carried = world.actions.clear_processed();
        if carried > 0 {
            trace!("Carried {} late requests to the next frame", carried);
        }
        world.deaths.requests_mut().clear();
    }
}
