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
//! System execution framework
//!
//! Systems contain the logic of one pipeline step. Each runs once per frame
//! with exclusive access to the world.

use crate::ecs::CombatWorld;

/// A step of the per-frame pipeline
///
/// Systems must not hold references into the world between runs; slots are
/// not stable across removals.
pub trait System: Send + Sync {
    /// Execute the system on the world
    fn run(&mut self, world: &mut CombatWorld);

    /// Name of this system for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
