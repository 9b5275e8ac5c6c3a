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
//! Timed effects
//!
//! Temporary stat changes hold the request that was applied and emit its
//! inverse when their timer runs out. Resource changes over time re-emit a
//! copy of their request once per period until their duration is spent.
//!
//! Neither kind touches the columns directly: the emitted requests are fed
//! back into the action register by the pipeline stages.

use crate::ecs::actions::{ResourceChangeRequest, StatChangeRequest};
use crate::ecs::EntityId;

/// An applied stat change waiting to be reverted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporaryStatEffect {
    /// The change that was applied
    pub request: StatChangeRequest,
    /// Seconds until the change is reverted
    pub remaining: f32,
}

/// Timer of a resource change over time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverTimeTimer {
    /// Applications per second
    pub frequency: f32,
    /// Seconds accumulated since the last application
    pub since_applied: f32,
    /// Seconds left
    pub duration: f32,
    /// Applications left before the effect is spent
    pub applications_left: u64,
}

impl OverTimeTimer {
    /// Timer for `duration * frequency` whole applications
    pub fn new(frequency: f32, duration: f32) -> Self {
        // Small slack so 0.7s at 10 per second counts as 7, not 6.999
        let total = (f64::from(duration.max(0.0)) * f64::from(frequency) + 1e-4).floor();
        OverTimeTimer {
            frequency,
            since_applied: 0.0,
            duration,
            applications_left: total as u64,
        }
    }

    /// Seconds between two applications
    pub fn period(&self) -> f32 {
        1.0 / self.frequency
    }

    /// Advance the timer and return how many applications fell due
    ///
    /// Time past the end of the duration is not credited, and the count
    /// never exceeds [`OverTimeTimer::applications_left`].
    pub fn advance(&mut self, delta_time: f32) -> u64 {
        let credited = delta_time.min(self.duration.max(0.0));
        self.duration -= delta_time;
        self.since_applied += credited;
        if self.applications_left == 0 {
            return 0;
        }

        let elapsed_periods = (f64::from(self.since_applied) * f64::from(self.frequency)).floor();
        let due = (elapsed_periods as u64).min(self.applications_left);
        let consumed = (due as f64 / f64::from(self.frequency)) as f32;
        self.since_applied = (self.since_applied - consumed).max(0.0);
        self.applications_left -= due;
        due
    }

    /// Whether the duration or the applications are spent
    pub fn is_expired(&self) -> bool {
        self.duration <= 0.0 || self.applications_left == 0
    }
}

/// A resource change re-applied on a timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverTimeEffect {
    /// The change applied each period
    pub request: ResourceChangeRequest,
    /// Timer state
    pub timer: OverTimeTimer,
}

/// Store of every timed effect
#[derive(Debug, Clone, Default)]
pub struct OverTimeEffectsRegistry {
    temporary: Vec<TemporaryStatEffect>,
    over_time: Vec<OverTimeEffect>,
}

impl OverTimeEffectsRegistry {
    /// Registry with an initial capacity per effect kind
    pub fn with_capacity(capacity: usize) -> Self {
        OverTimeEffectsRegistry {
            temporary: Vec::with_capacity(capacity),
            over_time: Vec::with_capacity(capacity),
        }
    }

    /// Track an applied stat change for later reversal
    pub fn add_temporary(&mut self, request: StatChangeRequest, duration: f32) {
        self.temporary.push(TemporaryStatEffect {
            request,
            remaining: duration,
        });
    }

    /// Track a resource change to re-apply `frequency` times per second
    ///
    /// The first application happens once a full period has elapsed.
    pub fn add_over_time(&mut self, request: ResourceChangeRequest, frequency: f32, duration: f32) {
        debug_assert!(frequency > 0.0 && frequency.is_finite());
        self.over_time.push(OverTimeEffect {
            request,
            timer: OverTimeTimer::new(frequency, duration),
        });
    }

    /// Count down temporary effects and emit the inverse of each one that
    /// expired, in the order they were added
    pub fn tick_temporary(&mut self, delta_time: f32, expired: &mut Vec<StatChangeRequest>) {
        self.temporary.retain_mut(|effect| {
            effect.remaining -= delta_time;
            if effect.remaining > 0.0 {
                return true;
            }
            if let Some(inverse) = effect.request.inverted() {
                expired.push(inverse);
            }
            false
        });
    }

    /// Advance over-time effects and emit the applications that fell due
    ///
    /// Several applications due in one frame are emitted as a single request
    /// carrying their summed amount.
    pub fn tick_over_time(&mut self, delta_time: f32, due: &mut Vec<ResourceChangeRequest>) {
        self.over_time.retain_mut(|effect| {
            match effect.timer.advance(delta_time) {
                0 => {}
                1 => due.push(effect.request),
                count => {
                    let mut batch = effect.request;
                    batch.value *= count as f32;
                    due.push(batch);
                }
            }
            !effect.timer.is_expired()
        });
    }

    /// Drop every effect targeting an entity without emitting anything
    ///
    /// Returns the number of effects removed.
    pub fn remove_entity(&mut self, id: EntityId) -> usize {
        let before = self.temporary.len() + self.over_time.len();
        self.temporary.retain(|e| e.request.target != id);
        self.over_time.retain(|e| e.request.target != id);
        before - self.temporary.len() - self.over_time.len()
    }

    /// Pending temporary stat effects
    pub fn temporary(&self) -> &[TemporaryStatEffect] {
        &self.temporary
    }

    /// Running resource changes over time
    pub fn over_time(&self) -> &[OverTimeEffect] {
        &self.over_time
    }

    /// Total number of tracked effects
    pub fn len(&self) -> usize {
        self.temporary.len() + self.over_time.len()
    }

    /// Whether no effect is tracked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
