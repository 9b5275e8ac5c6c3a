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
//! Built-in pipeline stages
//!
//! One system per step of the combat frame. [`Scheduler::combat_frame`]
//! wires them in order:
//!
//! 1. [`ResolvePendingInitsSystem`]
//! 2. [`IndexerSystem`]
//! 3. [`TemporaryStatChangesSystem`]
//! 4. [`StatChangeSystem`] between the stat interceptor points
//! 5. [`ResourceChangesOverTimeSystem`]
//! 6. [`FlattenResourceChangesSystem`], [`ApplyResistsSystem`] and
//!    [`ApplyResourceChangesSystem`] around the resource interceptor points
//! 7. [`DeathSystem`]
//! 8. [`EndFrameCleanupSystem`]
//!
//! [`Scheduler::combat_frame`]: crate::ecs::Scheduler::combat_frame

mod cleanup;
mod death;
mod hooks;
mod indexer;
mod init;
mod over_time;
mod resources;
mod stats;
mod temporary;

pub use cleanup::EndFrameCleanupSystem;
pub use death::DeathSystem;
pub use hooks::InterceptorPointSystem;
pub use indexer::IndexerSystem;
pub use init::ResolvePendingInitsSystem;
pub use over_time::ResourceChangesOverTimeSystem;
pub use resources::{ApplyResistsSystem, ApplyResourceChangesSystem, FlattenResourceChangesSystem};
pub use stats::StatChangeSystem;
pub use temporary::TemporaryStatChangesSystem;

pub(crate) use indexer::resolve_targets;
pub(crate) use init::resolve_pending_inits;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run `f` over every request, fanning out to the rayon pool once the batch
/// reaches `threshold`
///
/// Only used for per-request work that reads shared state and writes nothing
/// but the request itself.
#[cfg(feature = "parallel")]
pub(crate) fn for_each_request<T, F>(requests: &mut [T], threshold: usize, f: F)
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    if requests.len() >= threshold {
        requests.par_iter_mut().for_each(f);
    } else {
        requests.iter_mut().for_each(f);
    }
}

#[cfg(not(feature = "parallel"))]
/// Run `f` over every request (sequential fallback when parallel feature disabled)
pub(crate) fn for_each_request<T, F>(requests: &mut [T], _threshold: usize, f: F)
where
    F: Fn(&mut T),
{
    requests.iter_mut().for_each(f);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_each_request_visits_every_item() {
        let mut values: Vec<u32> = (0..100).collect();
        for_each_request(&mut values, 10, |v| *v *= 2);
        assert!(values.iter().enumerate().all(|(i, v)| *v == 2 * i as u32));

        let mut small = vec![1, 2, 3];
        for_each_request(&mut small, 10, |v| *v += 1);
        assert_eq!(small, vec![2, 3, 4]);
    }
}
