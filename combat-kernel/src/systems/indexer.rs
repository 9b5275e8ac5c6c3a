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
//! Target resolution
//!
//! Every queued request names its target by handle. Indexing turns handles
//! into dense slots once per frame so later stages can address the columns
//! directly; requests whose target is no longer alive are dropped here and
//! never produce a result.

use crate::ecs::actions::{ResourceChangeRequest, StatChangeRequest};
use crate::ecs::{CombatWorld, EntityId, EntityMap, System};
use crate::systems::for_each_request;
use log::trace;

/// A request addressed to one entity
pub(crate) trait Targeted {
    fn target(&self) -> EntityId;
    fn target_index(&self) -> Option<usize>;
    fn set_target_index(&mut self, index: Option<usize>);
}

impl Targeted for StatChangeRequest {
    fn target(&self) -> EntityId {
        self.target
    }

    fn target_index(&self) -> Option<usize> {
        self.target_index
    }

    fn set_target_index(&mut self, index: Option<usize>) {
        self.target_index = index;
    }
}

impl Targeted for ResourceChangeRequest {
    fn target(&self) -> EntityId {
        self.target
    }

    fn target_index(&self) -> Option<usize> {
        self.target_index
    }

    fn set_target_index(&mut self, index: Option<usize>) {
        self.target_index = index;
    }
}

/// Resolve the targets of `requests[from..]` and drop the stale ones
///
/// Requests before `from` are expected to be resolved already. Returns the
/// number of requests dropped.
pub(crate) fn resolve_targets<T>(
    requests: &mut Vec<T>,
    from: usize,
    entities: &EntityMap,
    threshold: usize,
) -> usize
where
    T: Targeted + Send,
{
    let from = from.min(requests.len());
    for_each_request(&mut requests[from..], threshold, |request| {
        request.set_target_index(entities.index_of(request.target()));
    });

    let before = requests.len();
    requests.retain(|request| request.target_index().is_some());
    before - requests.len()
}

/// Resolves request targets to slots for the rest of the frame
pub struct IndexerSystem;

impl System for IndexerSystem {
    fn run(&mut self, world: &mut CombatWorld) {
        let threshold = world.config.parallel_threshold;
        let entities = &world.entities;

        let stale_stats = resolve_targets(world.actions.stat_requests_mut(), 0, entities, threshold);
        let stale_resources =
            resolve_targets(world.actions.resource_requests_mut(), 0, entities, threshold);

        trace!(
            "Indexed {} stat and {} resource requests ({} stale dropped)",
            world.actions.stat_requests().len(),
            world.actions.resource_requests().len(),
            stale_stats + stale_resources
        );
    }
}
