// Copyright 2026 The seqfield-algebra Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The cross-field manager: a side table tracking move endpoints that span
//! input changesets, keyed by atom id (spec.md §4.7).

use std::collections::HashMap;

use crate::ids::AtomId;
use crate::ids::Revision;
use crate::mark::AttachEffect;
use crate::mark::DetachEffect;
use crate::mark::Mark;
use crate::mark::MarkEffect;

/// Tracks `finalEndpoint` chains for move atoms.
///
/// Conceptually a union-find over atom ids, kept as two hop maps rather
/// than one: [`Self::link`] records that `from`'s chain now continues at
/// `to`, and that's true in both directions -- [`Self::resolve_final_endpoint`]
/// follows `next_hop` forward to the chain's far end (what a move's
/// original `MoveOut` wants), while [`Self::resolve_origin`] follows
/// `prev_hop` backward to the chain's near end (what a move's final
/// `MoveIn` wants). Both compress their path as they go, giving amortized
/// O(1) resolution per mark as required by spec.md §5.
#[derive(Default)]
pub struct CrossFieldManager<R> {
    /// Maps an endpoint atom id to the next hop in its chain, if the chain
    /// has been extended past it.
    next_hop: HashMap<AtomId<R>, AtomId<R>>,
    /// Maps an endpoint atom id to the hop that chains into it.
    prev_hop: HashMap<AtomId<R>, AtomId<R>>,
}

impl<R: Revision> CrossFieldManager<R> {
    pub fn new() -> Self {
        Self {
            next_hop: HashMap::new(),
            prev_hop: HashMap::new(),
        }
    }

    /// Records that `from`'s chain now continues at `to`.
    pub fn link(&mut self, from: AtomId<R>, to: AtomId<R>) {
        self.prev_hop.insert(to.clone(), from.clone());
        self.next_hop.insert(from, to);
    }

    /// Follows `id`'s chain forward to its current far end, compressing the
    /// path as it goes so future lookups for any node on the path are
    /// O(1).
    pub fn resolve_final_endpoint(&mut self, id: &AtomId<R>) -> AtomId<R> {
        let mut current = id.clone();
        let mut path = Vec::new();
        while let Some(next) = self.next_hop.get(&current) {
            path.push(current.clone());
            current = next.clone();
        }
        for node in path {
            if node != current {
                self.next_hop.insert(node, current.clone());
            }
        }
        current
    }

    /// Follows `id`'s chain backward to its current near end (the origin
    /// of the chain `id` is the current tail of), compressing the path as
    /// it goes.
    pub fn resolve_origin(&mut self, id: &AtomId<R>) -> AtomId<R> {
        let mut current = id.clone();
        let mut path = Vec::new();
        while let Some(prev) = self.prev_hop.get(&current) {
            path.push(current.clone());
            current = prev.clone();
        }
        for node in path {
            if node != current {
                self.prev_hop.insert(node, current.clone());
            }
        }
        current
    }

    /// Whether `id` is known to this manager (has been linked as either
    /// end of a chain).
    pub fn contains(&self, id: &AtomId<R>) -> bool {
        self.next_hop.contains_key(id) || self.prev_hop.contains_key(id)
    }

    fn has_forward_link(&self, id: &AtomId<R>) -> bool {
        self.next_hop.contains_key(id)
    }

    fn has_backward_link(&self, id: &AtomId<R>) -> bool {
        self.prev_hop.contains_key(id)
    }
}

/// Walks `marks`, filling in `final_endpoint` on any plain `MoveOut`/
/// `MoveIn` that `cfm` linked into a multi-hop chain during the same
/// `compose_two`/`rebase` call: a `MoveOut` resolves forward to the
/// chain's far end, a `MoveIn` resolves backward to its near end. A move
/// whose two halves land together in one `AttachAndDetach` transient is
/// left untouched -- `into_delta`'s `rename` stream already records that
/// pairing directly from the transient itself.
pub fn apply_final_endpoints<R, C>(marks: Vec<Mark<R, C>>, cfm: &mut CrossFieldManager<R>) -> Vec<Mark<R, C>>
where
    R: Revision,
{
    marks
        .into_iter()
        .map(|mut mark| {
            match &mut mark.effect {
                MarkEffect::Detach(DetachEffect::MoveOut { id, final_endpoint }) if cfm.has_forward_link(id) => {
                    *final_endpoint = Some(cfm.resolve_final_endpoint(id));
                }
                MarkEffect::Attach(AttachEffect::MoveIn { id, final_endpoint }) if cfm.has_backward_link(id) => {
                    *final_endpoint = Some(cfm.resolve_origin(id));
                }
                _ => {}
            }
            mark
        })
        .collect()
}
