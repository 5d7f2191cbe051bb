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

//! Delta projection: lowering a changeset to a flat description of the
//! concrete effects a forest applier needs (spec.md §4.8).

use std::collections::HashMap;

use tracing::instrument;

use crate::changeset::TaggedChange;
use crate::ids::AtomId;
use crate::ids::Revision;
use crate::mark::AttachEffect;
use crate::mark::DetachEffect;
use crate::mark::MarkEffect;

/// Projects a child change to its own delta representation. Kept separate
/// from [`crate::child::ChildOps`] since a delta consumer (a forest
/// applier) and a change-algebra consumer (compose/invert/rebase) are
/// different audiences for the same `C`.
pub trait ChildToDelta<C, D> {
    fn to_delta(&self, child: &C) -> D;
}

/// One run of the **local** stream: `count` consecutive field positions,
/// each getting the same `attach`/`detach`/`child` treatment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDeltaMark<R, D> {
    pub count: u32,
    pub attach: Option<AtomId<R>>,
    pub detach: Option<AtomId<R>>,
    pub child: Option<D>,
}

/// The four parallel streams a changeset lowers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDelta<R, D> {
    pub local: Vec<LocalDeltaMark<R, D>>,
    /// Detached-node child changes, keyed by the detach atom ID that sent
    /// the node into limbo.
    pub global: HashMap<AtomId<R>, D>,
    /// `(oldId, newId)` pairs for a transient's attach-and-detach, and for
    /// a move whose source and destination atom IDs differ.
    pub rename: Vec<(AtomId<R>, AtomId<R>)>,
    /// Atom IDs of new node content an insert introduces. Content itself is
    /// owned by the forest the caller applies this delta to; this crate
    /// only names which atom IDs need one.
    pub build: Vec<AtomId<R>>,
}

impl<R, D> Default for FieldDelta<R, D> {
    fn default() -> Self {
        Self {
            local: Vec::new(),
            global: HashMap::new(),
            rename: Vec::new(),
            build: Vec::new(),
        }
    }
}

/// Projects `change` to a [`FieldDelta`].
#[instrument(level = "debug", skip(change, child_to_delta))]
pub fn into_delta<R, C, D>(
    change: &TaggedChange<R, C>,
    child_to_delta: &dyn ChildToDelta<C, D>,
) -> FieldDelta<R, D>
where
    R: Revision,
    C: Clone,
{
    let mut delta = FieldDelta::default();

    for mark in change.change.marks() {
        match &mark.effect {
            MarkEffect::NoOp if mark.cell_id.is_none() => {
                delta.local.push(LocalDeltaMark {
                    count: mark.count,
                    attach: None,
                    detach: None,
                    child: mark.changes.as_ref().map(|c| child_to_delta.to_delta(c)),
                });
            }
            MarkEffect::NoOp => {
                // A modify folded onto already-detached content: the node
                // lives in the global (detached) pool, not on the field.
                if let (Some(cell_id), Some(child)) = (&mark.cell_id, &mark.changes) {
                    let id = cell_id.atom_id(change.revision());
                    delta.global.insert(id, child_to_delta.to_delta(child));
                }
            }
            MarkEffect::Pin { .. } => {
                delta.local.push(LocalDeltaMark {
                    count: mark.count,
                    attach: None,
                    detach: None,
                    child: mark.changes.as_ref().map(|c| child_to_delta.to_delta(c)),
                });
            }
            // Tombstones produce no delta: a pure witness over cells that
            // never existed as far as this stream is concerned.
            MarkEffect::Tombstone => {}
            MarkEffect::Attach(attach) => {
                let attach_id = attach_local(&mut delta, attach);
                delta.local.push(LocalDeltaMark {
                    count: mark.count,
                    attach: Some(attach_id),
                    detach: None,
                    child: mark.changes.as_ref().map(|c| child_to_delta.to_delta(c)),
                });
            }
            MarkEffect::Detach(detach) => {
                let id = detach_local(&mut delta, detach);
                delta.local.push(LocalDeltaMark {
                    count: mark.count,
                    attach: None,
                    detach: Some(id),
                    child: None,
                });
                if let (DetachEffect::Remove { id }, Some(child)) = (detach, &mark.changes) {
                    delta.global.insert(id.clone(), child_to_delta.to_delta(child));
                }
            }
            MarkEffect::AttachAndDetach(attach, detach) => {
                delta.rename.push((attach.id().clone(), detach.id().clone()));
                if let AttachEffect::Insert { id, .. } = attach {
                    delta.build.push(id.clone());
                }
            }
        }
    }

    delta
}

/// Records an attach's `rename`/`build` bookkeeping and returns the atom ID
/// the local stream's `attach` field should carry (the move's far endpoint
/// when one has been resolved, otherwise the attach's own id).
fn attach_local<R: Revision, D>(delta: &mut FieldDelta<R, D>, attach: &AttachEffect<R>) -> AtomId<R> {
    match attach {
        AttachEffect::Insert { id, .. } => {
            delta.build.push(id.clone());
            id.clone()
        }
        AttachEffect::Revive { id } => id.clone(),
        AttachEffect::MoveIn { id, final_endpoint } => {
            let resolved = final_endpoint.clone().unwrap_or_else(|| id.clone());
            if &resolved != id {
                delta.rename.push((id.clone(), resolved.clone()));
            }
            resolved
        }
    }
}

/// Records a detach's `rename` bookkeeping and returns the atom ID the
/// local stream's `detach` field should carry.
fn detach_local<R: Revision, D>(delta: &mut FieldDelta<R, D>, detach: &DetachEffect<R>) -> AtomId<R> {
    match detach {
        DetachEffect::Remove { id } => id.clone(),
        DetachEffect::MoveOut { id, final_endpoint } => {
            let resolved = final_endpoint.clone().unwrap_or_else(|| id.clone());
            if &resolved != id {
                delta.rename.push((id.clone(), resolved.clone()));
            }
            id.clone()
        }
    }
}
