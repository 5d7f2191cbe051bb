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

//! Inversion: the change that undoes a changeset (spec.md §4.5).

use tracing::instrument;

use crate::changeset::Changeset;
use crate::changeset::MarkListBuilder;
use crate::child::ChildOps;
use crate::error::ChangesetResult;
use crate::ids::AtomId;
use crate::ids::Revision;
use crate::mark::AttachEffect;
use crate::mark::DetachEffect;
use crate::mark::Mark;
use crate::mark::MarkEffect;

/// Inverts `change`, producing the changeset that, composed after `change`,
/// cancels it back to a no-op (spec.md §4.5, the "sandwich law":
/// `compose([change, invert(change)]) ≡ empty`).
///
/// `new_revision` names the atoms the inverse mints for its own fresh
/// attaches (an inverted `Remove` becomes a `Revive` that needs no new atom,
/// but an inverted `Insert` becomes a `Remove` that is itself named by an
/// atom under `new_revision`). `is_rollback` is forwarded to
/// [`ChildOps::invert`] and controls whether the cell-order oracle treats
/// this inverse's reinstated cells as siding with the original attach's
/// tiebreak (spec.md §9).
#[instrument(level = "debug", skip(change, child_ops))]
pub fn invert<R, C>(
    change: &Changeset<R, C>,
    is_rollback: bool,
    new_revision: &R,
    child_ops: &dyn ChildOps<R, C>,
) -> ChangesetResult<Changeset<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let mut builder = MarkListBuilder::new(new_revision.clone());
    let mut next_local = 0u32;

    for mark in change.marks() {
        let inverted = invert_mark(mark, is_rollback, new_revision, &mut next_local, child_ops)?;
        builder.push(inverted);
    }
    Ok(builder.build())
}

fn mint_id<R: Revision>(new_revision: &R, next_local: &mut u32, count: u32) -> AtomId<R> {
    let id = AtomId::new(new_revision.clone(), crate::ids::LocalId(*next_local));
    *next_local += count;
    id
}

fn invert_mark<R, C>(
    mark: &Mark<R, C>,
    is_rollback: bool,
    new_revision: &R,
    next_local: &mut u32,
    child_ops: &dyn ChildOps<R, C>,
) -> ChangesetResult<Mark<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let inverted_changes = mark
        .changes
        .as_ref()
        .map(|c| child_ops.invert(c, is_rollback, new_revision))
        .transpose()?;

    let effect = match &mark.effect {
        // Skipping nothing inverts to skipping nothing; a modify inverts to
        // the child algebra's own inverse of the modify.
        MarkEffect::NoOp => MarkEffect::NoOp,
        // A pin recorded that a revive landed on an already-populated cell;
        // inverting it re-detaches via the id it carried, same as a plain
        // remove would.
        MarkEffect::Pin { id } => MarkEffect::Detach(DetachEffect::Remove { id: id.clone() }),
        // A pure witness inverts to itself: the cells were empty before and
        // stay empty after undoing whatever never touched them.
        MarkEffect::Tombstone => MarkEffect::Tombstone,
        MarkEffect::Attach(attach) => invert_attach(attach, new_revision, next_local, mark.count),
        MarkEffect::Detach(detach) => invert_detach(detach),
        MarkEffect::AttachAndDetach(attach, detach) => {
            // Undoing "attach then detach" is "attach [the old detach's
            // target] then detach [the old attach's target]": the inverse
            // is itself a transient, with the two inner effects swapped and
            // each individually inverted.
            let new_attach = match invert_detach(detach) {
                MarkEffect::Attach(a) => a,
                other => unreachable!("invert_detach always yields Attach, got {other:?}"),
            };
            let new_detach = match invert_attach(attach, new_revision, next_local, mark.count) {
                MarkEffect::Detach(d) => d,
                other => unreachable!("invert_attach always yields Detach, got {other:?}"),
            };
            MarkEffect::AttachAndDetach(new_attach, new_detach)
        }
    };

    let mut result = Mark::new(mark.count, effect);
    result.cell_id = invert_cell_id(mark);
    result.changes = inverted_changes;
    Ok(result)
}

/// The inverse mark's `cellId`.
///
/// `Remove` inverts to `Revive`, which names the exact cell the remove
/// emptied, so the inverse needs a `cellId`; `MoveOut` inverts to `MoveIn`,
/// which (like `Insert`) lands on new territory and needs none. `NoOp` and
/// `Tombstone` are occupancy-preserving in both directions, so the inverse
/// simply carries over whatever `cellId` the original mark had.
fn invert_cell_id<R, C>(mark: &Mark<R, C>) -> Option<crate::cell::CellId<R>>
where
    R: Revision,
{
    match &mark.effect {
        MarkEffect::NoOp | MarkEffect::Tombstone => mark.cell_id.clone(),
        MarkEffect::Pin { .. } | MarkEffect::Attach(_) => None,
        MarkEffect::Detach(DetachEffect::Remove { id })
        | MarkEffect::AttachAndDetach(_, DetachEffect::Remove { id }) => {
            Some(crate::cell::CellId::new(id.revision.clone(), id.local_id))
        }
        MarkEffect::Detach(DetachEffect::MoveOut { .. })
        | MarkEffect::AttachAndDetach(_, DetachEffect::MoveOut { .. }) => None,
    }
}

fn invert_attach<R: Revision>(
    attach: &AttachEffect<R>,
    new_revision: &R,
    next_local: &mut u32,
    count: u32,
) -> MarkEffect<R> {
    match attach {
        // Undoing an insert removes what was inserted, under a fresh atom
        // minted in the inverse's own revision.
        AttachEffect::Insert { .. } => {
            MarkEffect::Detach(DetachEffect::Remove { id: mint_id(new_revision, next_local, count) })
        }
        // Undoing a revive re-removes the exact cells it revived.
        AttachEffect::Revive { id } => MarkEffect::Detach(DetachEffect::Remove { id: id.clone() }),
        // Undoing a move-in moves the content back out, under a fresh atom;
        // the cross-field manager re-links this to the matching move-out
        // when the inverse is itself composed or rebased.
        AttachEffect::MoveIn { final_endpoint, .. } => MarkEffect::Detach(DetachEffect::MoveOut {
            id: mint_id(new_revision, next_local, count),
            final_endpoint: final_endpoint.clone(),
        }),
    }
}

fn invert_detach<R: Revision>(detach: &DetachEffect<R>) -> MarkEffect<R> {
    match detach {
        // Undoing a remove revives the exact cells it emptied.
        DetachEffect::Remove { id } => MarkEffect::Attach(AttachEffect::Revive { id: id.clone() }),
        // Undoing a move-out revives the cells it moved away, tagged as a
        // move-in of the same chain.
        DetachEffect::MoveOut { id, final_endpoint } => MarkEffect::Attach(AttachEffect::MoveIn {
            id: id.clone(),
            final_endpoint: final_endpoint.clone(),
        }),
    }
}
