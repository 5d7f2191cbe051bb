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

//! Rebase: rewriting a changeset's intent as if another changeset had
//! already applied (spec.md §4.6).

use std::collections::HashSet;

use tracing::instrument;

use crate::cell::CellId;
use crate::changeset::Changeset;
use crate::changeset::MarkListBuilder;
use crate::changeset::TaggedChange;
use crate::child::ChildOps;
use crate::config::Config;
use crate::cross_field::apply_final_endpoints;
use crate::cross_field::CrossFieldManager;
use crate::error::ChangesetResult;
use crate::ids::AtomId;
use crate::ids::Revision;
use crate::mark::AttachEffect;
use crate::mark::DetachEffect;
use crate::mark::Mark;
use crate::mark::MarkEffect;
use crate::metadata::RevisionMetadata;
use crate::queue::MarkQueue;

/// Rebases `change` over `over`: produces the change that applies `change`'s
/// intent as if `over` had happened first.
///
/// Moves whose destination never shows up among `change`'s own marks are
/// tracked via the [`CrossFieldManager`] and, if still unresolved once both
/// inputs are consumed, muted in place (spec.md §4.6 "Failure semantics").
///
/// Fresh attaches on either side (an `Insert` or a `MoveIn` landing on new
/// territory) never need the cell-order oracle here: each carries its own
/// [`crate::mark::Tiebreak`], which is what later resolves its position
/// relative to a concurrent attach at the same gap, so `config` is accepted
/// for parity with [`crate::compose::compose`] but is not otherwise
/// consulted by this operator (see `DESIGN.md`).
#[instrument(level = "debug", skip(change, over, metadata, child_ops))]
pub fn rebase<R, C>(
    change: &TaggedChange<R, C>,
    over: &TaggedChange<R, C>,
    metadata: &dyn RevisionMetadata<R>,
    child_ops: &dyn ChildOps<R, C>,
    config: &Config,
) -> ChangesetResult<Changeset<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let _ = metadata;
    let _ = config;
    let change_rev = change.revision().clone();
    let over_rev = over.revision().clone();
    let mut change_queue = MarkQueue::new(change.change.marks().iter().cloned());
    let mut over_queue = MarkQueue::new(over.change.marks().iter().cloned());
    let mut builder = MarkListBuilder::new(change_rev.clone());
    let mut muted: HashSet<AtomId<R>> = HashSet::new();
    let mut cfm: CrossFieldManager<R> = CrossFieldManager::new();

    loop {
        if let Some(c_head) = change_queue.peek() {
            if is_fresh_attach(&c_head.effect) {
                let count = c_head.count;
                let mark = change_queue.pop_up_to(count).expect("peeked head exists");
                builder.push(mark);
                continue;
            }
        }
        if let Some(o_head) = over_queue.peek() {
            if is_fresh_attach(&o_head.effect) {
                let count = o_head.count;
                over_queue.pop_up_to(count);
                continue;
            }
        }
        // A ragged tail -- one side's field extends further than the
        // other's -- is implicitly untouched there: nothing in `over`
        // concurrently touched a cell `change` doesn't mention, and
        // anything `change` does past where `over` ends has no concurrent
        // edit to rebase against.
        if change_queue.is_empty() {
            break;
        }
        if over_queue.is_empty() {
            let count = change_queue.peek_count();
            builder.push(change_queue.pop_up_to(count).expect("nonempty queue has a head"));
            continue;
        }
        let count = change_queue.peek_count().min(over_queue.peek_count());
        let c = change_queue.pop_up_to(count).expect("nonzero count implies a head");
        let o = over_queue.pop_up_to(count).expect("nonzero count implies a head");
        let outcome = classify_over(&o, &over_rev);
        let mark = rebase_pair(&c, outcome, &change_rev, &mut muted, &mut cfm, child_ops)?;
        builder.push(mark);
    }

    let muted_result = mute_unresolved_moves(builder.build(), &muted, &change_rev);
    let marks = apply_final_endpoints(muted_result.into_marks(), &mut cfm);
    Ok(Changeset::from_marks_unchecked(marks))
}

fn is_fresh_attach<R: Revision>(effect: &MarkEffect<R>) -> bool {
    matches!(
        effect,
        MarkEffect::Attach(AttachEffect::Insert { .. }) | MarkEffect::Attach(AttachEffect::MoveIn { .. })
    ) || matches!(
        effect,
        MarkEffect::AttachAndDetach(AttachEffect::Insert { .. }, _)
            | MarkEffect::AttachAndDetach(AttachEffect::MoveIn { .. }, _)
    )
}

/// What `over`'s aligned mark did to a cell, from `change`'s point of view.
enum OverOutcome<R, C> {
    /// Populated before and after; only a concurrent child edit, if any.
    Unchanged { child_o: Option<C> },
    /// Was populated, is now empty, named by this witness.
    Emptied { witness: CellId<R>, child_o: Option<C> },
    /// Was empty, is now populated by this attach.
    Filled { attach_o: AttachEffect<R>, child_o: Option<C> },
    /// Empty before and after (a pure witness, or a detached-content edit).
    StillEmpty { child_o: Option<C> },
}

fn classify_over<R, C>(o: &Mark<R, C>, over_rev: &R) -> OverOutcome<R, C>
where
    R: Revision,
    C: Clone,
{
    let _ = over_rev;
    match &o.effect {
        MarkEffect::NoOp if o.cell_id.is_none() => OverOutcome::Unchanged {
            child_o: o.changes.clone(),
        },
        MarkEffect::NoOp => OverOutcome::StillEmpty {
            child_o: o.changes.clone(),
        },
        MarkEffect::Pin { .. } => OverOutcome::Unchanged {
            child_o: o.changes.clone(),
        },
        MarkEffect::Tombstone => OverOutcome::StillEmpty { child_o: None },
        MarkEffect::Attach(a) => OverOutcome::Filled {
            attach_o: a.clone(),
            child_o: o.changes.clone(),
        },
        MarkEffect::Detach(d) => OverOutcome::Emptied {
            witness: CellId::new(d.id().revision.clone(), d.id().local_id),
            child_o: o.changes.clone(),
        },
        MarkEffect::AttachAndDetach(_, d) => OverOutcome::Emptied {
            witness: CellId::new(d.id().revision.clone(), d.id().local_id),
            child_o: o.changes.clone(),
        },
    }
}

fn rebase_child<R, C>(
    child_ops: &dyn ChildOps<R, C>,
    c_child: Option<C>,
    o_child: Option<C>,
) -> ChangesetResult<Option<C>>
where
    R: Revision,
{
    match (c_child, o_child) {
        (Some(c), Some(o)) => Ok(Some(child_ops.rebase(&c, &o)?)),
        (Some(c), None) => Ok(Some(c)),
        (None, _) => Ok(None),
    }
}

fn rebase_pair<R, C>(
    c: &Mark<R, C>,
    outcome: OverOutcome<R, C>,
    change_rev: &R,
    muted: &mut HashSet<AtomId<R>>,
    cfm: &mut CrossFieldManager<R>,
    child_ops: &dyn ChildOps<R, C>,
) -> ChangesetResult<Mark<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let _ = change_rev;
    match outcome {
        OverOutcome::Unchanged { child_o } => {
            let mut mark = c.clone();
            mark.changes = rebase_child(child_ops, c.changes.clone(), child_o)?;
            Ok(mark)
        }
        OverOutcome::Emptied { witness, child_o } => match &c.effect {
            MarkEffect::NoOp if c.cell_id.is_none() => {
                let mut mark = Mark::new(c.count, MarkEffect::NoOp);
                mark.cell_id = Some(witness);
                mark.changes = rebase_child(child_ops, c.changes.clone(), child_o)?;
                Ok(mark)
            }
            MarkEffect::Pin { id } => {
                let mut mark = Mark::new(c.count, MarkEffect::Attach(AttachEffect::Revive { id: id.clone() }));
                mark.cell_id = Some(witness);
                mark.changes = rebase_child(child_ops, c.changes.clone(), child_o)?;
                Ok(mark)
            }
            MarkEffect::Detach(d) => {
                if let DetachEffect::MoveOut { id, .. } = d {
                    muted.insert(id.clone());
                }
                let mut mark = Mark::new(c.count, MarkEffect::Tombstone);
                mark.cell_id = Some(witness);
                Ok(mark)
            }
            _ => {
                tracing::debug!(
                    "rebase: a mark whose input `over` had never touched landed on a \
                     cell `over` emptied; keeping it verbatim as a best-effort fallback"
                );
                Ok(c.clone())
            }
        },
        OverOutcome::Filled { attach_o, child_o } => match &c.effect {
            MarkEffect::Tombstone => {
                let mut mark = Mark::new(c.count, MarkEffect::NoOp);
                mark.changes = rebase_child(child_ops, None, child_o)?;
                Ok(mark)
            }
            MarkEffect::NoOp if c.cell_id.is_some() => {
                let mut mark = Mark::new(c.count, MarkEffect::NoOp);
                mark.changes = rebase_child(child_ops, c.changes.clone(), child_o)?;
                Ok(mark)
            }
            MarkEffect::Attach(AttachEffect::Revive { id })
            | MarkEffect::Attach(AttachEffect::MoveIn { id, .. }) => {
                if let AttachEffect::MoveIn { id: attach_id, .. } = &attach_o {
                    cfm.link(id.clone(), attach_id.clone());
                }
                let mut mark = Mark::new(c.count, MarkEffect::Pin { id: id.clone() });
                mark.changes = rebase_child(child_ops, c.changes.clone(), child_o)?;
                Ok(mark)
            }
            _ => {
                tracing::debug!(
                    "rebase: a transient's attach half collided with a concurrent fill; \
                     keeping it verbatim as a best-effort fallback"
                );
                Ok(c.clone())
            }
        },
        OverOutcome::StillEmpty { child_o } => {
            let mut mark = c.clone();
            mark.changes = rebase_child(child_ops, c.changes.clone(), child_o)?;
            Ok(mark)
        }
    }
}

/// Converts any `MoveIn` whose matching `MoveOut` got tombstoned by this
/// same rebase into a `Tombstone` of its own: a muted move never arrives,
/// so its destination never actually attaches anything.
fn mute_unresolved_moves<R, C>(
    changeset: Changeset<R, C>,
    muted: &HashSet<AtomId<R>>,
    default_revision: &R,
) -> Changeset<R, C>
where
    R: Revision,
    C: Clone + PartialEq,
{
    if muted.is_empty() {
        return changeset;
    }
    let mut builder = MarkListBuilder::new(default_revision.clone());
    for mark in changeset.into_marks() {
        match &mark.effect {
            MarkEffect::Attach(AttachEffect::MoveIn { id, .. }) if muted.contains(id) => {
                let mut replacement = Mark::new(mark.count, MarkEffect::Tombstone);
                replacement.cell_id = Some(CellId::new(id.revision.clone(), id.local_id));
                builder.push(replacement);
            }
            _ => builder.push(mark),
        }
    }
    builder.build()
}
