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

//! Sequential composition of two (or more) changesets (spec.md §4.4).

use tracing::instrument;

use crate::cell::CellId;
use crate::changeset::Changeset;
use crate::changeset::MarkListBuilder;
use crate::changeset::TaggedChange;
use crate::child::ChildOps;
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
use crate::queue::align_heads;
use crate::queue::MarkQueue;

/// Composes a sequence of tagged changes into one changeset, left to right.
///
/// `compose(&[]) == Changeset::empty()` and `compose(&[a]) ≡ a.change`,
/// satisfying the identity law of spec.md §8 item 1.
#[instrument(level = "debug", skip(changes, metadata, child_ops))]
pub fn compose<R, C>(
    changes: &[TaggedChange<R, C>],
    metadata: &dyn RevisionMetadata<R>,
    child_ops: &dyn ChildOps<R, C>,
) -> ChangesetResult<Changeset<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let mut iter = changes.iter();
    let Some(first) = iter.next() else {
        return Ok(Changeset::empty());
    };
    let mut acc_change = first.change.clone();
    let mut acc_revision = first.revision().clone();
    for next in iter {
        let acc_tagged = TaggedChange::new(acc_change, acc_revision.clone());
        acc_change = compose_two(&acc_tagged, next, metadata, child_ops)?;
        acc_revision = next.revision().clone();
    }
    Ok(acc_change)
}

/// Composition without recursive child composition; used when child
/// changes are already known to be independent (spec.md §4.4).
pub fn shallow_compose<R, C>(
    base: &TaggedChange<R, C>,
    next: &TaggedChange<R, C>,
) -> ChangesetResult<Changeset<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    struct NoChildCompose;
    impl<R: Revision, C: Clone> ChildOps<R, C> for NoChildCompose {
        fn compose(&self, a: &C, _b: &C) -> ChangesetResult<C> {
            Ok(a.clone())
        }

        fn invert(&self, a: &C, _is_rollback: bool, _new_revision: &R) -> ChangesetResult<C> {
            Ok(a.clone())
        }

        fn rebase(&self, a: &C, _over: &C) -> ChangesetResult<C> {
            Ok(a.clone())
        }

        fn tag(&self, change: C, _revision: &R) -> C {
            change
        }
    }
    struct DummyMetadata;
    impl<R: Revision> RevisionMetadata<R> for DummyMetadata {
        fn info(&self, _revision: &R) -> Option<crate::metadata::RevisionInfo<R>> {
            None
        }

        fn compare(&self, _a: &R, _b: &R) -> std::cmp::Ordering {
            std::cmp::Ordering::Equal
        }
    }
    compose_two(base, next, &DummyMetadata, &NoChildCompose)
}

#[instrument(level = "debug", skip(base, next, metadata, child_ops))]
pub fn compose_two<R, C>(
    base: &TaggedChange<R, C>,
    next: &TaggedChange<R, C>,
    metadata: &dyn RevisionMetadata<R>,
    child_ops: &dyn ChildOps<R, C>,
) -> ChangesetResult<Changeset<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let base_rev = base.revision().clone();
    let next_rev = next.revision().clone();

    let mut base_queue = MarkQueue::new(base.change.marks().iter().cloned());
    let mut next_queue = MarkQueue::new(next.change.marks().iter().cloned());
    let mut cfm: CrossFieldManager<R> = CrossFieldManager::new();
    let mut builder = MarkListBuilder::new(next_rev.clone());

    // Neither changeset need name the same number of cells: whichever
    // field ends first is implicitly untouched beyond its last mark, so a
    // ragged tail on either side just passes through unchanged.
    loop {
        // `next` is expressed against the field *after* `base` lands, so a
        // fresh attach in `next` (brand-new territory, not one of `base`'s
        // cells) has nothing in `base` to align against -- it passes
        // through untouched and consumes none of `base_queue`. `base`'s own
        // fresh attaches have no such exemption: they became real cells of
        // the post-`base` field, which `next`'s marks necessarily enumerate.
        if let Some(n_head) = next_queue.peek() {
            if is_fresh_attach(&n_head.effect) {
                let count = n_head.count;
                builder.push(next_queue.pop_up_to(count).expect("peeked head exists"));
                continue;
            }
        }
        if base_queue.is_empty() {
            let Some(count) = (!next_queue.is_empty()).then(|| next_queue.peek_count()) else {
                break;
            };
            builder.push(next_queue.pop_up_to(count).expect("nonempty queue has a head"));
            continue;
        }
        if next_queue.is_empty() {
            let count = base_queue.peek_count();
            builder.push(base_queue.pop_up_to(count).expect("nonempty queue has a head"));
            continue;
        }
        let (b, n) = align_heads(&mut base_queue, &mut next_queue).expect("both queues nonempty");
        let mark = combine_marks(&b, &n, &base_rev, &next_rev, next.rollback_of.as_ref(), &mut cfm, child_ops)?;
        builder.push(mark);
    }

    let marks = apply_final_endpoints(builder.build().into_marks(), &mut cfm);
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

/// The "proximate" state a mark leaves behind, abstracting away whether it
/// got there via a plain effect or a transient, so that combining with the
/// next mark only has to consider "populated" vs. "empty".
enum Proximate<R, C> {
    Populated {
        pin_id: Option<AtomId<R>>,
        child: Option<C>,
    },
    Empty {
        witness: Option<CellId<R>>,
        /// The detach that actually emptied these cells, if any (absent
        /// for a pure [`MarkEffect::Tombstone`] witness, which had no
        /// detach of its own). Needed to reproduce `b`'s real effect --
        /// `Remove` vs. `MoveOut`, and which atom -- when `n` leaves the
        /// range untouched.
        detach: Option<DetachEffect<R>>,
        child: Option<C>,
    },
}

#[allow(clippy::too_many_arguments)]
fn combine_marks<R, C>(
    b: &Mark<R, C>,
    n: &Mark<R, C>,
    base_rev: &R,
    next_rev: &R,
    rollback_of: Option<&R>,
    cfm: &mut CrossFieldManager<R>,
    child_ops: &dyn ChildOps<R, C>,
) -> ChangesetResult<Mark<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let count = b.count.min(n.count);
    let pending_attach = attach_half(&b.effect);
    let pending_attach_cell = pending_attach_cell_id(b);
    let proximate = proximate_of(b, base_rev);

    let mut result = match proximate {
        Proximate::Populated { pin_id, child } => combine_populated(
            pin_id,
            child,
            pending_attach,
            pending_attach_cell,
            n,
            next_rev,
            cfm,
            child_ops,
        )?,
        Proximate::Empty { witness, detach, child } => combine_empty(
            witness,
            detach,
            child,
            pending_attach,
            pending_attach_cell,
            n,
            next_rev,
            rollback_of,
            cfm,
            child_ops,
        )?,
    };
    result.count = count;
    Ok(result)
}

fn attach_half<R: Revision, C: Clone>(effect: &MarkEffect<R>) -> Option<AttachEffect<R>> {
    match effect {
        MarkEffect::Attach(a) => Some(a.clone()),
        MarkEffect::AttachAndDetach(a, _) => Some(a.clone()),
        _ => None,
    }
}

/// `b`'s own `cellId`, carried along only when `b`'s pending attach is a
/// `Revive` (the one attach variant that itself requires a `cellId`, per
/// invariant 4) -- needed so a subsequent `AttachAndDetach` wrapping that
/// same attach keeps the right `cellId`.
fn pending_attach_cell_id<R: Revision, C>(mark: &Mark<R, C>) -> Option<CellId<R>> {
    match &mark.effect {
        MarkEffect::Attach(AttachEffect::Revive { .. })
        | MarkEffect::AttachAndDetach(AttachEffect::Revive { .. }, _) => mark.cell_id.clone(),
        _ => None,
    }
}

fn proximate_of<R: Revision, C: Clone>(mark: &Mark<R, C>, default_rev: &R) -> Proximate<R, C> {
    let _ = default_rev;
    match &mark.effect {
        MarkEffect::NoOp => {
            if let Some(cell_id) = &mark.cell_id {
                Proximate::Empty {
                    witness: Some(cell_id.clone()),
                    detach: None,
                    child: mark.changes.clone(),
                }
            } else {
                Proximate::Populated {
                    pin_id: None,
                    child: mark.changes.clone(),
                }
            }
        }
        MarkEffect::Pin { id } => Proximate::Populated {
            pin_id: Some(id.clone()),
            child: mark.changes.clone(),
        },
        MarkEffect::Tombstone => Proximate::Empty {
            witness: mark.cell_id.clone(),
            detach: None,
            child: None,
        },
        MarkEffect::Attach(_) => Proximate::Populated {
            pin_id: None,
            child: mark.changes.clone(),
        },
        MarkEffect::Detach(d) => Proximate::Empty {
            witness: Some(CellId::new(d.id().revision.clone(), d.id().local_id)),
            detach: Some(d.clone()),
            child: mark.changes.clone(),
        },
        MarkEffect::AttachAndDetach(_, d) => Proximate::Empty {
            witness: Some(CellId::new(d.id().revision.clone(), d.id().local_id)),
            detach: Some(d.clone()),
            child: mark.changes.clone(),
        },
    }
}

fn compose_child<R: Revision, C: Clone + PartialEq>(
    child_ops: &dyn ChildOps<R, C>,
    a: Option<C>,
    b: Option<C>,
) -> ChangesetResult<Option<C>> {
    match (a, b) {
        (Some(a), Some(b)) => Ok(Some(child_ops.compose(&a, &b)?)),
        (Some(a), None) => Ok(Some(a)),
        (None, Some(b)) => Ok(Some(b)),
        (None, None) => Ok(None),
    }
}

#[allow(clippy::too_many_arguments)]
fn combine_populated<R, C>(
    pin_id: Option<AtomId<R>>,
    child_b: Option<C>,
    pending_attach: Option<AttachEffect<R>>,
    pending_attach_cell: Option<CellId<R>>,
    n: &Mark<R, C>,
    next_rev: &R,
    cfm: &mut CrossFieldManager<R>,
    child_ops: &dyn ChildOps<R, C>,
) -> ChangesetResult<Mark<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let _ = next_rev;
    match &n.effect {
        MarkEffect::NoOp if n.cell_id.is_none() => {
            // `n` leaves this range untouched: whatever made it populated in
            // the first place -- an attach, a pin, or nothing at all --
            // must be reproduced in the output, since the result still has
            // to be applied against the truly original (pre-`base`) field.
            let child = compose_child(child_ops, child_b, n.changes.clone())?;
            let mut mark = match pending_attach {
                Some(a) => {
                    let mut mark = Mark::new(n.count, MarkEffect::Attach(a));
                    mark.cell_id = pending_attach_cell;
                    mark
                }
                None => match pin_id {
                    Some(id) => Mark::new(n.count, MarkEffect::Pin { id }),
                    None => Mark::new(n.count, MarkEffect::NoOp),
                },
            };
            mark.changes = child;
            Ok(mark)
        }
        MarkEffect::Pin { id } => {
            let child = compose_child(child_ops, child_b, n.changes.clone())?;
            let mut mark = Mark::new(n.count, MarkEffect::Pin { id: id.clone() });
            mark.changes = child;
            Ok(mark)
        }
        MarkEffect::Detach(d) => {
            let child = compose_child(child_ops, child_b, n.changes.clone())?;
            if let Some(a) = pending_attach {
                if let (AttachEffect::MoveIn { id: in_id, .. }, DetachEffect::MoveOut { id: out_id, .. }) =
                    (&a, d)
                {
                    cfm.link(in_id.clone(), out_id.clone());
                }
                let mut mark = Mark::new(n.count, MarkEffect::AttachAndDetach(a, d.clone()));
                mark.cell_id = pending_attach_cell;
                mark.changes = child;
                Ok(mark)
            } else {
                let mut mark = Mark::new(n.count, MarkEffect::Detach(d.clone()));
                mark.changes = child;
                Ok(mark)
            }
        }
        _ => {
            tracing::debug!(
                "compose: populated-continuation met an effect requiring empty input; \
                 keeping the later mark verbatim as a best-effort fallback"
            );
            Ok(n.clone())
        }
    }
}

/// Reconstructs the mark for a cell range that `b` left empty and `n`
/// leaves untouched: `b`'s own detach (and, for a transient, its attach
/// half too) must survive verbatim, since a genuine `Remove` and a
/// `MoveOut` aren't interchangeable downstream (delta projection and
/// inversion tell them apart).
fn reproduce_empty<R, C>(
    cell_id: Option<CellId<R>>,
    child_b: Option<C>,
    pending_attach: Option<AttachEffect<R>>,
    detach: Option<DetachEffect<R>>,
    pending_attach_cell: Option<CellId<R>>,
    count: u32,
) -> Mark<R, C>
where
    R: Revision,
{
    if let Some(child) = child_b {
        let mut mark = Mark::new(count, MarkEffect::NoOp);
        mark.cell_id = cell_id;
        mark.changes = Some(child);
        return mark;
    }
    match (pending_attach, detach) {
        (Some(a), Some(d)) => {
            let mut mark = Mark::new(count, MarkEffect::AttachAndDetach(a, d));
            mark.cell_id = pending_attach_cell;
            mark
        }
        (Some(a), None) => {
            let mut mark = Mark::new(count, MarkEffect::Attach(a));
            mark.cell_id = pending_attach_cell;
            mark
        }
        (None, Some(d)) => Mark::new(count, MarkEffect::Detach(d)),
        (None, None) => {
            let mut mark = Mark::new(count, MarkEffect::Tombstone);
            mark.cell_id = cell_id;
            mark
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn combine_empty<R, C>(
    witness: Option<CellId<R>>,
    detach: Option<DetachEffect<R>>,
    child_b: Option<C>,
    pending_attach: Option<AttachEffect<R>>,
    pending_attach_cell: Option<CellId<R>>,
    n: &Mark<R, C>,
    next_rev: &R,
    rollback_of: Option<&R>,
    cfm: &mut CrossFieldManager<R>,
    child_ops: &dyn ChildOps<R, C>,
) -> ChangesetResult<Mark<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let _ = next_rev;
    match &n.effect {
        MarkEffect::Tombstone => {
            let cell_id = n.cell_id.clone().or(witness);
            Ok(reproduce_empty(cell_id, child_b, pending_attach, detach, pending_attach_cell, n.count))
        }
        // `n` is a plain, unwitnessed no-op over a range `b` left empty
        // (ordinary position padding, not an explicit tombstone): `b`'s
        // own effect must still survive into the output so later
        // operators keep seeing the right occupancy and atom identity.
        MarkEffect::NoOp if n.cell_id.is_none() => {
            Ok(reproduce_empty(witness, child_b, pending_attach, detach, pending_attach_cell, n.count))
        }
        MarkEffect::NoOp if n.cell_id.is_some() => {
            let child = compose_child(child_ops, child_b, n.changes.clone())?;
            let mut mark = Mark::new(n.count, MarkEffect::NoOp);
            mark.cell_id = n.cell_id.clone();
            mark.changes = child;
            Ok(mark)
        }
        MarkEffect::Attach(a_n) => combine_cancel_or_fresh_attach(
            witness, pending_attach, a_n, n, None, next_rev, rollback_of, cfm,
        ),
        MarkEffect::AttachAndDetach(a_n, d_n) => combine_cancel_or_fresh_attach(
            witness, pending_attach, a_n, n, Some(d_n.clone()), next_rev, rollback_of, cfm,
        ),
        _ => {
            tracing::debug!(
                "compose: empty-continuation met an effect requiring populated input; \
                 keeping the later mark verbatim as a best-effort fallback"
            );
            Ok(n.clone())
        }
    }
}

fn is_cancelling_revive<R: Revision>(witness: &Option<CellId<R>>, a_n: &AttachEffect<R>, default_revision: &R) -> bool {
    let (Some(witness), AttachEffect::Revive { id }) = (witness, a_n) else {
        return false;
    };
    let witness_id = AtomId::new(witness.resolve_revision(default_revision), witness.local_id);
    &witness_id == id
}

/// Whether `rollback_of` names the exact revision that produced the
/// cancelling revive's atom -- i.e. `next` is explicitly tagged as the
/// rollback of the remove this revive is undoing, rather than an
/// independent revive that merely happens to target the same atom.
fn is_rollback_of_cancelled_remove<R: Revision>(rollback_of: Option<&R>, a_n: &AttachEffect<R>) -> bool {
    let AttachEffect::Revive { id } = a_n else {
        return false;
    };
    rollback_of == Some(&id.revision)
}

#[allow(clippy::too_many_arguments)]
fn combine_cancel_or_fresh_attach<R, C>(
    witness: Option<CellId<R>>,
    pending_attach: Option<AttachEffect<R>>,
    a_n: &AttachEffect<R>,
    n: &Mark<R, C>,
    trailing_detach: Option<DetachEffect<R>>,
    next_rev: &R,
    rollback_of: Option<&R>,
    cfm: &mut CrossFieldManager<R>,
) -> ChangesetResult<Mark<R, C>>
where
    R: Revision,
    C: Clone + PartialEq,
{
    if pending_attach.is_none() && is_cancelling_revive(&witness, a_n, next_rev) {
        // "Remove ∘ Revive targeting same cell id": cancels to a tombstone
        // witness by default, unless `next` is explicitly tagged as the
        // rollback of the revision that produced the witness -- a
        // rollback composing against its own cancelling revive leaves no
        // trace at all, since it's erasing that history rather than
        // recording that something used to be there.
        if is_rollback_of_cancelled_remove(rollback_of, a_n) {
            return Ok(Mark::new(n.count, MarkEffect::NoOp));
        }
        let mut mark = Mark::new(n.count, MarkEffect::Tombstone);
        mark.cell_id = n.cell_id.clone().or(witness);
        return Ok(mark);
    }

    match (pending_attach, trailing_detach) {
        (None, None) => {
            let mut mark = Mark::new(n.count, MarkEffect::Attach(a_n.clone()));
            mark.cell_id = n.cell_id.clone();
            mark.changes = n.changes.clone();
            Ok(mark)
        }
        (None, Some(d_n)) => {
            let mut mark = Mark::new(n.count, MarkEffect::AttachAndDetach(a_n.clone(), d_n));
            mark.cell_id = n.cell_id.clone();
            mark.changes = n.changes.clone();
            Ok(mark)
        }
        (Some(a), None) => {
            tracing::debug!(
                "compose: a transient's attach is being superseded by a fresh attach on the \
                 same cell; the transient's own rename is dropped from this mark (see \
                 DESIGN.md's 'vestigial endpoint' note)"
            );
            let _ = a;
            let mut mark = Mark::new(n.count, MarkEffect::Attach(a_n.clone()));
            mark.cell_id = n.cell_id.clone();
            mark.changes = n.changes.clone();
            Ok(mark)
        }
        (Some(a), Some(d_n)) => {
            if let (AttachEffect::MoveIn { id: in_id, .. }, DetachEffect::MoveOut { id: out_id, .. }) =
                (a_n, &d_n)
            {
                cfm.link(in_id.clone(), out_id.clone());
            }
            let _ = a;
            let mut mark = Mark::new(n.count, MarkEffect::AttachAndDetach(a_n.clone(), d_n));
            mark.cell_id = n.cell_id.clone();
            mark.changes = n.changes.clone();
            Ok(mark)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::LocalId;

    fn id(revision: u32, local: u32) -> AtomId<u32> {
        AtomId::new(revision, LocalId(local))
    }

    #[test]
    fn is_fresh_attach_is_true_for_insert_and_move_in_but_not_revive() {
        assert!(is_fresh_attach(&MarkEffect::<u32>::Attach(AttachEffect::Insert {
            id: id(1, 0),
            tiebreak: Default::default(),
        })));
        assert!(is_fresh_attach(&MarkEffect::<u32>::Attach(AttachEffect::MoveIn {
            id: id(1, 0),
            final_endpoint: None,
        })));
        assert!(!is_fresh_attach(&MarkEffect::<u32>::Attach(AttachEffect::Revive { id: id(1, 0) })));
    }

    #[test]
    fn is_fresh_attach_recognizes_a_transient_built_on_a_fresh_attach() {
        let transient = MarkEffect::AttachAndDetach(
            AttachEffect::Insert { id: id(1, 0), tiebreak: Default::default() },
            DetachEffect::Remove { id: id(2, 0) },
        );
        assert!(is_fresh_attach(&transient));
    }

    #[test]
    fn attach_half_extracts_from_attach_and_attach_and_detach_only() {
        let attach: MarkEffect<u32> = MarkEffect::Attach(AttachEffect::Revive { id: id(1, 0) });
        assert!(attach_half::<u32, ()>(&attach).is_some());

        let detach: MarkEffect<u32> = MarkEffect::Detach(DetachEffect::Remove { id: id(1, 0) });
        assert!(attach_half::<u32, ()>(&detach).is_none());
    }

    #[test]
    fn pending_attach_cell_id_is_set_only_for_a_revive() {
        let mut mark: Mark<u32, ()> = Mark::new(1, MarkEffect::Attach(AttachEffect::Revive { id: id(1, 0) }));
        mark.cell_id = Some(CellId::new(1, LocalId(0)));
        assert!(pending_attach_cell_id(&mark).is_some());

        let insert: Mark<u32, ()> =
            Mark::new(1, MarkEffect::Attach(AttachEffect::Insert { id: id(1, 0), tiebreak: Default::default() }));
        assert!(pending_attach_cell_id(&insert).is_none());
    }

    #[test]
    fn is_cancelling_revive_matches_only_the_exact_witnessed_atom() {
        let witness = Some(CellId::new(1u32, LocalId(0)));
        let matching = AttachEffect::Revive { id: id(1, 0) };
        assert!(is_cancelling_revive(&witness, &matching, &1));

        let different = AttachEffect::Revive { id: id(1, 1) };
        assert!(!is_cancelling_revive(&witness, &different, &1));

        let insert = AttachEffect::Insert { id: id(1, 0), tiebreak: Default::default() };
        assert!(!is_cancelling_revive(&witness, &insert, &1));
    }

    #[test]
    fn reproduce_empty_prefers_a_child_change_over_the_original_effect() {
        let mark: Mark<u32, &str> = reproduce_empty(
            Some(CellId::new(1, LocalId(0))),
            Some("child"),
            Some(AttachEffect::Insert { id: id(1, 0), tiebreak: Default::default() }),
            None,
            None,
            1,
        );
        assert_eq!(mark.effect, MarkEffect::NoOp);
        assert_eq!(mark.changes, Some("child"));
    }

    #[test]
    fn reproduce_empty_with_no_pending_attach_or_detach_is_a_tombstone() {
        let mark: Mark<u32, ()> = reproduce_empty(Some(CellId::new(1, LocalId(0))), None, None, None, None, 1);
        assert_eq!(mark.effect, MarkEffect::Tombstone);
    }

    #[test]
    fn is_rollback_of_cancelled_remove_matches_only_the_revives_own_revision() {
        let matching = AttachEffect::Revive { id: id(1, 0) };
        assert!(is_rollback_of_cancelled_remove(Some(&1), &matching));
        assert!(!is_rollback_of_cancelled_remove(Some(&2), &matching));
        assert!(!is_rollback_of_cancelled_remove(None, &matching));

        let insert = AttachEffect::Insert { id: id(1, 0), tiebreak: Default::default() };
        assert!(!is_rollback_of_cancelled_remove(Some(&1), &insert));
    }

    #[test]
    fn reproduce_empty_with_both_halves_is_a_transient() {
        let mark: Mark<u32, ()> = reproduce_empty(
            None,
            None,
            Some(AttachEffect::Insert { id: id(1, 0), tiebreak: Default::default() }),
            Some(DetachEffect::Remove { id: id(2, 0) }),
            None,
            1,
        );
        assert!(matches!(mark.effect, MarkEffect::AttachAndDetach(..)));
    }
}
