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

//! The editor surface: the minimal, direct way to build a single-edit
//! changeset (spec.md §6). A thin collaborator, not an editing UI -- each
//! function here returns a standalone [`Changeset`] for one edit, expressed
//! in the field's pre-edit cell positions.

use crate::cell::CellId;
use crate::changeset::Changeset;
use crate::changeset::MarkListBuilder;
use crate::ids::AtomId;
use crate::ids::Revision;
use crate::mark::AttachEffect;
use crate::mark::DetachEffect;
use crate::mark::Mark;
use crate::mark::MarkEffect;
use crate::mark::Tiebreak;

fn push_noop<R: Revision, C: Clone + PartialEq>(builder: &mut MarkListBuilder<R, C>, count: u32) {
    if count > 0 {
        builder.push(Mark::new(count, MarkEffect::NoOp));
    }
}

/// Inserts `count` new cells at `index`, named by `id`. `tiebreak` decides
/// which side of a concurrent insert at the same gap this one lands on
/// (spec.md §9, resolved per-attach rather than only globally).
pub fn insert<R, C>(revision: R, index: u32, count: u32, id: AtomId<R>, tiebreak: Tiebreak) -> Changeset<R, C>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let mut builder = MarkListBuilder::new(revision);
    push_noop(&mut builder, index);
    builder.push(Mark::new(count, MarkEffect::Attach(AttachEffect::Insert { id, tiebreak })));
    builder.build()
}

/// Removes `count` cells starting at `index`, the removal itself named by
/// `id`.
pub fn remove<R, C>(revision: R, index: u32, count: u32, id: AtomId<R>) -> Changeset<R, C>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let mut builder = MarkListBuilder::new(revision);
    push_noop(&mut builder, index);
    builder.push(Mark::new(count, MarkEffect::Detach(DetachEffect::Remove { id })));
    builder.build()
}

/// Moves `count` cells from `source` to `dest`, both expressed as positions
/// in the pre-edit field. Both halves carry the same atom `id`; a
/// [`crate::cross_field::CrossFieldManager`] is only needed once the two
/// halves are separated across changesets by a later compose/rebase.
pub fn move_range<R, C>(revision: R, source: u32, count: u32, dest: u32, id: AtomId<R>) -> Changeset<R, C>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let move_out = Mark::new(
        count,
        MarkEffect::Detach(DetachEffect::MoveOut {
            id: id.clone(),
            final_endpoint: None,
        }),
    );
    let move_in = Mark::new(
        count,
        MarkEffect::Attach(AttachEffect::MoveIn { id, final_endpoint: None }),
    );

    let mut builder = MarkListBuilder::new(revision);
    if source <= dest {
        push_noop(&mut builder, source);
        builder.push(move_out);
        push_noop(&mut builder, dest.saturating_sub(source + count));
        builder.push(move_in);
    } else {
        push_noop(&mut builder, dest);
        builder.push(move_in);
        push_noop(&mut builder, source.saturating_sub(dest));
        builder.push(move_out);
    }
    builder.build()
}

/// Revives `count` previously-emptied cells starting at `cell_id`, at
/// field position `index`.
pub fn revive<R, C>(revision: R, index: u32, count: u32, cell_id: CellId<R>) -> Changeset<R, C>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let id = cell_id.atom_id(&revision);
    let mut builder = MarkListBuilder::new(revision);
    push_noop(&mut builder, index);
    let mut mark = Mark::new(count, MarkEffect::Attach(AttachEffect::Revive { id }));
    mark.cell_id = Some(cell_id);
    builder.push(mark);
    builder.build()
}

/// Applies a child (nested) change to the single cell at `index`.
pub fn modify<R, C>(revision: R, index: u32, child_change: C) -> Changeset<R, C>
where
    R: Revision,
    C: Clone + PartialEq,
{
    let mut builder = MarkListBuilder::new(revision);
    push_noop(&mut builder, index);
    let mut mark = Mark::new(1, MarkEffect::NoOp);
    mark.changes = Some(child_change);
    builder.push(mark);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::LocalId;

    fn id(revision: u32, local: u32) -> AtomId<u32> {
        AtomId::new(revision, LocalId(local))
    }

    #[test]
    fn insert_at_zero_has_no_leading_noop() {
        let change: Changeset<u32, ()> = insert(1, 0, 2, id(1, 0), Tiebreak::Left);
        assert_eq!(change.marks().len(), 1);
        assert_eq!(change.marks()[0].count, 2);
    }

    #[test]
    fn insert_past_the_start_has_a_leading_noop() {
        let change: Changeset<u32, ()> = insert(1, 3, 2, id(1, 0), Tiebreak::Left);
        assert_eq!(change.marks().len(), 2);
        assert_eq!(change.marks()[0].count, 3);
        assert!(matches!(change.marks()[0].effect, MarkEffect::NoOp));
    }

    #[test]
    fn move_range_forward_emits_out_then_in() {
        let change: Changeset<u32, ()> = move_range(1, 0, 1, 3, id(1, 0));
        let marks = change.marks();
        assert!(matches!(marks[0].effect, MarkEffect::Detach(DetachEffect::MoveOut { .. })));
        assert!(matches!(marks.last().unwrap().effect, MarkEffect::Attach(AttachEffect::MoveIn { .. })));
    }

    #[test]
    fn move_range_backward_emits_in_then_out() {
        let change: Changeset<u32, ()> = move_range(1, 3, 1, 0, id(1, 0));
        let marks = change.marks();
        assert!(matches!(marks[0].effect, MarkEffect::Attach(AttachEffect::MoveIn { .. })));
        assert!(matches!(marks.last().unwrap().effect, MarkEffect::Detach(DetachEffect::MoveOut { .. })));
    }

    #[test]
    fn revive_carries_the_original_cell_id() {
        let cell_id = CellId::new(1u32, LocalId(0));
        let change: Changeset<u32, ()> = revive(2, 0, 1, cell_id.clone());
        assert_eq!(change.marks()[0].cell_id, Some(cell_id));
    }

    #[test]
    fn modify_carries_the_child_change_on_a_single_cell_mark() {
        let change: Changeset<u32, &str> = modify(1, 2, "edited");
        let mark = change.marks().last().unwrap();
        assert_eq!(mark.count, 1);
        assert_eq!(mark.changes, Some("edited"));
    }
}
