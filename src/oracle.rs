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

//! The cell-order oracle: decides the relative order of two empty-cell
//! references (spec.md §4.3). Two implementations coexist; the caller
//! picks one via [`crate::config::CellOrderingMode`].
//!
//! Per the open question recorded in spec.md §9, the `Lineage` oracle's
//! source algorithm is not total in every case the spec demands; this
//! crate follows the spec's own guidance and treats `Tombstone` mode as
//! the primary, reliably-total implementation, keeping `Lineage` as a
//! cheaper approximation that falls back to revision order whenever its
//! local information is insufficient (see `DESIGN.md`).

use std::cmp::Ordering;

use crate::cell::CellId;
use crate::ids::AtomId;
use crate::ids::Revision;
use crate::mark::Mark;
use crate::metadata::RevisionMetadata;

/// Where `a` sits relative to `b`.
pub type CellOrder = Ordering;

/// Decides the relative field order of two references to empty cells.
///
/// Implementations must be consistent with per-revision insertion order:
/// among cells named by the same revision, the one with the smaller local
/// id comes first.
pub trait CellOrderOracle<R: Revision> {
    fn order(
        &self,
        a: &CellId<R>,
        b: &CellId<R>,
        metadata: &dyn RevisionMetadata<R>,
        default_revision: &R,
    ) -> CellOrder;
}

fn order_by_revision<R: Revision>(
    rev_a: &R,
    local_a: u32,
    rev_b: &R,
    local_b: u32,
    metadata: &dyn RevisionMetadata<R>,
) -> CellOrder {
    if rev_a == rev_b {
        return local_a.cmp(&local_b);
    }
    metadata.compare(rev_a, rev_b)
}

/// Orders empty cells by comparing lineage records, falling back to
/// revision order when the two references share no anchor.
#[derive(Default, Clone, Copy, Debug)]
pub struct LineageOracle;

impl<R: Revision> CellOrderOracle<R> for LineageOracle {
    fn order(
        &self,
        a: &CellId<R>,
        b: &CellId<R>,
        metadata: &dyn RevisionMetadata<R>,
        default_revision: &R,
    ) -> CellOrder {
        let rev_a = a.resolve_revision(default_revision);
        let rev_b = b.resolve_revision(default_revision);
        if rev_a == rev_b {
            return a.local_id.cmp(&b.local_id);
        }

        // Shared anchor: both lineages carry a record naming the same run.
        for la in &a.lineage {
            for lb in &b.lineage {
                if la.revision == lb.revision && la.id == lb.id && la.count == lb.count {
                    return la.offset.cmp(&lb.offset);
                }
            }
        }

        // `a` is the detach that named `b`'s anchor (or vice versa): use
        // the lineage entry's offset directly against the other side's
        // atom position within that same run.
        if let Some(order) = position_within_other_lineage(a, &rev_a, b) {
            return order;
        }
        if let Some(order) = position_within_other_lineage(b, &rev_b, a).map(Ordering::reverse) {
            return order;
        }

        tracing::debug!(
            ?rev_a,
            ?rev_b,
            "lineage oracle has no shared anchor; falling back to revision order"
        );
        order_by_revision(&rev_a, a.local_id.0, &rev_b, b.local_id.0, metadata)
    }
}

/// If `named.lineage` contains a record whose run covers `candidate`'s atom
/// id, returns the ordering of `candidate` against that record's offset.
fn position_within_other_lineage<R: Revision>(
    candidate: &CellId<R>,
    candidate_revision: &R,
    named: &CellId<R>,
) -> Option<Ordering> {
    for entry in &named.lineage {
        if &entry.revision == candidate_revision
            && candidate.local_id.0 >= entry.id.0
            && candidate.local_id.0 < entry.id.0 + entry.count
        {
            let candidate_offset = candidate.local_id.0 - entry.id.0;
            return Some(candidate_offset.cmp(&entry.offset));
        }
    }
    None
}

/// Orders empty cells by their position among the explicit tombstone marks
/// of a surrounding changeset.
///
/// Built once per operator call from one side's mark list (spec.md §4.3:
/// "the cell whose tombstone appears earlier in the sequence comes
/// first"). Cells not found in the index (e.g. never witnessed by a
/// tombstone in this particular changeset) fall back to revision order,
/// which is always total since every revision the metadata source knows
/// about has a distinct `index`.
#[derive(Default, Clone)]
pub struct TombstoneOracle<R> {
    positions: Vec<(AtomId<R>, usize)>,
}

impl<R: Revision> TombstoneOracle<R> {
    pub fn from_marks<C>(marks: &[Mark<R, C>], default_revision: &R) -> Self {
        let mut positions = Vec::new();
        let mut position = 0usize;
        for mark in marks {
            if let Some(cell_id) = &mark.cell_id {
                let revision = cell_id.resolve_revision(default_revision);
                for offset in 0..mark.count {
                    positions.push((
                        AtomId::new(revision.clone(), cell_id.local_id.offset(offset)),
                        position,
                    ));
                    position += 1;
                }
            } else {
                position += mark.count as usize;
            }
        }
        Self { positions }
    }

    fn position_of(&self, id: &AtomId<R>) -> Option<usize> {
        self.positions
            .iter()
            .find(|(atom, _)| atom == id)
            .map(|(_, pos)| *pos)
    }
}

impl<R: Revision> CellOrderOracle<R> for TombstoneOracle<R> {
    fn order(
        &self,
        a: &CellId<R>,
        b: &CellId<R>,
        metadata: &dyn RevisionMetadata<R>,
        default_revision: &R,
    ) -> CellOrder {
        let rev_a = a.resolve_revision(default_revision);
        let rev_b = b.resolve_revision(default_revision);
        let atom_a = AtomId::new(rev_a.clone(), a.local_id);
        let atom_b = AtomId::new(rev_b.clone(), b.local_id);
        match (self.position_of(&atom_a), self.position_of(&atom_b)) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            _ => {
                tracing::trace!(
                    ?rev_a,
                    ?rev_b,
                    "tombstone oracle missing a witness; falling back to revision order"
                );
                order_by_revision(&rev_a, a.local_id.0, &rev_b, b.local_id.0, metadata)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::LocalId;
    use crate::mark::Mark;
    use crate::mark::MarkEffect;
    use crate::metadata::RevisionInfo;

    /// Orders revisions by their `u32` value; every revision is "known".
    struct OrdinalMetadata;
    impl RevisionMetadata<u32> for OrdinalMetadata {
        fn info(&self, revision: &u32) -> Option<RevisionInfo<u32>> {
            Some(RevisionInfo {
                rollback_of: None,
                index: *revision as usize,
            })
        }
        fn compare(&self, a: &u32, b: &u32) -> Ordering {
            a.cmp(b)
        }
    }

    fn tombstone_mark(revision: u32, local: u32, count: u32) -> Mark<u32, ()> {
        Mark::tombstone(count, CellId::new(revision, LocalId(local)))
    }

    #[test]
    fn tombstone_oracle_orders_by_position_in_the_source_marks() {
        let marks = vec![tombstone_mark(1, 0, 1), Mark::no_op(1), tombstone_mark(1, 1, 1)];
        let oracle = TombstoneOracle::from_marks(&marks, &1u32);

        let earlier = CellId::new(1u32, LocalId(0));
        let later = CellId::new(1u32, LocalId(1));
        assert_eq!(oracle.order(&earlier, &later, &OrdinalMetadata, &1), Ordering::Less);
        assert_eq!(oracle.order(&later, &earlier, &OrdinalMetadata, &1), Ordering::Greater);
    }

    #[test]
    fn tombstone_oracle_falls_back_to_revision_order_when_unwitnessed() {
        let oracle = TombstoneOracle::<u32>::default();
        let a = CellId::new(1u32, LocalId(0));
        let b = CellId::new(2u32, LocalId(0));
        assert_eq!(oracle.order(&a, &b, &OrdinalMetadata, &1), Ordering::Less);
    }

    #[test]
    fn lineage_oracle_orders_same_revision_cells_by_local_id() {
        let oracle = LineageOracle;
        let a = CellId::new(1u32, LocalId(0));
        let b = CellId::new(1u32, LocalId(1));
        assert_eq!(oracle.order(&a, &b, &OrdinalMetadata, &1), Ordering::Less);
    }

    #[test]
    fn lineage_oracle_uses_a_shared_anchor_when_revisions_differ() {
        let oracle = LineageOracle;
        let anchor = crate::cell::LineageEntry::new(9u32, LocalId(0), 5, 0);
        let a = CellId::new(1u32, LocalId(0)).with_lineage(crate::cell::LineageEntry {
            offset: 2,
            ..anchor.clone()
        });
        let b = CellId::new(2u32, LocalId(0)).with_lineage(crate::cell::LineageEntry {
            offset: 4,
            ..anchor
        });
        assert_eq!(oracle.order(&a, &b, &OrdinalMetadata, &1), Ordering::Less);
    }

    #[test]
    fn lineage_oracle_falls_back_to_revision_order_without_a_shared_anchor() {
        let oracle = LineageOracle;
        let a = CellId::new(1u32, LocalId(0));
        let b = CellId::new(2u32, LocalId(0));
        assert_eq!(oracle.order(&a, &b, &OrdinalMetadata, &1), Ordering::Less);
    }
}
