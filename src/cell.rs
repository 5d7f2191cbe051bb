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

//! The cell model: stable identity for empty cells, lineage, and the
//! same-revision adjacency hint.

use std::fmt;
use std::fmt::Debug;

use crate::ids::AtomId;
use crate::ids::LocalId;
use crate::ids::Revision;

/// One `{revision, id, count, offset}` record: "among the `count` cells
/// named by `(revision, id+0 .. id+count-1)`, this cell sits at offset
/// `offset`".
///
/// A cell reference may carry several of these when it has been observed
/// across multiple revisions (e.g. a cell that was detached, then whose
/// neighbor's detach was itself rebased over a third revision).
#[derive(Clone, PartialEq, Eq)]
pub struct LineageEntry<R> {
    pub revision: R,
    pub id: LocalId,
    pub count: u32,
    pub offset: u32,
}

impl<R: Revision> LineageEntry<R> {
    pub fn new(revision: R, id: LocalId, count: u32, offset: u32) -> Self {
        debug_assert!(offset <= count, "lineage offset must be within [0, count]");
        Self {
            revision,
            id,
            count,
            offset,
        }
    }

    /// The atom id this entry's offset refers to, if `offset < count` (the
    /// entry may also describe the "one past the end" position, offset ==
    /// count, which names no atom but still orders the reference relative
    /// to the run).
    pub fn referenced_atom(&self) -> Option<AtomId<R>> {
        (self.offset < self.count)
            .then(|| AtomId::new(self.revision.clone(), self.id.offset(self.offset)))
    }
}

impl<R: Debug> fmt::Debug for LineageEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:?}, {:?}, count={}, offset={})",
            self.revision, self.id, self.count, self.offset
        )
    }
}

/// Contiguous run of cell IDs named by a single revision, attached to a
/// cell reference to allow O(1) merging of adjacent same-revision
/// references without walking lineage.
#[derive(Clone, PartialEq, Eq)]
pub struct AdjacentCells<R> {
    pub revision: R,
    pub id: LocalId,
    pub count: u32,
}

impl<R: Debug> fmt::Debug for AdjacentCells<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adj({:?}, {:?}, {})", self.revision, self.id, self.count)
    }
}

/// A reference to the first cell of an empty-cell run, as carried by a
/// mark's optional `cellId` field.
///
/// `revision` may be absent, in which case it defaults to the revision of
/// the mark or changeset carrying the reference (the override is resolved
/// by the operator doing the lookup, not stored back into the reference).
#[derive(Clone, PartialEq, Eq)]
pub struct CellId<R> {
    pub revision: Option<R>,
    pub local_id: LocalId,
    pub lineage: Vec<LineageEntry<R>>,
    pub adjacent_cells: Option<AdjacentCells<R>>,
}

impl<R: Revision> CellId<R> {
    pub fn new(revision: R, local_id: LocalId) -> Self {
        Self {
            revision: Some(revision),
            local_id,
            lineage: Vec::new(),
            adjacent_cells: None,
        }
    }

    /// Resolves this reference against the atom id that actually created
    /// it, which is known whenever the reference's own revision is absent.
    pub fn resolve_revision(&self, default: &R) -> R {
        self.revision.clone().unwrap_or_else(|| default.clone())
    }

    pub fn with_lineage(mut self, entry: LineageEntry<R>) -> Self {
        self.lineage.push(entry);
        self
    }

    /// Returns the atom id this reference names, given the revision to use
    /// when `self.revision` is absent.
    pub fn atom_id(&self, default_revision: &R) -> AtomId<R> {
        AtomId::new(self.resolve_revision(default_revision), self.local_id)
    }

    /// Offsets the reference by `delta` local-id slots, used when splitting
    /// a mark. Lineage and the adjacency hint are copied, not shared, and
    /// trimmed to only the records applicable to the new starting cell as
    /// far as the adjacency hint's count is concerned.
    pub fn offset(&self, delta: u32) -> Self {
        Self {
            revision: self.revision.clone(),
            local_id: self.local_id.offset(delta),
            lineage: self.lineage.clone(),
            adjacent_cells: self.adjacent_cells.as_ref().map(|a| AdjacentCells {
                revision: a.revision.clone(),
                id: a.id.offset(delta),
                count: a.count.saturating_sub(delta),
            }),
        }
    }

    /// Whether `self` followed by `count` more cells is immediately
    /// followed by `other`, and both carry identical lineage -- the merge
    /// condition for two cell references of the same revision.
    pub fn is_adjacent_to(&self, other: &Self, count: u32, default_revision: &R) -> bool {
        let self_rev = self.resolve_revision(default_revision);
        let other_rev = other.resolve_revision(default_revision);
        self_rev == other_rev
            && self.local_id.offset(count) == other.local_id
            && self.lineage == other.lineage
    }
}

impl<R: Debug> fmt::Debug for CellId<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell({:?}@{:?}", self.local_id, self.revision)?;
        if !self.lineage.is_empty() {
            write!(f, ", lineage={:?}", self.lineage)?;
        }
        write!(f, ")")
    }
}
