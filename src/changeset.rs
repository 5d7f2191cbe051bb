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

//! The run-length-encoded mark list, its builder/factory, and the
//! `TaggedChange` envelope.

use std::fmt;
use std::fmt::Debug;

use crate::ids::Revision;
use crate::mark::try_merge_marks;
use crate::mark::Mark;
use crate::mark::MarkEffect;

/// An ordered list of marks forming the RLE sequence (spec.md §3).
#[derive(Clone, PartialEq, Eq)]
pub struct Changeset<R, C> {
    marks: Vec<Mark<R, C>>,
}

impl<R: Revision, C: Clone + PartialEq> Changeset<R, C> {
    /// The empty changeset, the identity element for `compose`.
    pub fn empty() -> Self {
        Self { marks: Vec::new() }
    }

    /// Builds a changeset from already-normalized marks, without
    /// re-running the merge pass. Used internally by operators that
    /// already know their output is merge-maximal; prefer
    /// [`MarkListBuilder`] elsewhere.
    pub fn from_marks_unchecked(marks: Vec<Mark<R, C>>) -> Self {
        Self { marks }
    }

    pub fn marks(&self) -> &[Mark<R, C>] {
        &self.marks
    }

    pub fn into_marks(self) -> Vec<Mark<R, C>> {
        self.marks
    }

    pub fn is_empty(&self) -> bool {
        self.marks.iter().all(|m| matches!(m.effect, MarkEffect::NoOp) && m.changes.is_none())
    }

    /// Total number of cells spanned by the changeset.
    pub fn cell_count(&self) -> u64 {
        self.marks.iter().map(|m| u64::from(m.count)).sum()
    }

    /// Drops tombstones that are redundant: a tombstone is redundant once
    /// no later lineage in the changeset could need it, which in this
    /// single-pass, self-contained representation means simply "merge
    /// adjacent tombstones as far as possible" -- full cross-changeset
    /// redundancy elimination happens in `shallow_compose`
    /// (spec.md §4.4).
    pub fn normalize(&self, default_revision: &R) -> Self {
        let mut builder = MarkListBuilder::new(default_revision.clone());
        for mark in &self.marks {
            builder.push(mark.clone());
        }
        builder.build()
    }

    /// Equality after normalization: merges adjacent marks and is the
    /// notion of `≡` used by the property suite in spec.md §8.
    pub fn normalized_eq(&self, other: &Self, default_revision: &R) -> bool {
        self.normalize(default_revision) == other.normalize(default_revision)
    }

    /// Debug-only structural invariant check (spec.md §3): no zero-count
    /// marks, child changes imply count == 1, and the cellId/populated
    /// consistency from invariant 4. Invariant 2 (maximal merging) and
    /// invariant 5 (paired move endpoints) are checked where the relevant
    /// context -- the default revision, or the full world line -- is
    /// available to the caller.
    pub fn assert_invariants(&self, default_revision: &R) {
        for mark in &self.marks {
            debug_assert!(mark.count > 0, "zero-count mark");
            if mark.changes.is_some() {
                debug_assert_eq!(mark.count, 1, "mark with child change must have count == 1");
            }
            debug_assert!(
                mark.check_cell_id_invariant(),
                "cellId/populated-cell invariant violated for {mark:?}"
            );
        }
        for pair in self.marks.windows(2) {
            let merged = try_merge_marks(&pair[0], &pair[1], default_revision);
            debug_assert!(
                merged.is_none(),
                "adjacent marks should have been merged: {:?}, {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

impl<R: Debug, C: Debug> fmt::Debug for Changeset<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.marks.iter()).finish()
    }
}

/// Compact run-length form, e.g. `I2 R1 M{0}1 T1` for an insert of 2 cells,
/// a revive of 1, a move-in from local id 0 covering 1 cell, then a
/// 1-cell tombstone. Used by test failure messages and `tracing` output,
/// not by any wire format.
impl<R, C> fmt::Display for Changeset<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mark) in self.marks.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}{}", mark.effect.code(), mark.count)?;
        }
        Ok(())
    }
}

/// Appends marks to an output list, merging on append per the rule in
/// spec.md §4.1. This is the only way application code should assemble a
/// `Changeset` from individually-produced marks.
pub struct MarkListBuilder<R, C> {
    marks: Vec<Mark<R, C>>,
    default_revision: R,
}

impl<R: Revision, C: Clone + PartialEq> MarkListBuilder<R, C> {
    pub fn new(default_revision: R) -> Self {
        Self {
            marks: Vec::new(),
            default_revision,
        }
    }

    /// Appends `mark`, merging it into the last mark in the list if
    /// possible. Zero-count marks are silently dropped (they carry no
    /// information and violate invariant 1 if kept).
    pub fn push(&mut self, mark: Mark<R, C>) {
        if mark.count == 0 {
            return;
        }
        if let Some(last) = self.marks.last() {
            if let Some(merged) = try_merge_marks(last, &mark, &self.default_revision) {
                *self.marks.last_mut().unwrap() = merged;
                return;
            }
        }
        self.marks.push(mark);
    }

    pub fn extend(&mut self, marks: impl IntoIterator<Item = Mark<R, C>>) {
        for mark in marks {
            self.push(mark);
        }
    }

    pub fn build(self) -> Changeset<R, C> {
        Changeset::from_marks_unchecked(self.marks)
    }
}

/// `{ change, revision?, rollbackOf? }`: a changeset paired with the
/// revision it is tagged with and, if it is itself an inverse, the
/// revision it is a rollback of.
#[derive(Clone, PartialEq, Eq)]
pub struct TaggedChange<R, C> {
    pub change: Changeset<R, C>,
    pub revision: Option<R>,
    pub rollback_of: Option<R>,
}

impl<R: Revision, C: Clone + PartialEq> TaggedChange<R, C> {
    pub fn new(change: Changeset<R, C>, revision: R) -> Self {
        Self {
            change,
            revision: Some(revision),
            rollback_of: None,
        }
    }

    pub fn rollback(change: Changeset<R, C>, revision: R, rollback_of: R) -> Self {
        Self {
            change,
            revision: Some(revision),
            rollback_of: Some(rollback_of),
        }
    }

    pub fn is_rollback(&self) -> bool {
        self.rollback_of.is_some()
    }

    /// The revision new atom ids on this change should be interpreted
    /// under, panicking if the change was never tagged. Untagged changes
    /// (freshly built by the editor, not yet composed into history) are a
    /// caller error to pass to an operator.
    pub fn revision(&self) -> &R {
        self.revision
            .as_ref()
            .expect("operator called on an untagged change")
    }
}

impl<R: Debug, C: Debug> fmt::Debug for TaggedChange<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaggedChange{{revision={:?}", self.revision)?;
        if let Some(r) = &self.rollback_of {
            write!(f, ", rollback_of={r:?}")?;
        }
        write!(f, ", change={:?}}}", self.change)
    }
}
