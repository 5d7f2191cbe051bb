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

//! The revision-metadata source: a small function-object interface, not a
//! global, following the design note in spec.md §9 ("Metadata source: a
//! function-object... No globals.").

use std::cmp::Ordering;

use crate::ids::Revision;

/// What the algebra needs to know about a single revision.
#[derive(Clone, Debug)]
pub struct RevisionInfo<R> {
    /// Set when this revision is the rollback (inverse) of another,
    /// earlier revision -- used by the cell-order oracle's tiebreak so a
    /// rollback's reinstated cell is placed consistently with the
    /// original.
    pub rollback_of: Option<R>,
    /// Position of this revision in the total order the metadata source
    /// imposes; lower sorts earlier.
    pub index: usize,
}

/// Lookup of `{ revision -> info }` plus a total-order comparator on
/// revisions, supplied by the caller for the lifetime of a single operator
/// call.
pub trait RevisionMetadata<R: Revision> {
    /// Returns metadata for `revision`, or `None` if the source has never
    /// heard of it.
    fn info(&self, revision: &R) -> Option<RevisionInfo<R>>;

    /// Total order over revisions. Must agree with `index` in [`info`] for
    /// any two revisions the source knows about.
    ///
    /// [`info`]: Self::info
    fn compare(&self, a: &R, b: &R) -> Ordering;

    /// Convenience built on [`info`](Self::info), used by operators to
    /// produce a clean [`crate::error::ChangesetError::MetadataMissing`]
    /// instead of unwrapping a missing lookup.
    fn contains(&self, revision: &R) -> bool {
        self.info(revision).is_some()
    }

    /// Whether `revision` is known to be a rollback of `maybe_original`.
    fn is_rollback_of(&self, revision: &R, maybe_original: &R) -> bool {
        self.info(revision)
            .and_then(|info| info.rollback_of)
            .is_some_and(|rollback_of| &rollback_of == maybe_original)
    }
}
