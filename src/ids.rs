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

//! Revisions, local IDs, and change-atom IDs.
//!
//! The algebra never mints revisions itself (see crate docs): callers supply
//! an opaque, totally-orderable revision type and a [`crate::metadata::RevisionMetadata`]
//! source that can compare two revisions and report whether one is a
//! rollback of another.

use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;

/// Bound required of a caller-supplied revision identifier.
///
/// The algebra only ever compares, hashes, and clones revisions; it never
/// constructs one. Total order is provided out of band by
/// [`crate::metadata::RevisionMetadata::compare`], not by `Ord`, since two
/// revisions may only be comparable in the context of a particular change
/// history.
pub trait Revision: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Revision for T {}

/// A per-revision dense identifier, scoped to a single revision.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalId(pub u32);

impl LocalId {
    /// Returns the id offset by `delta`, as used when splitting or merging a
    /// run of marks that share a revision.
    pub fn offset(self, delta: u32) -> Self {
        Self(self.0 + delta)
    }

    /// Whether `self` immediately precedes `other`, i.e. `other == self + 1`.
    pub fn is_immediately_followed_by(self, other: Self) -> bool {
        self.0 + 1 == other.0
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(revision, localId)`: the globally unique name of an attach or detach
/// event.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AtomId<R> {
    pub revision: R,
    pub local_id: LocalId,
}

impl<R: Revision> AtomId<R> {
    pub fn new(revision: R, local_id: LocalId) -> Self {
        Self { revision, local_id }
    }

    /// Returns the atom id offset by `delta` local-id slots, keeping the
    /// revision fixed. Used when splitting a mark whose `count` spans
    /// several atoms of the same revision.
    pub fn offset(&self, delta: u32) -> Self {
        Self {
            revision: self.revision.clone(),
            local_id: self.local_id.offset(delta),
        }
    }

    /// Whether `self` and `other` name adjacent atoms of the same revision,
    /// i.e. `other` could be produced by `self.offset(count)` for some
    /// `count`.
    pub fn is_adjacent_to(&self, other: &Self, count: u32) -> bool {
        self.revision == other.revision && self.local_id.offset(count) == other.local_id
    }
}

impl<R: Debug> fmt::Debug for AtomId<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.local_id, self.revision)
    }
}
