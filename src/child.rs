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

//! The child-change hook: the only interface the core requires of the
//! nested-change algebra (spec.md §4.9). The core treats child changes as
//! opaque values except through this trait and `PartialEq`.

use crate::error::ChangesetResult;
use crate::ids::Revision;

/// Operations the core needs on the per-node nested-change type `C`.
///
/// All methods are total and pure: they must not fail for any pair of
/// values the core itself produces by composing, inverting, or rebasing
/// values that originated from a caller-constructed, well-formed change.
/// They may still return `Err` to propagate a genuine child-side failure
/// (for example a child algebra that validates content against a schema).
pub trait ChildOps<R: Revision, C> {
    /// Sequentially composes `a` then `b`. Must be associative so that the
    /// core's own compose associativity law holds transitively.
    fn compose(&self, a: &C, b: &C) -> ChangesetResult<C>;

    /// Inverts `a`. `is_rollback` is forwarded from the enclosing
    /// [`crate::invert::invert`] call so the child algebra can tag its own
    /// output consistently with the parent's rollback tagging.
    fn invert(&self, a: &C, is_rollback: bool, new_revision: &R) -> ChangesetResult<C>;

    /// Rebases `a` over `over`.
    fn rebase(&self, a: &C, over: &C) -> ChangesetResult<C>;

    /// Fills in `revision` on a child change that was built without one.
    fn tag(&self, change: C, revision: &R) -> C;
}

/// A [`ChildOps`] implementation for fields that carry no child changes at
/// all (`C = ()`), used by tests and by callers whose nodes have no nested
/// editable state.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoChildChanges;

impl<R: Revision> ChildOps<R, ()> for NoChildChanges {
    fn compose(&self, _a: &(), _b: &()) -> ChangesetResult<()> {
        Ok(())
    }

    fn invert(&self, _a: &(), _is_rollback: bool, _new_revision: &R) -> ChangesetResult<()> {
        Ok(())
    }

    fn rebase(&self, _a: &(), _over: &()) -> ChangesetResult<()> {
        Ok(())
    }

    fn tag(&self, (): (), _revision: &R) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_child_changes_is_a_total_identity_on_unit() {
        let ops = NoChildChanges;
        assert_eq!(ops.compose(&(), &()).unwrap(), ());
        assert_eq!(ops.invert(&(), true, &1u32).unwrap(), ());
        assert_eq!(ops.rebase(&(), &()).unwrap(), ());
        assert_eq!(ops.tag((), &1u32), ());
    }
}
