//! Shared test fixtures: a concrete revision type and metadata source,
//! reused across the scenario test files. Revisions are plain `u32`s --
//! the blanket [`seqfield_algebra::Revision`] impl covers any
//! `Clone + Eq + Hash + Debug`, so the test suite doesn't need a bespoke
//! revision newtype.

use std::cmp::Ordering;
use std::collections::HashMap;

use seqfield_algebra::ChangesetResult;
use seqfield_algebra::ChildOps;
use seqfield_algebra::RevisionInfo;
use seqfield_algebra::RevisionMetadata;

/// A metadata source over a fixed, caller-declared sequence of revisions,
/// in the order they were issued. Revisions not declared are unknown, as
/// real metadata sources treat anything outside their window.
#[derive(Default)]
pub struct LinearMetadata {
    order: Vec<u32>,
    rollbacks: HashMap<u32, u32>,
}

impl LinearMetadata {
    pub fn new(order: impl IntoIterator<Item = u32>) -> Self {
        Self {
            order: order.into_iter().collect(),
            rollbacks: HashMap::new(),
        }
    }

    /// Declares `revision` as the rollback (inverse) of `original`.
    pub fn with_rollback(mut self, revision: u32, original: u32) -> Self {
        self.rollbacks.insert(revision, original);
        self
    }
}

impl RevisionMetadata<u32> for LinearMetadata {
    fn info(&self, revision: &u32) -> Option<RevisionInfo<u32>> {
        let index = self.order.iter().position(|r| r == revision)?;
        Some(RevisionInfo {
            rollback_of: self.rollbacks.get(revision).copied(),
            index,
        })
    }

    fn compare(&self, a: &u32, b: &u32) -> Ordering {
        a.cmp(b)
    }
}

/// A child algebra over plain integer deltas, composing and inverting via
/// addition. Unlike [`seqfield_algebra::NoChildChanges`], this lets a test
/// observe that two concurrent child edits on the *same* cell actually got
/// combined, rather than merely checking that the field-level marks line up.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddOps;

impl ChildOps<u32, i32> for AddOps {
    fn compose(&self, a: &i32, b: &i32) -> ChangesetResult<i32> {
        Ok(a + b)
    }

    fn invert(&self, a: &i32, _is_rollback: bool, _new_revision: &u32) -> ChangesetResult<i32> {
        Ok(-a)
    }

    fn rebase(&self, a: &i32, _over: &i32) -> ChangesetResult<i32> {
        Ok(*a)
    }

    fn tag(&self, change: i32, _revision: &u32) -> i32 {
        change
    }
}
