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

//! The mark model: the tagged union of effect variants plus the shared
//! envelope fields, and the merge/split rules from spec.md §4.1.

use std::fmt;
use std::fmt::Debug;

use crate::cell::CellId;
use crate::ids::AtomId;
use crate::ids::Revision;

/// Tiebreak policy for where a brand-new attach lands relative to other
/// concurrent attaches targeting the same position.
///
/// Default is `Left`: new content goes to the left of other concurrent
/// attaches at the same position. A rollback's reinstated cell inverts the
/// tiebreak of the change it rolls back, so it lands on the same side the
/// original attach did (spec.md §4.3, §9 open question on per-attach
/// tiebreak).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Tiebreak {
    #[default]
    Left,
    Right,
}

impl Tiebreak {
    pub fn invert(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// An attach-side effect: something that fills previously-empty cells.
#[derive(Clone, PartialEq, Eq)]
pub enum AttachEffect<R> {
    /// Brand-new content, named by `id`. Carries no `cellId` on the
    /// enclosing mark since the cells it targets never existed before.
    Insert { id: AtomId<R>, tiebreak: Tiebreak },
    /// Attach to empty cells whose cell IDs are already known -- the
    /// inverse of a remove.
    Revive { id: AtomId<R> },
    /// The destination half of a move. `final_endpoint`, once resolved by
    /// the [`crate::cross_field::CrossFieldManager`], names the far end of
    /// a multi-hop move chain.
    MoveIn {
        id: AtomId<R>,
        final_endpoint: Option<AtomId<R>>,
    },
}

impl<R: Revision> AttachEffect<R> {
    pub fn id(&self) -> &AtomId<R> {
        match self {
            Self::Insert { id, .. } | Self::Revive { id } | Self::MoveIn { id, .. } => id,
        }
    }

    pub fn offset_id(&self, delta: u32) -> Self {
        match self {
            Self::Insert { id, tiebreak } => Self::Insert {
                id: id.offset(delta),
                tiebreak: *tiebreak,
            },
            Self::Revive { id } => Self::Revive { id: id.offset(delta) },
            Self::MoveIn { id, final_endpoint } => Self::MoveIn {
                id: id.offset(delta),
                final_endpoint: final_endpoint.clone(),
            },
        }
    }
}

impl<R: Debug> fmt::Debug for AttachEffect<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert { id, tiebreak } => write!(f, "Insert({id:?}, {tiebreak:?})"),
            Self::Revive { id } => write!(f, "Revive({id:?})"),
            Self::MoveIn { id, final_endpoint } => {
                write!(f, "MoveIn({id:?}, final={final_endpoint:?})")
            }
        }
    }
}

/// A detach-side effect: something that empties previously-populated
/// cells.
#[derive(Clone, PartialEq, Eq)]
pub enum DetachEffect<R> {
    Remove { id: AtomId<R> },
    /// The source half of a move.
    MoveOut {
        id: AtomId<R>,
        final_endpoint: Option<AtomId<R>>,
    },
}

impl<R: Revision> DetachEffect<R> {
    pub fn id(&self) -> &AtomId<R> {
        match self {
            Self::Remove { id } | Self::MoveOut { id, .. } => id,
        }
    }

    pub fn offset_id(&self, delta: u32) -> Self {
        match self {
            Self::Remove { id } => Self::Remove { id: id.offset(delta) },
            Self::MoveOut { id, final_endpoint } => Self::MoveOut {
                id: id.offset(delta),
                final_endpoint: final_endpoint.clone(),
            },
        }
    }
}

impl<R: Debug> fmt::Debug for DetachEffect<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove { id } => write!(f, "Remove({id:?})"),
            Self::MoveOut { id, final_endpoint } => {
                write!(f, "MoveOut({id:?}, final={final_endpoint:?})")
            }
        }
    }
}

/// The effect a mark has on the cells it covers.
#[derive(Clone, PartialEq, Eq)]
pub enum MarkEffect<R> {
    /// Skip, or pure child modification.
    NoOp,
    /// A revive whose target cells turned out to already be populated: a
    /// no-op except for its child change and for carrying `id` so a later
    /// inversion can re-detach via the recorded cell id.
    Pin { id: AtomId<R> },
    /// A pure witness that the covered cells exist and are empty; no
    /// effect, carries ordering information only.
    Tombstone,
    Attach(AttachEffect<R>),
    Detach(DetachEffect<R>),
    /// A transient: an attach immediately followed by a detach on the same
    /// cells, collapsed into one mark by composition.
    AttachAndDetach(AttachEffect<R>, DetachEffect<R>),
}

impl<R: Revision> MarkEffect<R> {
    /// Whether this effect applies to cells that are empty *before* the
    /// mark applies (and therefore requires a `cellId` on the enclosing
    /// mark), per invariant 4 in spec.md §3.
    pub fn applies_to_empty_cells(&self) -> bool {
        match self {
            Self::Tombstone => true,
            Self::Attach(AttachEffect::Revive { .. }) => true,
            Self::AttachAndDetach(attach, _) => matches!(attach, AttachEffect::Revive { .. }),
            Self::NoOp | Self::Pin { .. } | Self::Attach(_) | Self::Detach(_) => false,
        }
    }

    /// Whether this effect is a pure no-op that carries no ids at all
    /// (distinct from `Pin`, which carries an id for inversion).
    pub fn is_pure_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone)
    }

    /// One-letter-plus-braces code used by `Changeset`'s `Display` impl and
    /// by `tracing` output, e.g. `I` (insert), `R` (revive), `M{3}` (move in
    /// from local id 3), `ID` (a transient insert-then-remove).
    pub fn code(&self) -> String {
        match self {
            Self::NoOp => "N".to_string(),
            Self::Pin { .. } => "P".to_string(),
            Self::Tombstone => "T".to_string(),
            Self::Attach(a) => attach_code(a),
            Self::Detach(d) => detach_code(d),
            Self::AttachAndDetach(a, d) => format!("{}{}", attach_code(a), detach_code(d)),
        }
    }
}

fn attach_code<R>(effect: &AttachEffect<R>) -> String {
    match effect {
        AttachEffect::Insert { .. } => "I".to_string(),
        AttachEffect::Revive { .. } => "R".to_string(),
        AttachEffect::MoveIn { id, .. } => format!("M{{{}}}", id.local_id),
    }
}

fn detach_code<R>(effect: &DetachEffect<R>) -> String {
    match effect {
        DetachEffect::Remove { .. } => "D".to_string(),
        DetachEffect::MoveOut { id, .. } => format!("O{{{}}}", id.local_id),
    }
}

impl<R: Debug> fmt::Debug for MarkEffect<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => write!(f, "NoOp"),
            Self::Pin { id } => write!(f, "Pin({id:?})"),
            Self::Tombstone => write!(f, "Tombstone"),
            Self::Attach(a) => write!(f, "{a:?}"),
            Self::Detach(d) => write!(f, "{d:?}"),
            Self::AttachAndDetach(a, d) => write!(f, "AttachAndDetach({a:?}, {d:?})"),
        }
    }
}

/// One run-length-encoded unit covering a contiguous range of cells.
#[derive(Clone, PartialEq, Eq)]
pub struct Mark<R, C> {
    pub count: u32,
    /// The cell id of the first covered cell *before* the mark applies.
    /// Present iff the mark's input cells are empty (invariant 4).
    pub cell_id: Option<CellId<R>>,
    /// A child change for the single covered node. Marks with a child
    /// change have `count == 1` (invariant 3).
    pub changes: Option<C>,
    pub effect: MarkEffect<R>,
    /// Revision override: when present, atom ids on this mark's effect are
    /// interpreted in this revision rather than the changeset's own tag.
    pub revision: Option<R>,
}

impl<R: Revision, C> Mark<R, C> {
    pub fn new(count: u32, effect: MarkEffect<R>) -> Self {
        assert!(count > 0, "mark count must be nonzero");
        Self {
            count,
            cell_id: None,
            changes: None,
            effect,
            revision: None,
        }
    }

    pub fn no_op(count: u32) -> Self {
        Self::new(count, MarkEffect::NoOp)
    }

    pub fn tombstone(count: u32, cell_id: CellId<R>) -> Self {
        let mut mark = Self::new(count, MarkEffect::Tombstone);
        mark.cell_id = Some(cell_id);
        mark
    }

    pub fn with_cell_id(mut self, cell_id: CellId<R>) -> Self {
        self.cell_id = Some(cell_id);
        self
    }

    pub fn with_changes(mut self, changes: C) -> Self {
        assert_eq!(self.count, 1, "marks with a child change must have count == 1");
        self.changes = Some(changes);
        self
    }

    pub fn with_revision(mut self, revision: R) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Checks invariant 4: a mark with `cellId` applies to empty cells;
    /// without, to populated cells. `NoOp` is the one effect that can
    /// legitimately go either way -- a plain modify of a populated node
    /// carries no `cellId`, but a modify folded onto an already-detached
    /// node (spec.md §4.4, composing a child edit onto a tombstoned cell)
    /// carries the cell's id and still has effect `NoOp`.
    pub fn check_cell_id_invariant(&self) -> bool {
        matches!(self.effect, MarkEffect::NoOp) || self.cell_id.is_some() == self.effect.applies_to_empty_cells()
    }
}

impl<R: Debug, C: Debug> fmt::Debug for Mark<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mark{{count={}, effect={:?}", self.count, self.effect)?;
        if let Some(cell_id) = &self.cell_id {
            write!(f, ", cell={cell_id:?}")?;
        }
        if let Some(changes) = &self.changes {
            write!(f, ", changes={changes:?}")?;
        }
        write!(f, "}}")
    }
}

/// Splits `mark` into two marks of counts `k` and `count - k`.
///
/// Atom ID ranges and any cell id are offset accordingly; lineage and
/// adjacency hints are copied (not shared). `0 < k < mark.count` is
/// required; child changes (which imply `count == 1`) cannot be split.
pub fn split_mark<R: Revision, C: Clone>(mark: &Mark<R, C>, k: u32) -> (Mark<R, C>, Mark<R, C>) {
    assert!(
        k > 0 && k < mark.count,
        "split point must be strictly inside the mark's count"
    );
    assert!(
        mark.changes.is_none(),
        "a mark carrying a child change has count == 1 and cannot be split"
    );

    let left_effect = mark.effect.clone();
    let right_effect = offset_effect(&mark.effect, k);

    let left = Mark {
        count: k,
        cell_id: mark.cell_id.clone(),
        changes: None,
        effect: left_effect,
        revision: mark.revision.clone(),
    };
    let right = Mark {
        count: mark.count - k,
        cell_id: mark.cell_id.as_ref().map(|c| c.offset(k)),
        changes: None,
        effect: right_effect,
        revision: mark.revision.clone(),
    };
    (left, right)
}

fn offset_effect<R: Revision>(effect: &MarkEffect<R>, delta: u32) -> MarkEffect<R> {
    match effect {
        MarkEffect::NoOp => MarkEffect::NoOp,
        MarkEffect::Pin { id } => MarkEffect::Pin { id: id.offset(delta) },
        MarkEffect::Tombstone => MarkEffect::Tombstone,
        MarkEffect::Attach(a) => MarkEffect::Attach(a.offset_id(delta)),
        MarkEffect::Detach(d) => MarkEffect::Detach(d.offset_id(delta)),
        MarkEffect::AttachAndDetach(a, d) => {
            MarkEffect::AttachAndDetach(a.offset_id(delta), d.offset_id(delta))
        }
    }
}

/// Attempts to merge two adjacent marks into one, per the merge rule in
/// spec.md §4.1: same effect variant, identical revision, no child change
/// on either side, and atom ids/cell ids adjacent in the same sense.
///
/// Returns `None` if the marks cannot be merged; the caller is expected to
/// keep them as separate list entries in that case.
pub fn try_merge_marks<R: Revision, C: Clone + PartialEq>(
    first: &Mark<R, C>,
    second: &Mark<R, C>,
    default_revision: &R,
) -> Option<Mark<R, C>> {
    if first.changes.is_some() || second.changes.is_some() {
        return None;
    }
    if first.revision != second.revision {
        return None;
    }
    if !effects_mergeable(&first.effect, &second.effect, first.count) {
        return None;
    }
    let cell_id = match (&first.cell_id, &second.cell_id) {
        (None, None) => None,
        (Some(a), Some(b)) if a.is_adjacent_to(b, first.count, default_revision) => {
            Some(a.clone())
        }
        _ => return None,
    };
    Some(Mark {
        count: first.count + second.count,
        cell_id,
        changes: None,
        effect: first.effect.clone(),
        revision: first.revision.clone(),
    })
}

fn effects_mergeable<R: Revision>(a: &MarkEffect<R>, b: &MarkEffect<R>, count: u32) -> bool {
    match (a, b) {
        (MarkEffect::NoOp, MarkEffect::NoOp) => true,
        (MarkEffect::Tombstone, MarkEffect::Tombstone) => true,
        (MarkEffect::Pin { id: id_a }, MarkEffect::Pin { id: id_b }) => {
            id_a.is_adjacent_to(id_b, count)
        }
        (MarkEffect::Attach(a), MarkEffect::Attach(b)) => attach_mergeable(a, b, count),
        (MarkEffect::Detach(a), MarkEffect::Detach(b)) => detach_mergeable(a, b, count),
        (MarkEffect::AttachAndDetach(a1, d1), MarkEffect::AttachAndDetach(a2, d2)) => {
            attach_mergeable(a1, a2, count) && detach_mergeable(d1, d2, count)
        }
        _ => false,
    }
}

fn attach_mergeable<R: Revision>(a: &AttachEffect<R>, b: &AttachEffect<R>, count: u32) -> bool {
    match (a, b) {
        (
            AttachEffect::Insert { id: id_a, tiebreak: t_a },
            AttachEffect::Insert { id: id_b, tiebreak: t_b },
        ) => t_a == t_b && id_a.is_adjacent_to(id_b, count),
        (AttachEffect::Revive { id: id_a }, AttachEffect::Revive { id: id_b }) => {
            id_a.is_adjacent_to(id_b, count)
        }
        (
            AttachEffect::MoveIn {
                id: id_a,
                final_endpoint: fe_a,
            },
            AttachEffect::MoveIn {
                id: id_b,
                final_endpoint: fe_b,
            },
        ) => fe_a == fe_b && id_a.is_adjacent_to(id_b, count),
        _ => false,
    }
}

fn detach_mergeable<R: Revision>(a: &DetachEffect<R>, b: &DetachEffect<R>, count: u32) -> bool {
    match (a, b) {
        (DetachEffect::Remove { id: id_a }, DetachEffect::Remove { id: id_b }) => {
            id_a.is_adjacent_to(id_b, count)
        }
        (
            DetachEffect::MoveOut {
                id: id_a,
                final_endpoint: fe_a,
            },
            DetachEffect::MoveOut {
                id: id_b,
                final_endpoint: fe_b,
            },
        ) => fe_a == fe_b && id_a.is_adjacent_to(id_b, count),
        _ => false,
    }
}
