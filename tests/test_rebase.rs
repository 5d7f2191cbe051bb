//! Rebase scenarios: the identity laws, the sandwich law on disjoint edits,
//! and a moved-away source getting muted when rebased over a concurrent
//! remove of that same source.

mod common;

use common::AddOps;
use common::LinearMetadata;
use seqfield_algebra::editor;
use seqfield_algebra::invert;
use seqfield_algebra::rebase;
use seqfield_algebra::AtomId;
use seqfield_algebra::CellId;
use seqfield_algebra::Config;
use seqfield_algebra::LocalId;
use seqfield_algebra::MarkEffect;
use seqfield_algebra::NoChildChanges;
use seqfield_algebra::TaggedChange;

fn id(revision: u32, local: u32) -> AtomId<u32> {
    AtomId::new(revision, LocalId(local))
}

/// `rebase(a, empty) ≡ a` (spec.md §8 item 3).
#[test]
fn rebase_over_empty_is_identity() {
    let metadata = LinearMetadata::new([1]);
    let config = Config::default();
    let a: seqfield_algebra::Changeset<u32, ()> = editor::remove(1, 3, 2, id(1, 0));
    let empty: seqfield_algebra::Changeset<u32, ()> = seqfield_algebra::Changeset::empty();

    let result = rebase(&TaggedChange::new(a.clone(), 1), &TaggedChange::new(empty, 2), &metadata, &NoChildChanges, &config)
        .expect("rebase must not fail on well-formed input");

    assert!(result.normalized_eq(&a, &1));
}

/// `rebase(empty, b) ≡ empty` (spec.md §8 item 3).
#[test]
fn rebase_of_empty_is_empty() {
    let metadata = LinearMetadata::new([1]);
    let config = Config::default();
    let empty: seqfield_algebra::Changeset<u32, ()> = seqfield_algebra::Changeset::empty();
    let b: seqfield_algebra::Changeset<u32, ()> = editor::remove(2, 3, 2, id(2, 0));

    let result = rebase(&TaggedChange::new(empty, 1), &TaggedChange::new(b, 2), &metadata, &NoChildChanges, &config)
        .expect("rebase must not fail on well-formed input");

    assert!(result.is_empty());
}

/// `rebase(rebase(a, b), invert(b)) ≡ a` when `a` and `b` touch disjoint
/// cells -- rebasing past `b` and then past its own inverse must land back
/// on `a` (spec.md §8 item 4).
#[test]
fn sandwich_rebase_on_disjoint_edits() {
    let metadata = LinearMetadata::new([1, 2, 3]);
    let config = Config::default();
    let a: seqfield_algebra::Changeset<u32, ()> = editor::remove(1, 0, 1, id(1, 0));
    let b: seqfield_algebra::Changeset<u32, ()> = editor::remove(2, 5, 1, id(2, 0));

    let a_over_b = rebase(&TaggedChange::new(a.clone(), 1), &TaggedChange::new(b.clone(), 2), &metadata, &NoChildChanges, &config)
        .expect("rebase must not fail on well-formed input");
    assert!(a_over_b.normalized_eq(&a, &1), "disjoint rebase must leave `a` untouched");

    let inv_b = invert(&b, false, &3, &NoChildChanges).expect("invert must not fail");
    let back = rebase(&TaggedChange::new(a_over_b, 1), &TaggedChange::new(inv_b, 3), &metadata, &NoChildChanges, &config)
        .expect("rebase must not fail on well-formed input");

    assert!(back.normalized_eq(&a, &1));
}

/// `rebase(rebase(a, b), invert(b)) ≡ a` when `a` and `b` are concurrent
/// child edits on the *same* cell -- the disjoint-edit case above never
/// exercises `child_ops.rebase`/`child_ops.invert` at all, since nothing
/// lands on a shared cell. [`AddOps`] makes the combination observable:
/// `rebase` is the identity transform and `invert` negates, so the round
/// trip must land back on `a`'s own content (spec.md §8 item 4).
#[test]
fn sandwich_rebase_on_overlapping_edits() {
    let metadata = LinearMetadata::new([1, 2, 3]);
    let config = Config::default();
    let a: seqfield_algebra::Changeset<u32, i32> = editor::modify(1, 0, 5);
    let b: seqfield_algebra::Changeset<u32, i32> = editor::modify(2, 0, 3);

    let a_over_b = rebase(&TaggedChange::new(a.clone(), 1), &TaggedChange::new(b.clone(), 2), &metadata, &AddOps, &config)
        .expect("rebase must not fail on well-formed input");
    assert!(a_over_b.normalized_eq(&a, &1), "{a_over_b:?}");

    let inv_b = invert(&b, false, &3, &AddOps).expect("invert must not fail");
    let back = rebase(&TaggedChange::new(a_over_b, 1), &TaggedChange::new(inv_b, 3), &metadata, &AddOps, &config)
        .expect("rebase must not fail on well-formed input");

    assert!(back.normalized_eq(&a, &1), "{back:?}");
}

/// A move whose source is concurrently removed gets muted: its landing
/// `MoveIn` is converted to a `Tombstone` rather than attaching content
/// that no longer exists.
#[test]
fn move_muted_when_source_concurrently_removed() {
    let metadata = LinearMetadata::new([1, 2]);
    let config = Config::default();
    let change: seqfield_algebra::Changeset<u32, ()> = editor::move_range(1, 0, 1, 2, id(1, 0));
    let over: seqfield_algebra::Changeset<u32, ()> = editor::remove(2, 0, 1, id(2, 0));

    let rebased = rebase(&TaggedChange::new(change, 1), &TaggedChange::new(over, 2), &metadata, &NoChildChanges, &config)
        .expect("rebase must not fail on well-formed input");

    let marks = rebased.marks();
    assert_eq!(marks.len(), 3, "{marks:?}");
    assert_eq!(marks[0].effect, MarkEffect::Tombstone);
    assert_eq!(marks[0].cell_id, Some(CellId::new(2, LocalId(0))));
    assert_eq!(marks[1].effect, MarkEffect::NoOp);
    assert_eq!(marks[2].effect, MarkEffect::Tombstone);
    assert_eq!(marks[2].cell_id, Some(CellId::new(1, LocalId(0))));
}

/// A fresh attach (`Insert`) in `change` passes through a rebase verbatim,
/// regardless of what `over` does -- it names new territory `over` cannot
/// concurrently claim.
#[test]
fn fresh_insert_is_unaffected_by_rebase() {
    let metadata = LinearMetadata::new([1, 2]);
    let config = Config::default();
    let change: seqfield_algebra::Changeset<u32, ()> = editor::insert(1, 2, 1, id(1, 0), Default::default());
    let over: seqfield_algebra::Changeset<u32, ()> = editor::remove(2, 0, 5, id(2, 0));

    let rebased = rebase(&TaggedChange::new(change.clone(), 1), &TaggedChange::new(over, 2), &metadata, &NoChildChanges, &config)
        .expect("rebase must not fail on well-formed input");

    assert!(matches!(
        rebased.marks().iter().find(|m| matches!(m.effect, MarkEffect::Attach(_))).map(|m| &m.effect),
        Some(MarkEffect::Attach(seqfield_algebra::AttachEffect::Insert { id: found, .. })) if *found == id(1, 0)
    ));
}
