//! Delta projection scenarios (spec.md §4.8): each mark effect lowers to
//! the expected combination of local/global/rename/build entries.

mod common;

use seqfield_algebra::changeset::TaggedChange;
use seqfield_algebra::delta::into_delta;
use seqfield_algebra::delta::ChildToDelta;
use seqfield_algebra::editor;
use seqfield_algebra::AtomId;
use seqfield_algebra::LocalId;

struct Identity;
impl ChildToDelta<&'static str, &'static str> for Identity {
    fn to_delta(&self, child: &&'static str) -> &'static str {
        child
    }
}

struct UnitDelta;
impl ChildToDelta<(), ()> for UnitDelta {
    fn to_delta(&self, _child: &()) {}
}

fn id(revision: u32, local: u32) -> AtomId<u32> {
    AtomId::new(revision, LocalId(local))
}

#[test]
fn insert_produces_a_build_entry_and_an_attach_local_mark() {
    let change: seqfield_algebra::Changeset<u32, &'static str> = editor::insert(1, 0, 2, id(1, 0), Default::default());
    let delta = into_delta(&TaggedChange::new(change, 1), &Identity);

    assert_eq!(delta.build, vec![id(1, 0)]);
    assert_eq!(delta.local.len(), 1);
    assert_eq!(delta.local[0].count, 2);
    assert_eq!(delta.local[0].attach, Some(id(1, 0)));
    assert!(delta.local[0].detach.is_none());
    assert!(delta.rename.is_empty());
    assert!(delta.global.is_empty());
}

#[test]
fn remove_produces_a_detach_local_mark_and_stashes_the_child_globally() {
    let mut change: seqfield_algebra::Changeset<u32, &'static str> = editor::remove(1, 0, 1, id(1, 0));
    let mut marks = change.into_marks();
    marks[0].changes = Some("removed-content");
    change = seqfield_algebra::Changeset::from_marks_unchecked(marks);

    let delta = into_delta(&TaggedChange::new(change, 1), &Identity);

    assert_eq!(delta.local.len(), 1);
    assert_eq!(delta.local[0].detach, Some(id(1, 0)));
    assert!(delta.local[0].attach.is_none());
    assert_eq!(delta.global.get(&id(1, 0)), Some(&"removed-content"));
}

/// A transient (attach-and-detach) records no local run at all -- it names
/// cells that never persist on the field -- only a `rename` pairing its two
/// halves (and, since the attach half is an `Insert`, a `build` entry).
#[test]
fn transient_records_a_rename_and_a_build_but_no_local_run() {
    let inserted: seqfield_algebra::Changeset<u32, ()> = editor::insert(1, 0, 1, id(1, 0), Default::default());
    let removed: seqfield_algebra::Changeset<u32, ()> = editor::remove(2, 0, 1, id(2, 0));
    let metadata = common::LinearMetadata::new([1, 2]);
    let composed = seqfield_algebra::compose_two(
        &TaggedChange::new(inserted, 1),
        &TaggedChange::new(removed, 2),
        &metadata,
        &seqfield_algebra::NoChildChanges,
    )
    .expect("compose must not fail on well-formed input");

    let delta = into_delta(&TaggedChange::new(composed, 2), &UnitDelta);

    assert!(delta.local.is_empty());
    assert_eq!(delta.rename, vec![(id(1, 0), id(2, 0))]);
    assert_eq!(delta.build, vec![id(1, 0)]);
}

/// A pure tombstone witness produces nothing in any stream.
#[test]
fn tombstone_produces_no_delta_entries() {
    let cell_id = seqfield_algebra::CellId::new(1, LocalId(0));
    let change: seqfield_algebra::Changeset<u32, &'static str> =
        seqfield_algebra::Changeset::from_marks_unchecked(vec![seqfield_algebra::Mark::tombstone(1, cell_id)]);

    let delta = into_delta(&TaggedChange::new(change, 1), &Identity);

    assert!(delta.local.is_empty());
    assert!(delta.global.is_empty());
    assert!(delta.rename.is_empty());
    assert!(delta.build.is_empty());
}

/// A plain modify over untouched, already-populated cells projects to a
/// local run carrying only the child delta, no attach/detach.
#[test]
fn modify_on_populated_cell_projects_child_only() {
    let change: seqfield_algebra::Changeset<u32, &'static str> = editor::modify(1, 0, "edited");
    let delta = into_delta(&TaggedChange::new(change, 1), &Identity);

    assert_eq!(delta.local.len(), 1);
    assert!(delta.local[0].attach.is_none());
    assert!(delta.local[0].detach.is_none());
    assert_eq!(delta.local[0].child, Some("edited"));
}
