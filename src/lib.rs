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

//! Run-length-encoded change algebra for a single ordered sequence field in
//! a collaborative tree.
//!
//! A [`changeset::Changeset`] is a list of [`mark::Mark`]s, each covering a
//! run of cells and describing what happened to them: nothing
//! ([`mark::MarkEffect::NoOp`]), an attach, a detach, or both at once (a
//! transient). Three operators combine changesets produced by independent
//! editors into a single consistent history:
//!
//! - [`compose::compose`] sequences two changesets into one.
//! - [`invert::invert`] produces the changeset that undoes another.
//! - [`rebase::rebase`] rewrites a changeset as though a concurrent one had
//!   already landed.
//!
//! The algebra is polymorphic over the type of nested (child) change a
//! node carries, via the [`child::ChildOps`] trait; this crate never
//! interprets child changes except through that trait and `PartialEq`.
//! It is also agnostic to the revision identifier type, via the
//! [`ids::Revision`] blanket trait and the caller-supplied
//! [`metadata::RevisionMetadata`] source.

pub mod cell;
pub mod changeset;
pub mod child;
pub mod compose;
pub mod config;
pub mod cross_field;
pub mod delta;
pub mod editor;
pub mod error;
pub mod ids;
pub mod invert;
pub mod mark;
pub mod metadata;
pub mod oracle;
pub mod queue;
pub mod rebase;

pub use cell::CellId;
pub use cell::LineageEntry;
pub use changeset::Changeset;
pub use changeset::MarkListBuilder;
pub use changeset::TaggedChange;
pub use child::ChildOps;
pub use child::NoChildChanges;
pub use compose::compose;
pub use compose::compose_two;
pub use compose::shallow_compose;
pub use config::CellOrderingMode;
pub use config::Config;
pub use cross_field::CrossFieldManager;
pub use delta::into_delta;
pub use delta::ChildToDelta;
pub use delta::FieldDelta;
pub use error::ChangesetError;
pub use error::ChangesetResult;
pub use ids::AtomId;
pub use ids::LocalId;
pub use ids::Revision;
pub use invert::invert;
pub use mark::AttachEffect;
pub use mark::DetachEffect;
pub use mark::Mark;
pub use mark::MarkEffect;
pub use mark::Tiebreak;
pub use metadata::RevisionInfo;
pub use metadata::RevisionMetadata;
pub use oracle::CellOrderOracle;
pub use oracle::LineageOracle;
pub use oracle::TombstoneOracle;
pub use rebase::rebase;
