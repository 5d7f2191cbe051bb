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

//! Error taxonomy for the change algebra.
//!
//! Per the operator contract, concurrent-editing anomalies (unresolved move
//! endpoints, lineage ambiguity) are never surfaced here -- they are
//! resolved locally by the documented fallback rules and only logged (see
//! the `tracing` calls in [`crate::compose`] and [`crate::rebase`]).
//! [`ChangesetError`] exists for the two cases that are genuinely the
//! caller's fault: structurally invalid input, and a revision missing from
//! the metadata source.

use std::error::Error as StdError;

/// The error type returned by the public operator surface.
#[derive(thiserror::Error, Debug)]
pub enum ChangesetError {
    /// A structural precondition from the data model (zero-count mark,
    /// malformed lineage offset, ...) was violated. This indicates a bug in
    /// the caller; operators otherwise enforce these invariants with
    /// `debug_assert!` and panic rather than return this variant, but it is
    /// available for call sites that validate untrusted input before it
    /// reaches the algebra.
    #[error("structural precondition violated: {0}")]
    Precondition(String),

    /// A revision referenced by a change was not found in the
    /// [`crate::metadata::RevisionMetadata`] source supplied to the
    /// operator.
    #[error("revision {revision} referenced by the change is not present in the metadata source")]
    MetadataMissing { revision: String },

    /// Propagated unchanged from the child (nested-change) hook.
    #[error(transparent)]
    ChildChange(Box<dyn StdError + Send + Sync>),
}

pub type ChangesetResult<T> = Result<T, ChangesetError>;
