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

//! Operator configuration, threaded explicitly into calls rather than read
//! from a global, matching how `jj-lib`'s `tree_merge::MergeOptions` is
//! passed into tree-merge calls (see `DESIGN.md`).

use crate::mark::Tiebreak;

/// Which [`crate::oracle::CellOrderOracle`] implementation an operator call
/// should use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CellOrderingMode {
    /// Consult lineage records; falls back to revision order when no
    /// shared anchor exists (spec.md §9 open question).
    Lineage,
    /// Consult the explicit tombstone marks of the changeset being
    /// traversed; always total. The default, per spec.md §9's guidance
    /// that implementations may treat this mode as primary.
    #[default]
    Tombstone,
}

/// Settings shared by `compose`, `rebase`, and the editor.
#[derive(Clone, Debug)]
pub struct Config {
    pub cell_ordering_mode: CellOrderingMode,
    /// Tiebreak applied to new attaches when the editor does not specify
    /// one explicitly.
    pub default_tiebreak: Tiebreak,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_ordering_mode: CellOrderingMode::default(),
            default_tiebreak: Tiebreak::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_primary_mode() {
        let config = Config::default();
        assert_eq!(config.cell_ordering_mode, CellOrderingMode::Tombstone);
        assert_eq!(config.default_tiebreak, Tiebreak::Left);
    }
}
