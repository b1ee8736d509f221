// Copyright 2026 The optional-field-rebase Contributors
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

//! The capability set a caller supplies for the opaque child-change payload
//! `C`. The rebaser algebra never inspects `C` itself; every operation on a
//! nested edit goes through one of these methods.

use std::collections::HashSet;

use crate::ids::{ChangeAtomId, RevisionTag};
use crate::revision_metadata::RevisionMetadataSource;

/// Composes, inverts, rebases, and projects a caller-defined child-change
/// type. A single implementation is expected per field schema; the rebaser
/// algebra is generic over `C: ChildChangeOps` wherever it needs to combine
/// nested edits rather than merely carry them.
pub trait ChildChangeOps<C> {
    /// The flattened projection of a `C` a delta consumer can act on
    /// without understanding `C` itself.
    type Delta;

    /// Combines `first` applied before `second`, in that order, the same
    /// way [`crate::rebaser::compose`] combines whole changesets.
    fn compose(&self, first: &C, second: &C) -> C;

    /// Produces the change that undoes `change`. `is_rollback` distinguishes
    /// rollback (restore prior state exactly) from undo (cancel visible
    /// effect going forward) — see `spec.md` §4.4.2.
    fn invert(&self, change: &C, is_rollback: bool) -> C;

    /// Rebases `change` (built to apply after `base_before`) to apply after
    /// `base_after` instead, i.e. `change ↷ (base_before, base_after)`.
    fn rebase(
        &self,
        change: &C,
        base_before: &C,
        base_after: &C,
        metadata: &dyn RevisionMetadataSource,
    ) -> C;

    /// Flattens `change` into an externally consumable delta.
    fn to_delta(&self, change: &C) -> Self::Delta;

    /// Whether `change` has no observable effect. Implementations should
    /// give a cheap, direct answer rather than delegating to
    /// [`Self::to_delta`] and comparing; the rebaser algebra always prefers
    /// this over comparing deltas.
    fn is_empty(&self, change: &C) -> bool;

    /// Replaces every revision nested inside `change` that is a member of
    /// `old_set` (including the elided `None` member) with `revision`,
    /// matching [`crate::rebaser::replace_revisions`]'s contract for the
    /// opaque payload (`spec.md` §4.4.4).
    fn replace_revisions(&self, change: &C, old_set: &HashSet<Option<RevisionTag>>, revision: RevisionTag) -> C;

    /// The ids of every detached root `change` itself depends on — e.g. a
    /// nested move inside `change` that references content not currently
    /// part of the live tree. [`crate::delta::relevant_removed_roots`]
    /// chains this into the roots it reports for the field as a whole,
    /// matching `spec.md` §6's `relevantRemovedRoots(C, fromChild)`. Most
    /// implementations with no such internal structure just return an empty
    /// `Vec`.
    fn relevant_removed_roots(&self, change: &C) -> Vec<ChangeAtomId>;
}
