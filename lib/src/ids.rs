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

//! Identifiers used to name changes: opaque revision tags, per-changeset
//! local ids, and the `(revision?, local)` pair that names a single atomic
//! edit across its lifetime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque handle naming the changeset (the "revision") a change
/// originated in. The core never mints one of these itself; it only
/// threads tags a caller supplies, compares them for equality, and asks a
/// [`crate::revision_metadata::RevisionMetadataSource`] to order them when
/// ordering is actually needed.
///
/// `RevisionTag` carries no `Ord` impl on purpose: sequencing is a policy
/// decision owned by the metadata source, not a property of the tag itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionTag(u64);

impl RevisionTag {
    /// Wraps a caller-assigned handle. The core treats this as an opaque
    /// value; callers are responsible for uniqueness.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the underlying handle, for callers that need to persist or
    /// transmit it outside this crate's own (de)serialization.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for RevisionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevisionTag({:x})", self.0)
    }
}

/// A counter, unique within the changeset that minted it, distinguishing
/// atoms produced in the same revision. Monotonically increasing by
/// construction through [`IdAllocator`]; never reused within a changeset.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalId(u64);

impl LocalId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.0)
    }
}

/// Names a single atomic edit for as long as it lives: the revision it was
/// minted in (elided, as `None`, when a changeset refers to one of its own
/// not-yet-sequenced edits) paired with the local counter that was live at
/// the time.
///
/// Two `ChangeAtomId`s with different `revision`s are never equal, even if
/// `local` matches; `revision: None` is a distinct, non-wildcard value that
/// only compares equal to another `None`-revision atom with the same
/// `local` minted within the same changeset under construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeAtomId {
    pub revision: Option<RevisionTag>,
    pub local: LocalId,
}

impl ChangeAtomId {
    pub fn new(revision: Option<RevisionTag>, local: LocalId) -> Self {
        Self { revision, local }
    }

    /// An atom minted by the changeset currently under construction, whose
    /// own revision has not yet been assigned.
    pub fn elided(local: LocalId) -> Self {
        Self::new(None, local)
    }

    /// Returns the same atom with its revision filled in, matching
    /// [`crate::changeset::Changeset::canonicalize`]'s per-atom substitution
    /// rule: an atom that already carries a revision is left untouched. This
    /// is a pure fill, not a rename — see [`Self::replace_revision_if_in_set`]
    /// for the general form [`crate::rebaser::replace_revisions`] needs.
    pub fn with_revision_if_elided(self, revision: RevisionTag) -> Self {
        match self.revision {
            Some(_) => self,
            None => Self::new(Some(revision), self.local),
        }
    }

    /// Returns the same atom with its revision replaced by `new_revision` if
    /// its current revision — `None` included — is a member of `old_set`;
    /// otherwise returns the atom unchanged. Unlike
    /// [`Self::with_revision_if_elided`], this can rename an
    /// already-materialized revision, not just fill in an elided one,
    /// matching `spec.md` §4.4.4's `replaceRevisions(C, oldSet, newRevision)`.
    pub fn replace_revision_if_in_set(
        self,
        old_set: &std::collections::HashSet<Option<RevisionTag>>,
        new_revision: RevisionTag,
    ) -> Self {
        if old_set.contains(&self.revision) {
            Self::new(Some(new_revision), self.local)
        } else {
            self
        }
    }
}

impl fmt::Debug for ChangeAtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(rev) => write!(f, "{:?}/{:?}", rev, self.local),
            None => write!(f, "?/{:?}", self.local),
        }
    }
}

/// Mints fresh, never-reused [`LocalId`]s for a changeset under
/// construction, seeded past the highest local id already referenced by
/// any input changeset so that freshly built atoms can never collide with
/// ones a composition or rebase is folding together.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdAllocator {
    next: LocalId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next: LocalId::from_raw(0),
        }
    }

    /// Builds an allocator guaranteed to mint ids past every local id
    /// appearing in `seeds`.
    pub fn seeded_past(seeds: impl IntoIterator<Item = LocalId>) -> Self {
        let mut max = None;
        for id in seeds {
            max = Some(match max {
                Some(m) if m >= id => m,
                _ => id,
            });
        }
        match max {
            Some(m) => Self { next: m.next() },
            None => Self::new(),
        }
    }

    pub fn alloc(&mut self) -> LocalId {
        let id = self.next;
        self.next = self.next.next();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_mints_strictly_increasing_ids() {
        let mut alloc = IdAllocator::new();
        let a = alloc.alloc();
        let b = alloc.alloc();
        let c = alloc.alloc();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn allocator_seeded_past_skips_existing_ids() {
        let seeds = [LocalId::from_raw(3), LocalId::from_raw(7), LocalId::from_raw(2)];
        let mut alloc = IdAllocator::seeded_past(seeds);
        let fresh = alloc.alloc();
        assert!(seeds.iter().all(|&s| s != fresh));
        assert_eq!(fresh, LocalId::from_raw(8));
    }

    #[test]
    fn elided_atom_gets_revision_filled_in_once() {
        let local = LocalId::from_raw(5);
        let atom = ChangeAtomId::elided(local);
        let rev = RevisionTag::from_raw(42);
        let materialized = atom.with_revision_if_elided(rev);
        assert_eq!(materialized.revision, Some(rev));

        // An atom that already carries a revision is unaffected by a second
        // substitution attempt.
        let other_rev = RevisionTag::from_raw(99);
        assert_eq!(materialized.with_revision_if_elided(other_rev), materialized);
    }

    #[test]
    fn elided_atoms_with_same_local_are_equal() {
        let a = ChangeAtomId::elided(LocalId::from_raw(1));
        let b = ChangeAtomId::elided(LocalId::from_raw(1));
        assert_eq!(a, b);
    }

    #[test]
    fn atoms_from_different_revisions_are_never_equal() {
        let local = LocalId::from_raw(1);
        let a = ChangeAtomId::new(Some(RevisionTag::from_raw(1)), local);
        let b = ChangeAtomId::new(Some(RevisionTag::from_raw(2)), local);
        assert_ne!(a, b);
    }

    #[test]
    fn replace_revision_if_in_set_renames_a_materialized_member() {
        let old_rev = RevisionTag::from_raw(1);
        let new_rev = RevisionTag::from_raw(2);
        let atom = ChangeAtomId::new(Some(old_rev), LocalId::from_raw(0));
        let old_set = std::collections::HashSet::from([Some(old_rev)]);
        let renamed = atom.replace_revision_if_in_set(&old_set, new_rev);
        assert_eq!(renamed.revision, Some(new_rev));
    }

    #[test]
    fn replace_revision_if_in_set_fills_the_elided_member() {
        let new_rev = RevisionTag::from_raw(2);
        let atom = ChangeAtomId::elided(LocalId::from_raw(0));
        let old_set = std::collections::HashSet::from([None]);
        let filled = atom.replace_revision_if_in_set(&old_set, new_rev);
        assert_eq!(filled.revision, Some(new_rev));
    }

    #[test]
    fn replace_revision_if_in_set_leaves_non_members_untouched() {
        let other_rev = RevisionTag::from_raw(3);
        let atom = ChangeAtomId::new(Some(other_rev), LocalId::from_raw(0));
        let old_set = std::collections::HashSet::from([None, Some(RevisionTag::from_raw(1))]);
        let untouched = atom.replace_revision_if_in_set(&old_set, RevisionTag::from_raw(9));
        assert_eq!(untouched, atom);
    }
}
