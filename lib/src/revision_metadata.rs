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

//! Ordering and rollback information about revisions, supplied by the
//! caller's sequencer. `RevisionTag` carries no ordering of its own (see
//! `ids.rs`); whenever the algebra needs to break a tie or ask "did this
//! revision already roll back," it asks a [`RevisionMetadataSource`].

use crate::ids::RevisionTag;

/// A total order over the revisions participating in a rebase, plus
/// rollback bookkeeping, queried by [`crate::rebaser::rebase`] (last-writer-
/// wins tie-breaking) and [`crate::rebaser::compose`] (revision elision).
///
/// Implementations are supplied by the host application; this crate ships
/// no production implementation, only a small fixed-ranking test double in
/// `testutils`.
pub trait RevisionMetadataSource {
    /// Returns the rank of `revision` in the ambient sequencing order,
    /// higher meaning later. Two different revisions never share a rank.
    /// Returns `None` if `revision` is not one this source has a ranking
    /// for.
    fn rank(&self, revision: RevisionTag) -> Option<u64>;

    /// Whether `revision` has since been rolled back by a later operation,
    /// making it ineligible to win a last-writer-wins tie-break against a
    /// revision that has not.
    fn is_rolled_back(&self, revision: RevisionTag) -> bool;

    /// Orders two revisions by [`Self::rank`], later revision wins, with
    /// rolled-back revisions always losing regardless of rank. Returns
    /// `None` if neither revision is live (a legitimate "no conflict left to
    /// resolve" outcome) or if ranking is missing; callers that need to tell
    /// a missing ranking apart from that legitimate case should use
    /// [`Self::later_checked`] instead.
    fn later(&self, a: RevisionTag, b: RevisionTag) -> Option<RevisionTag> {
        let a_live = !self.is_rolled_back(a);
        let b_live = !self.is_rolled_back(b);
        match (a_live, b_live) {
            (true, false) => return Some(a),
            (false, true) => return Some(b),
            (false, false) => return None,
            (true, true) => {}
        }
        match (self.rank(a), self.rank(b)) {
            (Some(ra), Some(rb)) if ra >= rb => Some(a),
            (Some(_), Some(_)) => Some(b),
            _ => None,
        }
    }

    /// Like [`Self::later`], but distinguishes the legitimate "neither
    /// revision is live" outcome (`Ok(None)`) from "both revisions are live
    /// but this source has no ranking for at least one of them" — the case
    /// `spec.md` §7.2 says the algebra must raise rather than silently
    /// resolve one way or the other. [`crate::rebaser::rebase`] uses this,
    /// not [`Self::later`], whenever a last-writer-wins tie actually needs
    /// breaking.
    fn later_checked(
        &self,
        a: RevisionTag,
        b: RevisionTag,
    ) -> crate::error::Result<Option<RevisionTag>> {
        let a_live = !self.is_rolled_back(a);
        let b_live = !self.is_rolled_back(b);
        match (a_live, b_live) {
            (true, false) => return Ok(Some(a)),
            (false, true) => return Ok(Some(b)),
            (false, false) => return Ok(None),
            (true, true) => {}
        }
        match (self.rank(a), self.rank(b)) {
            (Some(ra), Some(rb)) => Ok(Some(if ra >= rb { a } else { b })),
            _ => Err(crate::error::RebaseError::UnrankedRevision),
        }
    }
}
