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

//! The error surface of the rebase core.
//!
//! Most of what `spec.md` §7 calls "invariant violations" are bugs in a
//! caller's changeset construction, not recoverable conditions, and are
//! reported via `debug_assert!` at the construction sites in
//! [`crate::changeset`] rather than through this enum. What's left here are
//! the error kinds a correctly-behaving caller can still hit in production:
//! a [`crate::cross_field::CrossFieldManager`] refusing to resolve a key it
//! was asked about, or a [`crate::revision_metadata::RevisionMetadataSource`]
//! that can't actually break a last-writer-wins tie [`crate::rebaser::rebase`]
//! needs it to.

use thiserror::Error;

use crate::ids::ChangeAtomId;

pub type Result<T> = std::result::Result<T, RebaseError>;

/// Errors produced while composing, inverting, or rebasing a changeset.
#[derive(Debug, Error)]
pub enum RebaseError {
    /// A [`crate::cross_field::CrossFieldManager`] declined to produce or
    /// accept a value for the given move target, making the operation that
    /// needed it impossible to complete.
    #[error("cross-field manager could not resolve move target {target:?}: {reason}")]
    CrossFieldUnavailable {
        target: ChangeAtomId,
        reason: String,
    },

    /// A [`crate::revision_metadata::RevisionMetadataSource`] was asked to
    /// rank a revision it has no record of. Unlike the cross-field case this
    /// always indicates the caller passed a metadata source that doesn't
    /// cover the changesets being rebased.
    #[error("revision metadata source has no ranking for an input revision")]
    UnrankedRevision,
}
