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

//! Change-rebasing core for a single collaboratively-edited optional-value
//! field: a field that holds zero or one child node.
//!
//! A [`changeset::Changeset`] describes one edit to such a field — which
//! node (if any) now occupies it, where that node came from, and any
//! opaque nested edits to nodes the changeset names. [`rebaser`] supplies
//! the algebra for combining, inverting, and transforming changesets
//! against each other; [`editor`] builds the common single-edit cases;
//! [`delta`] flattens a changeset for consumers that don't speak the
//! algebra themselves.
//!
//! Everything here is synchronous and single-threaded: no operation
//! suspends, and callers are expected to drive the algebra from their own
//! sequencing loop.

pub mod changeset;
pub mod child;
pub mod cross_field;
pub mod delta;
pub mod editor;
pub mod error;
pub mod ids;
pub mod rebaser;
pub mod revision_metadata;

pub use changeset::{Changeset, Context, Location, ReplaceSource, ValueReplace};
pub use child::ChildChangeOps;
pub use cross_field::CrossFieldManager;
pub use error::{RebaseError, Result};
pub use ids::{ChangeAtomId, IdAllocator, LocalId, RevisionTag};
pub use revision_metadata::RevisionMetadataSource;
