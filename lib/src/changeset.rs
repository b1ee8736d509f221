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

//! The changeset model: a single edit to an optional field, expressed as a
//! move set, a set of opaque nested edits keyed by location, and at most one
//! replacement of the field's own value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::ChangeAtomId;

/// Where a child change applies: either to the node presently occupying the
/// field (`self`) or to a node named by an explicit atom id, e.g. one this
/// same changeset detached or one a move references without occupying the
/// field.
///
/// `self` is never represented as a sentinel [`ChangeAtomId`] — see
/// `SPEC_FULL.md` §C.3.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Location {
    /// The node currently occupying the field.
    Field,
    /// A node named by id, not (or no longer) occupying the field.
    Atom(ChangeAtomId),
}

/// Where the node placed into the field by a [`ValueReplace`] came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ReplaceSource {
    /// The field's own prior occupant, re-affirmed rather than replaced.
    FromSelf,
    /// A node named by id, e.g. one a move detached earlier in the same
    /// changeset.
    Atom(ChangeAtomId),
}

/// Describes what this changeset does to the field's own value.
///
/// `dst` always names whatever this replace detaches — the fresh identity
/// assigned to the field's prior occupant at the moment it leaves the
/// field. That holds even when nothing is really there yet: a `set` into
/// an empty field (`is_empty = true`) still carries a `dst`, reserved so a
/// concurrently-rebased write that also wants the field can be told it lost
/// to this one (`spec.md` §4.4.3's LWW "reserve" downgrade). `src` names
/// what ends up occupying the field instead, or is absent for a plain
/// detach.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ValueReplace {
    pub is_empty: bool,
    pub dst: ChangeAtomId,
    pub src: Option<ReplaceSource>,
}

impl ValueReplace {
    pub fn new(is_empty: bool, dst: ChangeAtomId, src: Option<ReplaceSource>) -> Self {
        Self { is_empty, dst, src }
    }

    /// The field ends up empty, having removed the node now named `dst`.
    pub fn clear(is_empty: bool, dst: ChangeAtomId) -> Self {
        Self::new(is_empty, dst, None)
    }

    /// The field ends up occupied by `src`, detaching whatever was there
    /// (if anything) under the name `dst`.
    pub fn attach(is_empty: bool, dst: ChangeAtomId, src: ReplaceSource) -> Self {
        Self::new(is_empty, dst, Some(src))
    }

    /// A value replace that leaves the field occupied by its own prior
    /// contents, used when a changeset needs to name the current occupant
    /// (e.g. so a later move can detach it) without actually changing it.
    pub fn reaffirm_self(dst: ChangeAtomId) -> Self {
        Self::attach(false, dst, ReplaceSource::FromSelf)
    }
}

/// The input/output emptiness a changeset was built against. `rebase` and
/// `compose` use this to detect when a changeset's recorded expectations no
/// longer match the field it's being applied over.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Context {
    pub input_empty: bool,
    pub output_empty: bool,
}

impl Context {
    pub fn new(input_empty: bool, output_empty: bool) -> Self {
        Self {
            input_empty,
            output_empty,
        }
    }
}

/// A single edit to an optional field: a move set relating detached and
/// attached node ids, a table of opaque nested edits keyed by [`Location`],
/// and at most one [`ValueReplace`] of the field's own value.
///
/// `C` is the caller-supplied opaque child-change payload; this crate never
/// inspects it directly, only through [`crate::child::ChildChangeOps`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize",
    deserialize = "C: Deserialize<'de>"
))]
pub struct Changeset<C> {
    /// Keyed by source atom id; the value is the id the node is attached
    /// under after the move. A changeset has at most one move per source.
    moves: IndexMap<ChangeAtomId, ChangeAtomId>,
    child_changes: IndexMap<Location, C>,
    value_replace: Option<ValueReplace>,
    context: Context,
}

impl<C> Changeset<C> {
    /// Builds a changeset from its parts, checking the structural
    /// invariants `spec.md` §3 requires of every changeset: no target
    /// location receives more than one move, and `moves`/`child_changes`
    /// contain no literal duplicate entries (guaranteed by the map types
    /// themselves, checked here only for the cross-field-target rule).
    ///
    /// A failed check here is a bug in the caller, not a recoverable
    /// condition — see `error.rs`.
    pub fn new(
        moves: IndexMap<ChangeAtomId, ChangeAtomId>,
        child_changes: IndexMap<Location, C>,
        value_replace: Option<ValueReplace>,
        context: Context,
    ) -> Self {
        let changeset = Self {
            moves,
            child_changes,
            value_replace,
            context,
        };
        changeset.debug_check_invariants();
        changeset
    }

    pub fn empty(context: Context) -> Self {
        Self::new(IndexMap::new(), IndexMap::new(), None, context)
    }

    pub fn moves(&self) -> &IndexMap<ChangeAtomId, ChangeAtomId> {
        &self.moves
    }

    pub fn child_changes(&self) -> &IndexMap<Location, C> {
        &self.child_changes
    }

    pub fn value_replace(&self) -> Option<&ValueReplace> {
        self.value_replace.as_ref()
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn into_parts(
        self,
    ) -> (
        IndexMap<ChangeAtomId, ChangeAtomId>,
        IndexMap<Location, C>,
        Option<ValueReplace>,
        Context,
    ) {
        (self.moves, self.child_changes, self.value_replace, self.context)
    }

    /// A changeset is empty (the algebraic identity `ε`) when it moves
    /// nothing, carries no nested edits, and carries no value replace at
    /// all — `spec.md` §4.4.5, verbatim. A replace that merely reaffirms
    /// the field's own prior occupant still projects to an invisible
    /// delta mark (`delta.rs`), but it is not the same thing as *no*
    /// replace: it still participates in compose/rebase as a real
    /// `ValueReplace`, so it is not treated as `ε` here.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.child_changes.is_empty() && self.value_replace.is_none()
    }

    fn debug_check_invariants(&self) {
        #[cfg(debug_assertions)]
        {
            let mut targets = std::collections::HashSet::new();
            for target in self.moves.values() {
                assert!(
                    targets.insert(*target),
                    "changeset has two moves landing on the same target {target:?}",
                );
            }
        }
    }
}

impl<C: PartialEq> Changeset<C> {
    /// Materializes every elided (`revision: None`) atom id appearing in
    /// this changeset as though it had been minted under `own_revision`,
    /// then compares structurally with `other` (itself already canonical,
    /// or canonicalized against its own revision by the caller).
    ///
    /// `IndexMap`'s order-independent `PartialEq` gives set/map equality
    /// for `moves` and `child_changes` for free once both sides are
    /// canonicalized — see `SPEC_FULL.md` §C.4.
    pub fn canonicalize(&self, own_revision: crate::ids::RevisionTag) -> Changeset<C>
    where
        C: Clone,
    {
        let fill = |id: ChangeAtomId| id.with_revision_if_elided(own_revision);
        let moves = self
            .moves
            .iter()
            .map(|(src, dst)| (fill(*src), fill(*dst)))
            .collect();
        let child_changes = self
            .child_changes
            .iter()
            .map(|(loc, change)| {
                let loc = match loc {
                    Location::Field => Location::Field,
                    Location::Atom(id) => Location::Atom(fill(*id)),
                };
                (loc, change.clone())
            })
            .collect();
        let value_replace = self.value_replace.map(|replace| ValueReplace {
            is_empty: replace.is_empty,
            dst: fill(replace.dst),
            src: replace.src.map(|src| match src {
                ReplaceSource::FromSelf => ReplaceSource::FromSelf,
                ReplaceSource::Atom(id) => ReplaceSource::Atom(fill(id)),
            }),
        });
        Changeset::new(moves, child_changes, value_replace, self.context)
    }
}

impl<C: PartialEq> PartialEq for Changeset<C> {
    /// Literal equality: same moves, same child-change keys and values, same
    /// value replace, same context. This does **not** account for elided
    /// revisions — call [`Changeset::canonicalize`] first if the two
    /// changesets may disagree only on which revision is implicit.
    fn eq(&self, other: &Self) -> bool {
        self.moves == other.moves
            && self.child_changes == other.child_changes
            && self.value_replace == other.value_replace
            && self.context == other.context
    }
}
