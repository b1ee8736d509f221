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

//! `invert`: builds the changeset that undoes another.
//!
//! `is_rollback` distinguishes two uses the spec asks for: a rollback wants
//! the prior state restored exactly, while an undo only needs the *visible*
//! effect cancelled going forward (`SPEC_FULL.md` §C.6 records this crate's
//! decision to implement `undo` to that weaker guarantee rather than full
//! structural identity with the empty changeset).

use indexmap::IndexMap;
use tracing::instrument;

use crate::changeset::{Changeset, Context, ReplaceSource, ValueReplace};
use crate::child::ChildChangeOps;
use crate::ids::IdAllocator;

/// Builds the inverse of `change`. `is_rollback` is threaded through to
/// `ops.invert` for the opaque child-change payload; the move set and value
/// replace are inverted the same way regardless of mode, since this layer
/// keeps no extra rollback-only bookkeeping beyond what a `ValueReplace`
/// already records (`SPEC_FULL.md` §C.5, the Y-tracking trail stays
/// internal to `moves` and is not otherwise exposed). `alloc` mints the
/// fresh detach id the inverted value replace needs.
#[instrument(skip_all, fields(is_rollback))]
pub fn invert<C, O: ChildChangeOps<C>>(
    change: &Changeset<C>,
    is_rollback: bool,
    ops: &O,
    alloc: &mut IdAllocator,
) -> Changeset<C> {
    let moves = change
        .moves()
        .iter()
        .map(|(&src, &dst)| (dst, src))
        .collect::<IndexMap<_, _>>();

    let child_changes = change
        .child_changes()
        .iter()
        .map(|(&location, c)| (location, ops.invert(c, is_rollback)))
        .collect();

    let new_dst = crate::ids::ChangeAtomId::elided(alloc.alloc());
    let value_replace = change
        .value_replace()
        .map(|replace| invert_value_replace(replace, change.context().output_empty, new_dst));

    let context = Context::new(change.context().output_empty, change.context().input_empty);

    Changeset::new(moves, child_changes, value_replace, context)
}

/// `spec.md` §4.4.2's value-replace inversion: the new `isEmpty` flag is
/// simply whether `change`'s own output was empty; the new `dst` is a fresh
/// id naming whatever `change`'s output left occupying the field (so a
/// later op can detach it again); the new `src` restores whatever this
/// replace detached — `original.dst`, not `original.src` — except a pin
/// inverts to itself and a reserve-only clear (`is_empty` true, nothing
/// ever really there) inverts to nothing.
fn invert_value_replace(
    replace: &ValueReplace,
    new_is_empty: bool,
    new_dst: crate::ids::ChangeAtomId,
) -> ValueReplace {
    let new_src = match replace.src {
        Some(ReplaceSource::Atom(_)) => Some(ReplaceSource::Atom(replace.dst)),
        Some(ReplaceSource::FromSelf) => Some(ReplaceSource::FromSelf),
        None if replace.is_empty => None,
        None => Some(ReplaceSource::Atom(replace.dst)),
    };
    ValueReplace::new(new_is_empty, new_dst, new_src)
}
