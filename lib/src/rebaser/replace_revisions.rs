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

//! `replace_revisions`: walks every `ChangeAtomId` in a changeset, replacing
//! any revision that is a member of `old_set` — the elided `None` revision
//! included — with `new_revision`. Used both to *inline* a changeset under
//! construction (`old_set = {None}`) and to *rename* an already-materialized
//! revision, e.g. when a caller's own revision-numbering scheme changes
//! underneath it (`spec.md` §4.4.4).

use std::collections::HashSet;

use tracing::instrument;

use crate::changeset::{Changeset, Location, ReplaceSource, ValueReplace};
use crate::child::ChildChangeOps;
use crate::cross_field::CrossFieldManager;
use crate::ids::RevisionTag;

/// Replaces every revision in `changeset` that is a member of `old_set`
/// (including `None`, the elided revision) with `new_revision`. Atoms
/// whose revision is not in `old_set` are left untouched.
#[instrument(skip(changeset, old_set, ops, cross_field))]
pub fn replace_revisions<C, O: ChildChangeOps<C>>(
    changeset: &Changeset<C>,
    old_set: &HashSet<Option<RevisionTag>>,
    new_revision: RevisionTag,
    ops: &O,
    cross_field: &mut dyn CrossFieldManager,
) -> Changeset<C> {
    let substitute =
        |id: crate::ids::ChangeAtomId| id.replace_revision_if_in_set(old_set, new_revision);

    let moves = changeset
        .moves()
        .iter()
        .map(|(&src, &dst)| {
            let (new_src, new_dst) = (substitute(src), substitute(dst));
            if new_src != src {
                cross_field.move_key(src, new_src);
            }
            (new_src, new_dst)
        })
        .collect();

    let child_changes = changeset
        .child_changes()
        .iter()
        .map(|(&location, change)| {
            let location = match location {
                Location::Field => Location::Field,
                Location::Atom(id) => Location::Atom(substitute(id)),
            };
            (location, ops.replace_revisions(change, old_set, new_revision))
        })
        .collect();

    let value_replace = changeset.value_replace().map(|replace| ValueReplace {
        is_empty: replace.is_empty,
        dst: substitute(replace.dst),
        src: replace.src.map(|src| match src {
            ReplaceSource::FromSelf => ReplaceSource::FromSelf,
            ReplaceSource::Atom(id) => ReplaceSource::Atom(substitute(id)),
        }),
    });

    Changeset::new(moves, child_changes, value_replace, changeset.context())
}
