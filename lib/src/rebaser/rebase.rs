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

//! `rebase`: transforms a changeset built to apply after `base_before` so it
//! applies after `base_after` instead — the two bases being divergent
//! children of the state `change` and `base_after` both actually started
//! from.

use indexmap::IndexMap;
use tracing::instrument;

use crate::changeset::{Changeset, Context, ValueReplace};
use crate::child::ChildChangeOps;
use crate::cross_field::CrossFieldManager;
use crate::ids::{ChangeAtomId, RevisionTag};
use crate::revision_metadata::RevisionMetadataSource;

/// Rebases `change` (tagged `change_revision`) from `base_before` onto
/// `base_after` (tagged `base_after_revision`): `change ↷ (base_before,
/// base_after)`.
///
/// Conflicts — `change` and `base_after` both touching the same move source
/// or the field's own value — are resolved by asking `metadata` which
/// revision is later; a revision `metadata` reports as rolled back never
/// wins. `cross_field` is accepted to match the external signature
/// `spec.md` §4.4.3 gives `rebase`, but this data model's moves are plain
/// within-field detached-node renames with no cross-field endpoint — the
/// spec's own design note says the hook "is invoked only through the
/// generic hook" for schemas that actually model cross-field moves, which
/// this one does not — so it is never consulted here (`spec.md` §6, §9).
///
/// Raises [`crate::error::RebaseError::UnrankedRevision`] if a tie actually
/// needs breaking and `metadata` has no ranking for one of the two
/// revisions involved — `spec.md` §7.2 treats that as a caller error
/// (an incomplete metadata source), not something to silently paper over.
#[instrument(skip(change, base_before, base_after, ops, metadata, _cross_field))]
#[allow(clippy::too_many_arguments)]
pub fn rebase<C, O: ChildChangeOps<C>>(
    change: &Changeset<C>,
    change_revision: RevisionTag,
    base_before: &Changeset<C>,
    base_after: &Changeset<C>,
    base_after_revision: RevisionTag,
    ops: &O,
    metadata: &dyn RevisionMetadataSource,
    _cross_field: &mut dyn CrossFieldManager,
) -> crate::error::Result<Changeset<C>>
where
    C: Clone,
{
    let moves = rebase_moves(change, base_after, change_revision, base_after_revision, metadata)?;
    let child_changes = rebase_child_changes(change, base_before, base_after, ops, metadata);
    let value_replace = rebase_value_replace(
        change,
        base_after,
        change_revision,
        base_after_revision,
        metadata,
    )?;

    // Whichever side's write to the field's own value actually takes effect
    // after the conflict is resolved dictates the rebased changeset's output
    // occupancy — not `ValueReplace::is_empty`, which records *input*
    // occupancy for the replace itself, not the result of applying it.
    let output_empty = match (change.value_replace(), base_after.value_replace()) {
        (None, _) => base_after.context().output_empty,
        (Some(_), None) => change.context().output_empty,
        (Some(_), Some(_)) => {
            match metadata.later_checked(change_revision, base_after_revision)? {
                Some(winner) if winner == change_revision => change.context().output_empty,
                _ => base_after.context().output_empty,
            }
        }
    };
    let context = Context::new(base_after.context().output_empty, output_empty);

    Ok(Changeset::new(moves, child_changes, value_replace, context))
}

fn rebase_moves<C>(
    change: &Changeset<C>,
    base_after: &Changeset<C>,
    change_revision: RevisionTag,
    base_after_revision: RevisionTag,
    metadata: &dyn RevisionMetadataSource,
) -> crate::error::Result<IndexMap<ChangeAtomId, ChangeAtomId>> {
    let mut moves = IndexMap::new();
    for (&src, &dst) in change.moves() {
        match base_after.moves().get(&src) {
            Some(&other_dst) if other_dst != dst => {
                // Both `change` and `base_after` tried to move the same
                // source atom to different destinations: last writer wins.
                if metadata.later_checked(change_revision, base_after_revision)?
                    == Some(change_revision)
                {
                    moves.insert(src, dst);
                }
                // Otherwise `base_after` already won and `change`'s move is
                // dropped; `base_after`'s own move already applies.
            }
            _ => {
                moves.insert(src, dst);
            }
        }
    }
    Ok(moves)
}

fn rebase_child_changes<C, O: ChildChangeOps<C>>(
    change: &Changeset<C>,
    base_before: &Changeset<C>,
    base_after: &Changeset<C>,
    ops: &O,
    metadata: &dyn RevisionMetadataSource,
) -> IndexMap<crate::changeset::Location, C>
where
    C: Clone,
{
    change
        .child_changes()
        .iter()
        .map(|(&location, c)| {
            let before = base_before.child_changes().get(&location);
            let after = base_after.child_changes().get(&location);
            let rebased = match (before, after) {
                (Some(before), Some(after)) => ops.rebase(c, before, after, metadata),
                _ => c.clone(),
            };
            (location, rebased)
        })
        .collect()
}

fn rebase_value_replace<C>(
    change: &Changeset<C>,
    base_after: &Changeset<C>,
    change_revision: RevisionTag,
    base_after_revision: RevisionTag,
    metadata: &dyn RevisionMetadataSource,
) -> crate::error::Result<Option<ValueReplace>> {
    let change_replace = match change.value_replace() {
        Some(replace) => replace,
        None => return Ok(None),
    };
    if base_after.value_replace().is_none() {
        // `base_after` left the value alone; `change`'s edit still applies
        // as originally written.
        return Ok(Some(*change_replace));
    };

    // Both sides touched the field's value: last writer wins, with a
    // rolled-back writer never winning (`RevisionMetadataSource::later_checked`).
    let replace = match metadata.later_checked(change_revision, base_after_revision)? {
        Some(winner) if winner == change_revision => *change_replace,
        _ => {
            // `base_after` won; `change`'s own write is discarded, but its
            // `dst` is retained as a reserve — a fresh identity for whatever
            // `change` would have detached, so a later rebase or compose of
            // `change` against some other base still has a valid id to talk
            // about. `is_empty` now describes the field `change`'s write is
            // landing against, i.e. what `base_after` actually left behind.
            ValueReplace::clear(base_after.context().output_empty, change_replace.dst)
        }
    };
    Ok(Some(replace))
}
