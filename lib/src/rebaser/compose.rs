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

//! `compose`: folds two sequential changesets, `first` then `second`, into
//! the single changeset that has the same effect as applying both.

use indexmap::IndexMap;
use tracing::instrument;

use crate::changeset::{Changeset, Context, ReplaceSource, ValueReplace};
use crate::child::ChildChangeOps;
use crate::ids::ChangeAtomId;

/// Composes `first` and `second`, in that order: `first ∘ second`.
///
/// Panics in debug builds if `first`'s output context and `second`'s input
/// context disagree — composing changesets that were not built to follow
/// one another is a caller bug, not a recoverable condition.
#[instrument(skip_all, fields(moves = first.moves().len() + second.moves().len()))]
pub fn compose<C, O: ChildChangeOps<C>>(
    first: &Changeset<C>,
    second: &Changeset<C>,
    ops: &O,
) -> Changeset<C>
where
    C: Clone,
{
    debug_assert_eq!(
        first.context().output_empty,
        second.context().input_empty,
        "composing changesets whose contexts don't chain",
    );

    let mut moves = compose_moves(first, second);
    let child_changes = compose_child_changes(first, second, ops);
    let (value_replace, evicted) = compose_value_replace(first, second);
    if let Some((from, to)) = evicted {
        moves.insert(from, to);
    }
    let context = Context::new(first.context().input_empty, second.context().output_empty);

    Changeset::new(moves, child_changes, value_replace, context)
}

fn compose_moves<C>(
    first: &Changeset<C>,
    second: &Changeset<C>,
) -> IndexMap<ChangeAtomId, ChangeAtomId> {
    let mut moves = first.moves().clone();
    for (&src, &dst) in second.moves() {
        // If `first` already landed something at `src`, fold the two hops
        // into a single move from the original source straight to `dst`
        // rather than keeping the intermediate landing site around (the
        // "id Y"/"id X" case in the compose table, see `SPEC_FULL.md` §C.5).
        let chained_from = first
            .moves()
            .iter()
            .find(|&(_, &mid)| mid == src)
            .map(|(&orig_src, _)| orig_src);
        match chained_from {
            Some(orig_src) => {
                moves.shift_remove(&orig_src);
                moves.insert(orig_src, dst);
            }
            None => {
                moves.insert(src, dst);
            }
        }
    }
    moves
}

fn compose_child_changes<C, O: ChildChangeOps<C>>(
    first: &Changeset<C>,
    second: &Changeset<C>,
    ops: &O,
) -> IndexMap<crate::changeset::Location, C>
where
    C: Clone,
{
    let mut child_changes = first.child_changes().clone();
    for (location, second_change) in second.child_changes() {
        let composed = match child_changes.get(location) {
            Some(first_change) => ops.compose(first_change, second_change),
            None => second_change.clone(),
        };
        child_changes.insert(*location, composed);
    }
    child_changes
}

/// Merges `first`'s and `second`'s value replaces, plus any move the pair
/// implies but neither changeset states outright: when `first` attached a
/// concrete node and `second` moves on to do something else with the field,
/// the node `first` attached is evicted, and a move recording where it went
/// (`second`'s own `dst`) needs to exist or that node's subsequent history
/// becomes unreachable. Returns that derived move alongside the composed
/// replace, since whoever merges moves and replaces needs both.
fn compose_value_replace<C>(
    first: &Changeset<C>,
    second: &Changeset<C>,
) -> (Option<ValueReplace>, Option<(ChangeAtomId, ChangeAtomId)>) {
    match (first.value_replace(), second.value_replace()) {
        (None, None) => (None, None),
        (Some(f), None) => (Some(*f), None),
        (None, Some(s)) => (Some(*s), None),
        (Some(f), Some(s)) => {
            // `second` re-attaches exactly what `first` just detached: the
            // pair has no net effect on the field's value at all.
            if s.src == Some(ReplaceSource::Atom(f.dst)) {
                return (None, None);
            }
            // `second` pins the field: content doesn't change, `first`'s
            // source carries forward untouched and nothing is evicted.
            if s.src == Some(ReplaceSource::FromSelf) {
                return (Some(ValueReplace::new(f.is_empty, s.dst, f.src)), None);
            }
            // Any other `second` genuinely changes the field's content, so
            // whatever `first` put there (or merely pinned) is evicted.
            // That occupant's own identity — `Y` if `first` attached it,
            // `first.dst` if `first` only pinned it — needs an alias to
            // `second.dst` or it becomes unreachable through the composed
            // changeset.
            let occupant = match f.src {
                Some(ReplaceSource::Atom(y)) => Some(y),
                Some(ReplaceSource::FromSelf) => Some(f.dst),
                None => None,
            };
            let evicted = occupant.filter(|&o| o != s.dst).map(|o| (o, s.dst));
            let src = match s.src {
                Some(atom @ ReplaceSource::Atom(_)) => Some(atom),
                None => None,
                Some(ReplaceSource::FromSelf) => unreachable!("handled above"),
            };
            let replace = ValueReplace::new(f.is_empty, s.dst, src);
            (Some(replace), evicted)
        }
    }
}
