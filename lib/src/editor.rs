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

//! Small named constructors for the common single-edit changesets, mirroring
//! the way `jj_lib::op_store::RefTarget` exposes `absent`/`normal`/`resolved`
//! over its underlying `Merge` rather than making every caller assemble one
//! by hand.

use indexmap::IndexMap;
use tracing::instrument;

use crate::changeset::{Changeset, Context, Location, ReplaceSource, ValueReplace};
use crate::ids::ChangeAtomId;

/// Builds a changeset that attaches `fill` into the field, detaching
/// whatever was there before under the name `detach`. The caller mints both
/// ids (typically `detach` fresh, `fill` the id of a node being moved in)
/// before calling — this crate never allocates ids on a caller's behalf.
/// `was_empty` records whether the field was empty when this edit was
/// built, so a later `rebase` can tell whether it still applies.
#[instrument(skip_all)]
pub fn set<C>(was_empty: bool, fill: ChangeAtomId, detach: ChangeAtomId) -> Changeset<C> {
    let replace = ValueReplace::attach(was_empty, detach, ReplaceSource::Atom(fill));
    Changeset::new(IndexMap::new(), IndexMap::new(), Some(replace), Context::new(was_empty, false))
}

/// Builds a changeset that empties a field, detaching whatever was there
/// under the name `detach`. Naming the detached node explicitly is what
/// lets this edit's inverse restore it — see `rebaser/invert.rs`.
#[instrument(skip_all)]
pub fn clear<C>(was_empty: bool, detach: ChangeAtomId) -> Changeset<C> {
    let replace = ValueReplace::clear(was_empty, detach);
    Changeset::new(IndexMap::new(), IndexMap::new(), Some(replace), Context::new(was_empty, true))
}

/// Builds a changeset that edits the node currently occupying the field,
/// without changing whether the field is occupied.
#[instrument(skip(change))]
pub fn build_child_change<C>(change: C, field_occupied: bool) -> Changeset<C> {
    let mut child_changes = IndexMap::new();
    child_changes.insert(Location::Field, change);
    Changeset::new(
        IndexMap::new(),
        child_changes,
        None,
        Context::new(field_occupied, field_occupied),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_attaches_a_new_node_into_an_empty_field() {
        let fill = ChangeAtomId::elided(crate::ids::LocalId::from_raw(0));
        let detach = ChangeAtomId::elided(crate::ids::LocalId::from_raw(1));
        let changeset: Changeset<()> = set(true, fill, detach);
        assert!(!changeset.is_empty());
        assert_eq!(changeset.context(), Context::new(true, false));
        let replace = changeset.value_replace().unwrap();
        assert!(replace.is_empty);
        assert_eq!(replace.src, Some(ReplaceSource::Atom(fill)));
    }

    #[test]
    fn clear_empties_an_occupied_field() {
        let occupant = ChangeAtomId::elided(crate::ids::LocalId::from_raw(0));
        let changeset: Changeset<()> = clear(false, occupant);
        assert_eq!(changeset.context(), Context::new(false, true));
        let replace = changeset.value_replace().unwrap();
        assert!(!replace.is_empty);
        assert_eq!(replace.dst, occupant);
        assert_eq!(replace.src, None);
    }

    #[test]
    fn build_child_change_does_not_touch_occupancy() {
        let changeset = build_child_change(7_i32, true);
        assert_eq!(changeset.context(), Context::new(true, true));
        assert_eq!(changeset.child_changes().get(&Location::Field), Some(&7));
    }
}
