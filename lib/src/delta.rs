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

//! Projects a [`Changeset`] into a flat description an external consumer
//! (a renderer, an index updater, anything that does not itself speak the
//! changeset algebra) can act on without understanding moves, revisions, or
//! opaque child-change payloads.

use serde::{Deserialize, Serialize};

use crate::changeset::{Changeset, Location, ReplaceSource};
use crate::child::ChildChangeOps;
use crate::ids::ChangeAtomId;

/// A single effect on the field, in application order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "D: Serialize",
    deserialize = "D: Deserialize<'de>"
))]
pub enum Mark<D> {
    /// The field's occupant, if any, is untouched.
    Keep,
    /// The field's prior occupant leaves, without a replacement. Consumers
    /// already hold whatever was attached; a detach needs no id to act on.
    Detach,
    /// A node is attached into the field.
    Attach { id: ChangeAtomId },
    /// The field's prior occupant (`detach`) leaves and `attach` takes its
    /// place.
    Replace {
        attach: ChangeAtomId,
        detach: ChangeAtomId,
    },
    /// A nested edit to the node presently occupying the field.
    Nested(D),
}

/// A nested edit to a node that is not (or no longer) the field's occupant,
/// e.g. one detached earlier in the same changeset. Consumers that only
/// care about the field's visible contents can ignore `global` entirely;
/// ones that track detached subtrees (an undo buffer, a recycle bin) use it
/// to keep following those nodes' edits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "D: Serialize",
    deserialize = "D: Deserialize<'de>"
))]
pub struct GlobalEdit<D> {
    pub id: ChangeAtomId,
    pub delta: D,
}

/// The flattened projection of a [`Changeset`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "D: Serialize",
    deserialize = "D: Deserialize<'de>"
))]
pub struct FieldDelta<D> {
    pub local: Vec<Mark<D>>,
    pub global: Vec<GlobalEdit<D>>,
}

impl<D> FieldDelta<D> {
    pub fn is_empty(&self) -> bool {
        self.local.iter().all(|mark| matches!(mark, Mark::Keep)) && self.global.is_empty()
    }
}

/// Projects `changeset` into a [`FieldDelta`], using `ops` to flatten any
/// opaque nested edit it carries.
pub fn into_delta<C, O: ChildChangeOps<C>>(
    changeset: &Changeset<C>,
    ops: &O,
) -> FieldDelta<O::Delta> {
    let field_change = changeset.child_changes().get(&Location::Field);
    let as_nested_or_keep = || match field_change {
        Some(change) => vec![Mark::Nested(ops.to_delta(change))],
        None => vec![Mark::Keep],
    };

    // `spec.md` §5's projection table, keyed on `(replace.src, replace.is_empty)`:
    // a replace with no source and `is_empty` just reserves a fresh identity
    // for a detach that hasn't actually happened yet, and one that names its
    // own field as source merely pins the occupant — neither is visible.
    let local = match changeset.value_replace() {
        None => as_nested_or_keep(),
        Some(replace) => match (&replace.src, replace.is_empty) {
            (None, true) => vec![],
            (None, false) => vec![Mark::Detach],
            (Some(ReplaceSource::FromSelf), false) => as_nested_or_keep(),
            (Some(ReplaceSource::FromSelf), true) => vec![],
            (Some(ReplaceSource::Atom(src)), true) => vec![Mark::Attach { id: *src }],
            (Some(ReplaceSource::Atom(src)), false) => vec![Mark::Replace {
                attach: *src,
                detach: replace.dst,
            }],
        },
    };

    let global = changeset
        .child_changes()
        .iter()
        .filter_map(|(location, change)| match location {
            Location::Field => None,
            Location::Atom(id) => Some(GlobalEdit {
                id: *id,
                delta: ops.to_delta(change),
            }),
        })
        .collect();

    FieldDelta { local, global }
}

/// The ids of every detached root this changeset's delta depends on: the
/// `Location::Atom` keys of its nested edits (the same roots `into_delta`'s
/// `global` entries name), the atom a value replace restores into the
/// field, if any, and — via `ops`, the `fromChild` delegate `spec.md` §6's
/// `relevantRemovedRoots(C, fromChild)` calls for — whatever roots each
/// nested edit reports for itself. That last part applies to every nested
/// edit regardless of location, including ones keyed `Location::Field`: a
/// change to the field's own occupant can still depend on detached content
/// buried inside it (`spec.md` §8, scenario S6). A host forest uses this to
/// page in detached content before applying the delta, without having to
/// flatten every nested change first.
pub fn relevant_removed_roots<'a, C, O: ChildChangeOps<C>>(
    changeset: &'a Changeset<C>,
    ops: &O,
) -> impl Iterator<Item = ChangeAtomId> + 'a {
    let from_child_changes = changeset.child_changes().keys().filter_map(|location| match location {
        Location::Field => None,
        Location::Atom(id) => Some(*id),
    });
    let from_value_replace = changeset
        .value_replace()
        .and_then(|replace| match replace.src {
            Some(ReplaceSource::Atom(id)) => Some(id),
            _ => None,
        })
        .into_iter();
    let from_children = changeset
        .child_changes()
        .values()
        .flat_map(|change| ops.relevant_removed_roots(change))
        .collect::<Vec<_>>()
        .into_iter();
    from_child_changes.chain(from_value_replace).chain(from_children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::{Context, ValueReplace};
    use crate::ids::{IdAllocator, RevisionTag};
    use crate::revision_metadata::RevisionMetadataSource;

    struct IntOps;

    impl ChildChangeOps<i32> for IntOps {
        type Delta = i32;

        fn compose(&self, _first: &i32, second: &i32) -> i32 {
            *second
        }

        fn invert(&self, change: &i32, _is_rollback: bool) -> i32 {
            -*change
        }

        fn rebase(
            &self,
            change: &i32,
            _base_before: &i32,
            _base_after: &i32,
            _metadata: &dyn RevisionMetadataSource,
        ) -> i32 {
            *change
        }

        fn to_delta(&self, change: &i32) -> i32 {
            *change
        }

        fn is_empty(&self, change: &i32) -> bool {
            *change == 0
        }

        fn replace_revisions(
            &self,
            change: &i32,
            _old_set: &std::collections::HashSet<Option<RevisionTag>>,
            _new_revision: RevisionTag,
        ) -> i32 {
            *change
        }

        fn relevant_removed_roots(&self, _change: &i32) -> Vec<ChangeAtomId> {
            Vec::new()
        }
    }

    #[test]
    fn untouched_field_projects_to_keep() {
        let changeset: Changeset<i32> = Changeset::empty(Context::new(true, true));
        let delta = into_delta(&changeset, &IntOps);
        assert!(delta.is_empty());
        assert!(matches!(delta.local.as_slice(), [Mark::Keep]));
    }

    #[test]
    fn set_into_an_empty_field_projects_to_an_attach() {
        let fill = ChangeAtomId::elided(crate::ids::LocalId::from_raw(0));
        let detach = ChangeAtomId::elided(crate::ids::LocalId::from_raw(1));
        let changeset: Changeset<i32> = crate::editor::set(true, fill, detach);
        let delta = into_delta(&changeset, &IntOps);
        assert!(matches!(delta.local.as_slice(), [Mark::Attach { id } ] if *id == fill));
    }

    #[test]
    fn set_into_an_occupied_field_projects_to_a_replace() {
        let fill = ChangeAtomId::elided(crate::ids::LocalId::from_raw(0));
        let detach = ChangeAtomId::elided(crate::ids::LocalId::from_raw(1));
        let changeset: Changeset<i32> = crate::editor::set(false, fill, detach);
        let delta = into_delta(&changeset, &IntOps);
        assert!(matches!(
            delta.local.as_slice(),
            [Mark::Replace { attach, detach: d }] if *attach == fill && *d == detach
        ));
    }

    #[test]
    fn clear_projects_to_a_detach() {
        let occupant = ChangeAtomId::elided(crate::ids::LocalId::from_raw(0));
        let changeset: Changeset<i32> = crate::editor::clear(false, occupant);
        let delta = into_delta(&changeset, &IntOps);
        assert!(matches!(delta.local.as_slice(), [Mark::Detach]));
    }

    #[test]
    fn reserved_detach_on_an_already_empty_field_projects_to_nothing() {
        let occupant = ChangeAtomId::elided(crate::ids::LocalId::from_raw(0));
        let changeset: Changeset<i32> = crate::editor::clear(true, occupant);
        let delta = into_delta(&changeset, &IntOps);
        assert!(delta.local.is_empty());
    }

    #[test]
    fn detached_node_with_nested_edit_is_a_relevant_removed_root() {
        let mut alloc = IdAllocator::new();
        let detached = crate::ids::ChangeAtomId::elided(alloc.alloc());
        let mut child_changes = indexmap::IndexMap::new();
        child_changes.insert(Location::Atom(detached), 5);
        let replace_dst = crate::ids::ChangeAtomId::elided(alloc.alloc());
        let changeset: Changeset<i32> = Changeset::new(
            indexmap::IndexMap::new(),
            child_changes,
            Some(ValueReplace::clear(false, replace_dst)),
            Context::new(false, true),
        );
        let roots: Vec<_> = relevant_removed_roots(&changeset, &IntOps).collect();
        assert_eq!(roots, vec![detached]);
    }

    /// Two detached roots named by distinct nested edits: `spec.md` §3 only
    /// promises `child_changes` is a set keyed by location, not an order, so
    /// compare the roots this yields as a set rather than pinning iteration
    /// order.
    #[test]
    fn multiple_detached_roots_are_all_relevant_removed_roots() {
        let mut alloc = IdAllocator::new();
        let first = crate::ids::ChangeAtomId::elided(alloc.alloc());
        let second = crate::ids::ChangeAtomId::elided(alloc.alloc());
        let mut child_changes = indexmap::IndexMap::new();
        child_changes.insert(Location::Atom(first), 1);
        child_changes.insert(Location::Atom(second), 2);
        let changeset: Changeset<i32> = Changeset::new(
            indexmap::IndexMap::new(),
            child_changes,
            None,
            Context::new(false, false),
        );
        let roots: std::collections::HashSet<_> = relevant_removed_roots(&changeset, &IntOps).collect();
        assert_eq!(roots, maplit::hashset! {first, second});
    }

    #[test]
    fn restoring_value_replace_names_its_source_as_a_relevant_removed_root() {
        let mut alloc = IdAllocator::new();
        let restored = crate::ids::ChangeAtomId::elided(alloc.alloc());
        let fresh = crate::ids::ChangeAtomId::elided(alloc.alloc());
        let replace = ValueReplace::attach(false, fresh, ReplaceSource::Atom(restored));
        let changeset: Changeset<i32> = Changeset::new(
            indexmap::IndexMap::new(),
            indexmap::IndexMap::new(),
            Some(replace),
            Context::new(true, false),
        );
        let roots: Vec<_> = relevant_removed_roots(&changeset, &IntOps).collect();
        assert_eq!(roots, vec![restored]);
    }

    /// `spec.md` §8 scenario S6's second half: a child change keyed
    /// `Location::Field` — the shape `buildChildChange` always produces —
    /// still surfaces whatever its own nested edit depends on, via the
    /// `fromChild` delegate, even though the field itself names no detached
    /// root of its own.
    #[test]
    fn child_change_on_the_field_itself_surfaces_whatever_its_delegate_reports() {
        struct RecursingOps(ChangeAtomId);

        impl ChildChangeOps<i32> for RecursingOps {
            type Delta = i32;

            fn compose(&self, _first: &i32, second: &i32) -> i32 {
                *second
            }

            fn invert(&self, change: &i32, _is_rollback: bool) -> i32 {
                -*change
            }

            fn rebase(
                &self,
                change: &i32,
                _base_before: &i32,
                _base_after: &i32,
                _metadata: &dyn RevisionMetadataSource,
            ) -> i32 {
                *change
            }

            fn to_delta(&self, change: &i32) -> i32 {
                *change
            }

            fn is_empty(&self, change: &i32) -> bool {
                *change == 0
            }

            fn replace_revisions(
                &self,
                change: &i32,
                _old_set: &std::collections::HashSet<Option<RevisionTag>>,
                _new_revision: RevisionTag,
            ) -> i32 {
                *change
            }

            fn relevant_removed_roots(&self, _change: &i32) -> Vec<ChangeAtomId> {
                vec![self.0]
            }
        }

        let nested_root = crate::ids::ChangeAtomId::elided(crate::ids::LocalId::from_raw(9));
        let changeset: Changeset<i32> = crate::editor::build_child_change(3, true);
        let roots: Vec<_> = relevant_removed_roots(&changeset, &RecursingOps(nested_root)).collect();
        assert_eq!(roots, vec![nested_root]);
    }

    /// `spec.md` §6 promises only that `intoDelta ∘ replaceRevisions`
    /// round-trips through a caller's own codec; exercising that through
    /// `serde_json` (rather than just `PartialEq` on the in-memory value)
    /// is what actually proves a `FieldDelta` is fit to hand to one.
    #[test]
    fn field_delta_round_trips_through_json() {
        let fill = ChangeAtomId::elided(crate::ids::LocalId::from_raw(0));
        let detach = ChangeAtomId::elided(crate::ids::LocalId::from_raw(1));
        let changeset: Changeset<i32> = crate::editor::set(true, fill, detach);
        let delta = into_delta(&changeset, &IntOps);

        let json = serde_json::to_string(&delta).expect("FieldDelta must serialize");
        let round_tripped: FieldDelta<i32> =
            serde_json::from_str(&json).expect("FieldDelta must deserialize");

        assert!(matches!(
            round_tripped.local.as_slice(),
            [Mark::Attach { id }] if *id == fill
        ));
        assert!(round_tripped.global.is_empty());
    }
}
