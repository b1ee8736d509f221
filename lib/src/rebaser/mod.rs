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

//! The changeset algebra: `compose`, `invert`, `rebase`, and the two small
//! supporting operations (`replace_revisions`, `is_empty`) the rest of the
//! crate is built around.

mod compose;
mod invert;
mod rebase;
mod replace_revisions;

pub use compose::compose;
pub use invert::invert;
pub use rebase::rebase;
pub use replace_revisions::replace_revisions;

#[cfg(test)]
mod algebra_laws {
    //! Property-based checks of the algebraic laws the rest of the crate's
    //! unit tests only exercise on hand-picked examples: identity,
    //! associativity, and the last-writer-wins tie-break, generated over
    //! [`testutils::TestChild`] via `proptest`.

    use indexmap::IndexMap;
    use proptest::prelude::*;
    use test_case::test_case;
    use testutils::{proptest_support, FailingCrossFieldManager, RankedRevisions, TestChild, TestChildOps};

    use crate::changeset::{Changeset, Context, Location};
    use crate::ids::RevisionTag;

    fn changeset_with_child(payload: i64, revision: RevisionTag) -> Changeset<TestChild> {
        let mut child_changes = IndexMap::new();
        child_changes.insert(Location::Field, TestChild::new(payload, revision));
        Changeset::new(IndexMap::new(), child_changes, None, Context::new(true, true))
    }

    proptest! {
        #[test]
        fn compose_with_empty_on_either_side_is_identity(payload in any::<i64>(), revision in proptest_support::small_revision_tag()) {
            let change = changeset_with_child(payload, revision);
            let empty = Changeset::empty(Context::new(true, true));

            let left_identity = super::compose(&empty, &change, &TestChildOps);
            let right_identity = super::compose(&change, &empty, &TestChildOps);

            prop_assert_eq!(left_identity.child_changes().get(&Location::Field), Some(&TestChild::new(payload, revision)));
            prop_assert_eq!(right_identity.child_changes().get(&Location::Field), Some(&TestChild::new(payload, revision)));
        }

        #[test]
        fn compose_is_associative_over_child_changes(
            a in any::<i64>(), b in any::<i64>(), c in any::<i64>(),
            revision in proptest_support::small_revision_tag(),
        ) {
            let x = changeset_with_child(a, revision);
            let y = changeset_with_child(b, revision);
            let z = changeset_with_child(c, revision);

            let left = super::compose(&super::compose(&x, &y, &TestChildOps), &z, &TestChildOps);
            let right = super::compose(&x, &super::compose(&y, &z, &TestChildOps), &TestChildOps);

            prop_assert_eq!(
                left.child_changes().get(&Location::Field),
                right.child_changes().get(&Location::Field),
            );
        }

        #[test]
        fn later_revision_always_wins_rebase(
            payload_a in any::<i64>(), payload_b in any::<i64>(),
        ) {
            let older = RevisionTag::from_raw(0);
            let newer = RevisionTag::from_raw(1);
            let ranking = RankedRevisions::new(vec![older, newer]);

            let change = changeset_with_child(payload_a, newer);
            let base_before = Changeset::empty(Context::new(true, true));
            let base_after = changeset_with_child(payload_b, older);

            let mut cross_field = FailingCrossFieldManager;
            let rebased = super::rebase(
                &change,
                newer,
                &base_before,
                &base_after,
                older,
                &TestChildOps,
                &ranking,
                &mut cross_field,
            )
            .unwrap();

            prop_assert_eq!(
                rebased.child_changes().get(&Location::Field),
                Some(&TestChild::new(payload_a, newer)),
            );
        }
    }

    #[test_case(0, 0 ; "both zero")]
    #[test_case(5, 0 ; "left non-zero")]
    #[test_case(0, 5 ; "right non-zero")]
    fn compose_then_invert_roundtrips_an_empty_child_to_itself(a: i64, b: i64) {
        let revision = RevisionTag::from_raw(0);
        let change = changeset_with_child(a + b, revision);
        let mut alloc = crate::ids::IdAllocator::new();
        let inverse = super::invert(&change, true, &TestChildOps, &mut alloc);
        let composed = super::compose(&change, &inverse, &TestChildOps);
        let back = composed.child_changes().get(&Location::Field).unwrap();
        assert_eq!(back.payload, -(a + b));
    }
}
