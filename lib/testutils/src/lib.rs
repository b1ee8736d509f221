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

//! Shared fixtures for exercising the rebase core: a minimal opaque
//! child-change type, a cross-field manager that fails on any call (per the
//! design note that such a double is a legitimate test of "this code path
//! never actually needs cross-field coordination"), and a revision
//! metadata source backed by an explicit total order.

use std::collections::HashSet;

use itertools::Itertools;
use once_cell::sync::Lazy;
use optional_field_rebase::child::ChildChangeOps;
use optional_field_rebase::cross_field::{CrossFieldKey, CrossFieldManager};
use optional_field_rebase::ids::{ChangeAtomId, LocalId};
use optional_field_rebase::revision_metadata::RevisionMetadataSource;
use optional_field_rebase::RevisionTag;

/// A single step a property test may apply to a [`TestChild`], derived via
/// `proptest_derive` the way `testutils`'s own working-copy state machine
/// derives its transition enum.
#[derive(Debug, Clone, proptest_derive::Arbitrary)]
pub enum ChildOp {
    SetPayload(i64),
    Negate,
}

impl ChildOp {
    pub fn apply(&self, child: TestChild) -> TestChild {
        match self {
            ChildOp::SetPayload(payload) => TestChild::new(*payload, child.revision),
            ChildOp::Negate => TestChild::new(-child.payload, child.revision),
        }
    }
}

/// Builds the move chain `locals[0] -> locals[1] -> ... -> locals[n-1]`.
pub fn chained_moves(locals: &[u64]) -> Vec<(ChangeAtomId, ChangeAtomId)> {
    locals
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| {
            (
                ChangeAtomId::elided(LocalId::from_raw(a)),
                ChangeAtomId::elided(LocalId::from_raw(b)),
            )
        })
        .collect()
}

/// A minimal opaque child-change payload: a replaceable integer, merged
/// last-writer-wins by the revision it was stamped with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestChild {
    pub payload: i64,
    pub revision: RevisionTag,
}

impl TestChild {
    pub fn new(payload: i64, revision: RevisionTag) -> Self {
        Self { payload, revision }
    }
}

/// The [`ChildChangeOps`] implementation for [`TestChild`].
pub struct TestChildOps;

impl ChildChangeOps<TestChild> for TestChildOps {
    type Delta = i64;

    fn compose(&self, _first: &TestChild, second: &TestChild) -> TestChild {
        *second
    }

    fn invert(&self, change: &TestChild, _is_rollback: bool) -> TestChild {
        TestChild::new(-change.payload, change.revision)
    }

    fn rebase(
        &self,
        change: &TestChild,
        _base_before: &TestChild,
        base_after: &TestChild,
        metadata: &dyn RevisionMetadataSource,
    ) -> TestChild {
        match metadata.later(change.revision, base_after.revision) {
            Some(winner) if winner == change.revision => *change,
            _ => *base_after,
        }
    }

    fn to_delta(&self, change: &TestChild) -> i64 {
        change.payload
    }

    fn is_empty(&self, change: &TestChild) -> bool {
        change.payload == 0
    }

    fn replace_revisions(
        &self,
        change: &TestChild,
        old_set: &HashSet<Option<RevisionTag>>,
        new_revision: RevisionTag,
    ) -> TestChild {
        if old_set.contains(&Some(change.revision)) {
            TestChild::new(change.payload, new_revision)
        } else {
            *change
        }
    }

    fn relevant_removed_roots(&self, _change: &TestChild) -> Vec<ChangeAtomId> {
        Vec::new()
    }
}

/// A [`CrossFieldManager`] that panics on any call. Useful for asserting a
/// code path never actually needs cross-field coordination.
#[derive(Default)]
pub struct FailingCrossFieldManager;

impl CrossFieldManager for FailingCrossFieldManager {
    fn get(&self, key: CrossFieldKey) -> Option<ChangeAtomId> {
        panic!("unexpected cross-field get({key:?})");
    }

    fn set(&mut self, key: CrossFieldKey, value: ChangeAtomId) {
        panic!("unexpected cross-field set({key:?}, {value:?})");
    }

    fn on_move_in(&mut self, key: CrossFieldKey, attached_as: ChangeAtomId) {
        panic!("unexpected cross-field on_move_in({key:?}, {attached_as:?})");
    }

    fn move_key(&mut self, old: CrossFieldKey, new: CrossFieldKey) {
        panic!("unexpected cross-field move_key({old:?}, {new:?})");
    }
}

/// A [`RevisionMetadataSource`] over an explicit total order fixed at
/// construction, with an explicit set of rolled-back revisions.
#[derive(Default)]
pub struct RankedRevisions {
    order: Vec<RevisionTag>,
    rolled_back: HashSet<RevisionTag>,
}

impl RankedRevisions {
    /// `order` lists revisions from earliest to latest.
    pub fn new(order: Vec<RevisionTag>) -> Self {
        Self {
            order,
            rolled_back: HashSet::new(),
        }
    }

    pub fn mark_rolled_back(&mut self, revision: RevisionTag) {
        self.rolled_back.insert(revision);
    }
}

/// A fixed, shared order of sixteen revisions, cheap to hand to any test
/// that just needs *some* total order and doesn't care which, mirroring
/// `jj_lib::op_store::RefTarget::absent_ref`'s use of a `LazyLock` static
/// for a value that's expensive-ish to build and never mutated.
pub static DEFAULT_REVISION_ORDER: Lazy<Vec<RevisionTag>> =
    Lazy::new(|| (0..16).map(RevisionTag::from_raw).collect());

impl RevisionMetadataSource for RankedRevisions {
    fn rank(&self, revision: RevisionTag) -> Option<u64> {
        self.order
            .iter()
            .position(|&candidate| candidate == revision)
            .map(|index| index as u64)
    }

    fn is_rolled_back(&self, revision: RevisionTag) -> bool {
        self.rolled_back.contains(&revision)
    }
}

/// Deterministically derives a [`RevisionTag`] from `seed`, the way
/// `testutils::create_random_commit` seeds its own ids, for tests that want
/// reproducible-but-varied revisions without going through `proptest`.
pub fn deterministic_revision_tag(seed: u64) -> RevisionTag {
    use rand::{Rng, SeedableRng};
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
    RevisionTag::from_raw(rng.gen())
}

pub mod proptest_support {
    //! `proptest` strategies for generating changeset fixtures.

    use proptest::prelude::*;

    use super::TestChild;
    use optional_field_rebase::RevisionTag;

    /// Generates arbitrary [`TestChild`] values, independent of any
    /// particular revision ordering.
    pub fn test_child() -> impl Strategy<Value = TestChild> {
        (any::<i64>(), any::<u64>())
            .prop_map(|(payload, revision)| TestChild::new(payload, RevisionTag::from_raw(revision)))
    }

    /// Generates a revision tag from a small, deliberately collision-prone
    /// range, so property tests exercise both distinct-revision and
    /// same-revision code paths.
    pub fn small_revision_tag() -> impl Strategy<Value = RevisionTag> {
        (0_u64..8).prop_map(RevisionTag::from_raw)
    }
}
