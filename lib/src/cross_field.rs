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

//! The narrow hook through which moves that cross field boundaries are
//! coordinated. This field's algebra never reaches into another field's
//! state directly; it only ever goes through a [`CrossFieldManager`] the
//! caller supplies, which owns whatever inter-field bookkeeping its host
//! application needs.

use crate::ids::ChangeAtomId;

/// A key a [`CrossFieldManager`] uses to correlate the two ends of a move
/// that crosses a field boundary: the atom id a detach or attach refers to.
pub type CrossFieldKey = ChangeAtomId;

/// Coordinates moves that attach or detach a node from outside this field.
/// Implementations are supplied by the host application; this crate ships
/// no production implementation, only a fail-on-any-call test double in
/// `testutils` (see `SPEC_FULL.md` §D).
pub trait CrossFieldManager {
    /// Looks up whatever the host has recorded for `key` so far.
    fn get(&self, key: CrossFieldKey) -> Option<ChangeAtomId>;

    /// Records that `key` now resolves to `value`.
    fn set(&mut self, key: CrossFieldKey, value: ChangeAtomId);

    /// Notifies the manager that a node named by `key` has just been
    /// attached into this field, so it can update whatever bookkeeping it
    /// keeps about the node's other end.
    fn on_move_in(&mut self, key: CrossFieldKey, attached_as: ChangeAtomId);

    /// Re-keys an existing entry, used when [`crate::changeset::Changeset`]
    /// atoms are re-tagged by `replace_revisions`.
    fn move_key(&mut self, old: CrossFieldKey, new: CrossFieldKey);
}
