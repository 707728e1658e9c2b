//! # Publish Reconciliation
//!
//! A publish request may touch any subset of the three modules, but the
//! version ledger stores whole-row snapshots. Reconciliation merges the
//! requested changes with the latest ledger snapshot so untouched modules
//! keep their last published values, producing the full post-merge state
//! that the caller appends as one new ledger entry.
//!
//! The merge is field-level and must run *before* the append — appending a
//! partial row directly would silently revert unrelated modules to null.

use std::collections::BTreeMap;

use crate::module::{ModuleKey, ModuleRelease, ReleaseSnapshot};

/// Merge a partial publish into the prior ledger snapshot.
///
/// Per module: the update wins if present; otherwise the prior value is
/// carried forward; with neither, the slot stays `None` (first-ever publish
/// with partial modules leaves the rest unpublished).
///
/// Pure and deterministic: identical inputs always produce identical
/// output, and updates with disjoint key sets compose associatively.
pub fn reconcile(
    prior: Option<&ReleaseSnapshot>,
    updates: &BTreeMap<ModuleKey, ModuleRelease>,
) -> ReleaseSnapshot {
    let mut merged = ReleaseSnapshot::empty();
    for key in ModuleKey::ALL {
        let release = updates
            .get(&key)
            .cloned()
            .or_else(|| prior.and_then(|p| p.get(key).cloned()));
        merged.set(key, release);
    }
    merged
}
