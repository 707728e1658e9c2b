//! In-memory implementations of the store traits.
//!
//! Used when `DATABASE_URL` is absent (development mode) and by the API
//! integration tests. Records are keyed per serial in a map behind an
//! `RwLock` — same per-key identity as the Postgres tables, none of the
//! process-global mutable list the original service leaned on.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use updhub_core::ReleaseSnapshot;

use crate::{AuthorizationRecord, AuthorizationStore, LedgerEntry, StoreError, VersionLedger};

/// Map-backed authorization store.
#[derive(Debug, Default)]
pub struct MemoryAuthorizationStore {
    records: RwLock<HashMap<String, AuthorizationRecord>>,
}

impl MemoryAuthorizationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AuthorizationStore for MemoryAuthorizationStore {
    async fn get(&self, serial: &str) -> Result<Option<AuthorizationRecord>, StoreError> {
        Ok(self.records.read().get(serial).cloned())
    }

    async fn upsert(&self, record: &AuthorizationRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .insert(record.serial.clone(), record.clone());
        Ok(())
    }
}

/// Vec-backed append-only ledger. Publication timestamps come from
/// `Utc::now()` at append, matching the Postgres `DEFAULT now()`.
#[derive(Debug, Default)]
pub struct MemoryVersionLedger {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl MemoryVersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait::async_trait]
impl VersionLedger for MemoryVersionLedger {
    async fn latest(&self) -> Result<Option<LedgerEntry>, StoreError> {
        // Max timestamp, insertion order as the tie-break: later index wins.
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .enumerate()
            .max_by_key(|(i, e)| (e.published_at, *i))
            .map(|(_, e)| e.clone()))
    }

    async fn append(&self, snapshot: &ReleaseSnapshot) -> Result<(), StoreError> {
        self.entries.write().push(LedgerEntry {
            snapshot: snapshot.clone(),
            published_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use updhub_core::{ModuleKey, ModuleRelease};

    fn record(serial: &str, fiscal: bool) -> AuthorizationRecord {
        AuthorizationRecord {
            serial: serial.to_string(),
            payroll: false,
            fiscal,
            accounting: false,
            descriptor: None,
        }
    }

    #[tokio::test]
    async fn get_on_unknown_serial_is_none() {
        let store = MemoryAuthorizationStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_is_keyed_per_serial() {
        let store = MemoryAuthorizationStore::new();
        store.upsert(&record("A-1", true)).await.unwrap();
        store.upsert(&record("B-2", false)).await.unwrap();

        assert!(store.get("A-1").await.unwrap().unwrap().fiscal);
        assert!(!store.get("B-2").await.unwrap().unwrap().fiscal);
    }

    #[tokio::test]
    async fn upsert_replaces_latest_write_wins() {
        let store = MemoryAuthorizationStore::new();
        store.upsert(&record("A-1", true)).await.unwrap();
        store.upsert(&record("A-1", false)).await.unwrap();

        let got = store.get("A-1").await.unwrap().unwrap();
        assert!(!got.fiscal);
    }

    #[tokio::test]
    async fn empty_ledger_has_no_latest() {
        let ledger = MemoryVersionLedger::new();
        assert!(ledger.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn append_never_mutates_earlier_entries() {
        let ledger = MemoryVersionLedger::new();

        let mut first = ReleaseSnapshot::empty();
        first.set(
            ModuleKey::Payroll,
            Some(ModuleRelease::new("v1", "folha.v1.zip")),
        );
        ledger.append(&first).await.unwrap();

        let mut second = first.clone();
        second.set(
            ModuleKey::Payroll,
            Some(ModuleRelease::new("v2", "folha.v2.zip")),
        );
        ledger.append(&second).await.unwrap();

        assert_eq!(ledger.len(), 2);
        let latest = ledger.latest().await.unwrap().unwrap();
        assert_eq!(latest.snapshot, second);
    }

    #[tokio::test]
    async fn identical_timestamps_break_ties_by_insertion_order() {
        // Timestamps at Utc::now() resolution can collide on fast appends;
        // the most recently inserted entry must still win.
        let ledger = MemoryVersionLedger::new();
        for version in ["v1", "v2", "v3"] {
            let mut snap = ReleaseSnapshot::empty();
            snap.set(
                ModuleKey::Fiscal,
                Some(ModuleRelease::new(version, format!("fiscal.{version}.zip"))),
            );
            ledger.append(&snap).await.unwrap();
        }

        let latest = ledger.latest().await.unwrap().unwrap();
        assert_eq!(latest.snapshot.fiscal.unwrap().version, "v3");
    }
}
