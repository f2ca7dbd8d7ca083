//! Shared test support: an in-memory history store
//!
//! Implements the same upsert-with-history protocol as the PostgreSQL store
//! so pipeline tests can exercise gating and persistence semantics without a
//! live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use strata::adapters::store::{HistoryStore, TableCounts};
use strata::domain::{ProcessedRecord, Result, StoreError};

/// One current-table row
#[derive(Debug, Clone)]
pub struct CurrentRow {
    pub key: String,
    pub record: ProcessedRecord,
    pub insert_ts: DateTime<Utc>,
}

/// One history-table row
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub key: String,
    pub record: ProcessedRecord,
    pub insert_ts: DateTime<Utc>,
    pub change_ts: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    claims: Vec<CurrentRow>,
    claims_history: Vec<HistoryRow>,
    patients: Vec<CurrentRow>,
    patients_history: Vec<HistoryRow>,
}

/// In-memory [`HistoryStore`] implementation
#[derive(Default)]
pub struct MemoryHistoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upsert fail, to test error propagation.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn claims(&self) -> Vec<CurrentRow> {
        self.tables.lock().unwrap().claims.clone()
    }

    pub fn claims_history(&self) -> Vec<HistoryRow> {
        self.tables.lock().unwrap().claims_history.clone()
    }

    pub fn patients(&self) -> Vec<CurrentRow> {
        self.tables.lock().unwrap().patients.clone()
    }

    pub fn patients_history(&self) -> Vec<HistoryRow> {
        self.tables.lock().unwrap().patients_history.clone()
    }

    fn upsert(
        current: &mut Vec<CurrentRow>,
        history: &mut Vec<HistoryRow>,
        key: String,
        record: &ProcessedRecord,
    ) {
        let now = Utc::now();
        // The history row carries the new values with the superseded state's
        // insert_ts; a fresh insert records now for both.
        let history_insert_ts = match current.iter_mut().find(|row| row.key == key) {
            Some(row) => {
                let prior_insert_ts = row.insert_ts;
                row.record = record.clone();
                row.insert_ts = now;
                prior_insert_ts
            }
            None => {
                current.push(CurrentRow {
                    key: key.clone(),
                    record: record.clone(),
                    insert_ts: now,
                });
                now
            }
        };
        history.push(HistoryRow {
            key,
            record: record.clone(),
            insert_ts: history_insert_ts,
            change_ts: now,
        });
    }

    fn check_failure(&self, row: usize) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::TransactionFailed(format!(
                "injected failure at row {row}"
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn upsert_claim(&self, record: &ProcessedRecord, row: usize) -> Result<()> {
        self.check_failure(row)?;
        let key = record
            .text("claim_id")
            .filter(|s| !s.is_empty())
            .ok_or(StoreError::MissingNaturalKey {
                key: "claim_id",
                row,
            })?
            .to_string();
        let mut tables = self.tables.lock().unwrap();
        let Tables {
            claims,
            claims_history,
            ..
        } = &mut *tables;
        Self::upsert(claims, claims_history, key, record);
        Ok(())
    }

    async fn upsert_patient(&self, record: &ProcessedRecord, row: usize) -> Result<()> {
        self.check_failure(row)?;
        let key = record
            .text("patient_id")
            .filter(|s| !s.is_empty())
            .ok_or(StoreError::MissingNaturalKey {
                key: "patient_id",
                row,
            })?
            .to_string();
        let mut tables = self.tables.lock().unwrap();
        let Tables {
            patients,
            patients_history,
            ..
        } = &mut *tables;
        Self::upsert(patients, patients_history, key, record);
        Ok(())
    }

    async fn patient_history_is_empty(&self) -> Result<bool> {
        Ok(self.tables.lock().unwrap().patients_history.is_empty())
    }

    async fn count_matching_patient_ids(&self, ids: &[String]) -> Result<usize> {
        let tables = self.tables.lock().unwrap();
        let matching = ids
            .iter()
            .filter(|id| {
                tables
                    .patients_history
                    .iter()
                    .any(|row| &row.key == *id)
            })
            .count();
        Ok(matching)
    }

    async fn table_counts(&self) -> Result<TableCounts> {
        let tables = self.tables.lock().unwrap();
        Ok(TableCounts {
            claims: tables.claims.len() as u64,
            claims_history: tables.claims_history.len() as u64,
            patients: tables.patients.len() as u64,
            patients_history: tables.patients_history.len() as u64,
        })
    }
}
