//! History store abstraction
//!
//! This module defines the trait a persistence backend must implement for
//! the upsert-with-history protocol, keeping the ingest pipeline independent
//! of the concrete database client.

use crate::domain::{ProcessedRecord, Result};
use async_trait::async_trait;

/// Row counts for the structured-zone tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCounts {
    pub claims: u64,
    pub claims_history: u64,
    pub patients: u64,
    pub patients_history: u64,
}

/// Persistence backend for the upsert-with-history protocol
///
/// For every upsert, the implementation must keep the current table and the
/// history table consistent: one current-row write paired with exactly one
/// history-row append, inside a single atomic transaction. When the natural
/// key already exists, the history row carries the new field values together
/// with the *previous* state's `insert_ts` and a fresh `change_ts`; a failure
/// at any step rolls back both writes and propagates.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Upsert one claim record keyed by `claim_id`.
    ///
    /// `row` is the record's source-file row index, used in error reports.
    ///
    /// # Errors
    ///
    /// Returns a store error when the natural key is missing or when the
    /// transaction fails; the transaction is rolled back in full.
    async fn upsert_claim(&self, record: &ProcessedRecord, row: usize) -> Result<()>;

    /// Upsert one patient record keyed by `patient_id`.
    ///
    /// # Errors
    ///
    /// Same contract as [`HistoryStore::upsert_claim`].
    async fn upsert_patient(&self, record: &ProcessedRecord, row: usize) -> Result<()>;

    /// Whether the patient history table holds no rows (the first-load
    /// exemption for the overlap check).
    async fn patient_history_is_empty(&self) -> Result<bool>;

    /// How many of the given identifiers already appear in the patient
    /// history table.
    async fn count_matching_patient_ids(&self, ids: &[String]) -> Result<usize>;

    /// Row counts for the four structured-zone tables.
    async fn table_counts(&self) -> Result<TableCounts>;
}
