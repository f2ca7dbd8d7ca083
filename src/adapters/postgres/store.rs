//! PostgreSQL history store
//!
//! Implements the upsert-with-history protocol against the current/history
//! table pairs. Each upsert runs inside one transaction: the current-row
//! write and the history-row append either both land or both roll back, so
//! `count(history) >= count(current)` holds at all times.

use crate::adapters::postgres::client::PostgresClient;
use crate::adapters::store::{HistoryStore, TableCounts};
use crate::domain::{ProcessedRecord, Result, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// PostgreSQL-backed [`HistoryStore`]
pub struct PostgresHistoryStore {
    client: Arc<PostgresClient>,
}

impl PostgresHistoryStore {
    pub fn new(client: Arc<PostgresClient>) -> Self {
        Self { client }
    }

    fn tx_err(e: tokio_postgres::Error) -> StoreError {
        StoreError::TransactionFailed(e.to_string())
    }
}

fn natural_key<'a>(
    record: &'a ProcessedRecord,
    key: &'static str,
    row: usize,
) -> std::result::Result<&'a str, StoreError> {
    record
        .text(key)
        .filter(|s| !s.is_empty())
        .ok_or(StoreError::MissingNaturalKey { key, row })
}

#[async_trait]
impl HistoryStore for PostgresHistoryStore {
    async fn upsert_claim(&self, record: &ProcessedRecord, row: usize) -> Result<()> {
        let claim_id = natural_key(record, "claim_id", row)?;
        let patient_id = record.text("patient_id");
        let billing_start = record.text("billing_start");
        let billing_end = record.text("billing_end");
        let provider = record.text("provider");
        let admitting_diagnosis = record.text("admitting_diagnosis");
        let insurance = record.text("insurance");
        let status = record.text("status");
        let amount = record.number("amount");

        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(Self::tx_err)?;

        let existing = tx
            .query_opt("SELECT insert_ts FROM claims WHERE claim_id = $1", &[&claim_id])
            .await
            .map_err(Self::tx_err)?;

        let now = Utc::now();
        // The history row documents when the superseded state was set, so a
        // fresh insert records now twice.
        let history_insert_ts: DateTime<Utc> = match existing {
            Some(prior) => {
                let prior_insert_ts: DateTime<Utc> = prior.get(0);
                tx.execute(
                    r#"
                    UPDATE claims
                    SET provider = $1, admitting_diagnosis = $2, insurance = $3, status = $4,
                        amount = $5, insert_ts = $6
                    WHERE claim_id = $7
                    "#,
                    &[
                        &provider,
                        &admitting_diagnosis,
                        &insurance,
                        &status,
                        &amount,
                        &now,
                        &claim_id,
                    ],
                )
                .await
                .map_err(Self::tx_err)?;
                prior_insert_ts
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO claims (claim_id, patient_id, billing_start, billing_end, provider,
                                        admitting_diagnosis, insurance, status, amount, insert_ts)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    "#,
                    &[
                        &claim_id,
                        &patient_id,
                        &billing_start,
                        &billing_end,
                        &provider,
                        &admitting_diagnosis,
                        &insurance,
                        &status,
                        &amount,
                        &now,
                    ],
                )
                .await
                .map_err(Self::tx_err)?;
                now
            }
        };

        tx.execute(
            r#"
            INSERT INTO claims_history (claim_id, patient_id, billing_start, billing_end, provider,
                                        admitting_diagnosis, insurance, status, amount,
                                        insert_ts, change_ts)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
            &[
                &claim_id,
                &patient_id,
                &billing_start,
                &billing_end,
                &provider,
                &admitting_diagnosis,
                &insurance,
                &status,
                &amount,
                &history_insert_ts,
                &now,
            ],
        )
        .await
        .map_err(Self::tx_err)?;

        tx.commit().await.map_err(Self::tx_err)?;
        Ok(())
    }

    async fn upsert_patient(&self, record: &ProcessedRecord, row: usize) -> Result<()> {
        let patient_id = natural_key(record, "patient_id", row)?;
        let first_name = record.text("first_name");
        let last_name = record.text("last_name");

        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(Self::tx_err)?;

        let existing = tx
            .query_opt(
                "SELECT insert_ts FROM patients WHERE patient_id = $1",
                &[&patient_id],
            )
            .await
            .map_err(Self::tx_err)?;

        let now = Utc::now();
        let history_insert_ts: DateTime<Utc> = match existing {
            Some(prior) => {
                let prior_insert_ts: DateTime<Utc> = prior.get(0);
                tx.execute(
                    r#"
                    UPDATE patients
                    SET first_name = $1, last_name = $2, insert_ts = $3
                    WHERE patient_id = $4
                    "#,
                    &[&first_name, &last_name, &now, &patient_id],
                )
                .await
                .map_err(Self::tx_err)?;
                prior_insert_ts
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO patients (first_name, last_name, patient_id, insert_ts)
                    VALUES ($1, $2, $3, $4)
                    "#,
                    &[&first_name, &last_name, &patient_id, &now],
                )
                .await
                .map_err(Self::tx_err)?;
                now
            }
        };

        tx.execute(
            r#"
            INSERT INTO patients_history (first_name, last_name, patient_id, insert_ts, change_ts)
            VALUES ($1, $2, $3, $4, $5)
            "#,
            &[
                &first_name,
                &last_name,
                &patient_id,
                &history_insert_ts,
                &now,
            ],
        )
        .await
        .map_err(Self::tx_err)?;

        tx.commit().await.map_err(Self::tx_err)?;
        Ok(())
    }

    async fn patient_history_is_empty(&self) -> Result<bool> {
        let client = self.client.get_connection().await?;
        let row = client
            .query_one("SELECT COUNT(*) FROM patients_history", &[])
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        let count: i64 = row.get(0);
        Ok(count == 0)
    }

    async fn count_matching_patient_ids(&self, ids: &[String]) -> Result<usize> {
        let client = self.client.get_connection().await?;
        let row = client
            .query_one(
                "SELECT COUNT(DISTINCT patient_id) FROM patients_history WHERE patient_id = ANY($1)",
                &[&ids],
            )
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        let count: i64 = row.get(0);
        Ok(count as usize)
    }

    async fn table_counts(&self) -> Result<TableCounts> {
        let client = self.client.get_connection().await?;
        let mut counts = TableCounts::default();
        for (table, slot) in [
            ("claims", &mut counts.claims as &mut u64),
            ("claims_history", &mut counts.claims_history),
            ("patients", &mut counts.patients),
            ("patients_history", &mut counts.patients_history),
        ] {
            let query = format!("SELECT COUNT(*) FROM {table}");
            let row = client
                .query_one(&query, &[])
                .await
                .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            let count: i64 = row.get(0);
            *slot = count as u64;
        }
        Ok(counts)
    }
}
