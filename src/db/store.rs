//! Record store
//!
//! Read-only access to proposals that already passed intake.

use crate::db::queries;
use crate::error::{AppError, AppResult};
use crate::models::{StageTag, StoredProposal};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use std::collections::HashSet;
use tokio_postgres::Row;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All stored filenames, regardless of stage
    async fn list_filenames(&self) -> AppResult<HashSet<String>>;

    /// Records in `stage` whose merge request is in `external_state`
    async fn list_by_stage(
        &self,
        external_state: &str,
        stage: StageTag,
    ) -> AppResult<Vec<StoredProposal>>;
}

/// `projects` table in PostgreSQL
pub struct PgRecordStore {
    pool: Pool,
}

impl PgRecordStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_filenames(&self) -> AppResult<HashSet<String>> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::LIST_FILENAMES, &[]).await?;
        rows.iter()
            .map(|r| r.try_get::<_, String>("filename").map_err(AppError::from))
            .collect()
    }

    async fn list_by_stage(
        &self,
        external_state: &str,
        stage: StageTag,
    ) -> AppResult<Vec<StoredProposal>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(queries::LIST_BY_STAGE, &[&external_state, &stage.as_str()])
            .await?;
        rows.iter().map(stored_from_row).collect()
    }
}

fn stored_from_row(row: &Row) -> AppResult<StoredProposal> {
    Ok(StoredProposal {
        filename: row.try_get("filename")?,
        title: row.try_get("title")?,
        gitlab_url: row.try_get("gitlab_url")?,
        gitlab_state: row.try_get("gitlab_state")?,
        state: row.try_get("state")?,
        percentage_funded: row.try_get("percentage_funded")?,
        target_amount: row.try_get("target_amount")?,
        amount_received: row.try_get("amount_received")?,
        gitlab_username: row.try_get("gitlab_username")?,
        gitlab_created_at: row.try_get("gitlab_created_at")?,
        payment_id: row.try_get("payment_id")?,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::{record, MemoryRecordStore};
    use super::*;
    use crate::models::MERGED;

    #[tokio::test]
    async fn test_memory_store_filters_on_state_and_stage() {
        let store = MemoryRecordStore::new(vec![
            record("a.md", MERGED, "FUNDING-REQUIRED"),
            record("b.md", "opened", "FUNDING-REQUIRED"),
            record("c.md", MERGED, "WORK-IN-PROGRESS"),
            record("d.md", MERGED, "DONE"),
        ]);

        let funding = store.list_by_stage(MERGED, StageTag::FundingRequired).await.unwrap();
        assert_eq!(funding.len(), 1);
        assert_eq!(funding[0].filename, "a.md");

        let names = store.list_filenames().await.unwrap();
        assert_eq!(names.len(), 4);
        assert!(names.contains("d.md"));
        assert!(!names.contains("e.md"));
    }
}
