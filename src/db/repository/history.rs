//! Deadline history repository trait.
//!
//! This trait exposes exactly the query shapes the forecasting services
//! need: case-insensitive substring match on funder, a since-date range
//! filter, and grouped fetch with a minimum record count. Keeping the
//! surface this narrow keeps the statistical logic pure and unit-testable
//! without a live database.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::RepositoryResult;
use crate::models::DeadlineHistoryRecord;

/// Records for one (funder, source) group, sorted ascending by deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunderGroup {
    pub funder: String,
    pub source: String,
    pub records: Vec<DeadlineHistoryRecord>,
}

/// Repository trait for deadline history storage.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait DeadlineHistoryRepository: Send + Sync {
    /// Insert a history record, deduplicating on (funder, title, deadline).
    ///
    /// # Returns
    /// * `Ok(true)` - Record was inserted
    /// * `Ok(false)` - An identical (funder, title, deadline) triple already
    ///   exists; the store is unchanged
    /// * `Err(RepositoryError)` - If the operation fails
    async fn insert_record(&self, record: DeadlineHistoryRecord) -> RepositoryResult<bool>;

    /// Fetch records whose funder name contains `funder_query`
    /// (case-insensitive) and whose deadline is on or after `since`.
    ///
    /// Results are sorted ascending by deadline, then by title, so that
    /// downstream statistics iterate in a stable, reproducible order.
    async fn find_by_funder(
        &self,
        funder_query: &str,
        since: NaiveDate,
    ) -> RepositoryResult<Vec<DeadlineHistoryRecord>>;

    /// Fetch all (funder, source) groups holding at least `min_records`
    /// records with deadlines on or after `since`.
    ///
    /// Groups are sorted by (funder, source) and each group's records
    /// ascending by deadline, for reproducible aggregation.
    async fn funder_groups(
        &self,
        since: NaiveDate,
        min_records: usize,
    ) -> RepositoryResult<Vec<FunderGroup>>;

    /// Total number of stored history records.
    async fn record_count(&self) -> RepositoryResult<usize>;

    /// Check the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
