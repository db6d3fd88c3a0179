//! In-memory repository implementation.
//!
//! Used for unit testing and local development. Dedup keys are held in a
//! `HashSet` alongside the record vector so repeated extraction passes are
//! idempotent.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::db::dedup::record_key;
use crate::db::repository::{
    DeadlineHistoryRepository, FunderGroup, RepositoryResult,
};
use crate::models::DeadlineHistoryRecord;

#[derive(Default)]
struct Store {
    records: Vec<DeadlineHistoryRecord>,
    keys: HashSet<String>,
}

/// In-memory deadline history repository.
#[derive(Clone, Default)]
pub struct LocalRepository {
    inner: Arc<RwLock<Store>>,
}

impl LocalRepository {
    /// Create an empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with records (duplicates dropped).
    pub fn with_records(records: Vec<DeadlineHistoryRecord>) -> Self {
        let repo = Self::new();
        {
            let mut store = repo.inner.write();
            for record in records {
                let key = record_key(&record.funder, &record.title, record.deadline);
                if store.keys.insert(key) {
                    store.records.push(record);
                }
            }
        }
        repo
    }
}

fn sort_by_deadline(records: &mut [DeadlineHistoryRecord]) {
    records.sort_by(|a, b| a.deadline.cmp(&b.deadline).then_with(|| a.title.cmp(&b.title)));
}

#[async_trait]
impl DeadlineHistoryRepository for LocalRepository {
    async fn insert_record(&self, record: DeadlineHistoryRecord) -> RepositoryResult<bool> {
        let key = record_key(&record.funder, &record.title, record.deadline);
        let mut store = self.inner.write();
        if !store.keys.insert(key) {
            return Ok(false);
        }
        store.records.push(record);
        Ok(true)
    }

    async fn find_by_funder(
        &self,
        funder_query: &str,
        since: NaiveDate,
    ) -> RepositoryResult<Vec<DeadlineHistoryRecord>> {
        let query = funder_query.to_lowercase();
        let store = self.inner.read();
        let mut matches: Vec<DeadlineHistoryRecord> = store
            .records
            .iter()
            .filter(|r| r.funder.to_lowercase().contains(&query) && r.deadline >= since)
            .cloned()
            .collect();
        sort_by_deadline(&mut matches);
        Ok(matches)
    }

    async fn funder_groups(
        &self,
        since: NaiveDate,
        min_records: usize,
    ) -> RepositoryResult<Vec<FunderGroup>> {
        let store = self.inner.read();
        let mut grouped: BTreeMap<(String, String), Vec<DeadlineHistoryRecord>> = BTreeMap::new();
        for record in store.records.iter().filter(|r| r.deadline >= since) {
            grouped
                .entry((record.funder.clone(), record.source.clone()))
                .or_default()
                .push(record.clone());
        }

        let mut groups = Vec::new();
        for ((funder, source), mut records) in grouped {
            if records.len() < min_records {
                continue;
            }
            sort_by_deadline(&mut records);
            groups.push(FunderGroup {
                funder,
                source,
                records,
            });
        }
        Ok(groups)
    }

    async fn record_count(&self) -> RepositoryResult<usize> {
        Ok(self.inner.read().records.len())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
