//! History extraction from raw grant listings.
//!
//! Turns harvested listings into deadline history records and loads them
//! into the store. Listings missing a funder, title, or deadline are
//! skipped and tallied, never failed; re-running extraction over the same
//! batch is a no-op thanks to repository-level dedup.

use serde::{Deserialize, Serialize};

use crate::db::repository::{DeadlineHistoryRepository, RepositoryResult};
use crate::models::{DeadlineHistoryRecord, RawGrantListing};

/// Outcome tally of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub scanned: usize,
    pub inserted: usize,
    pub duplicates: usize,
    /// Listings missing a funder, title, or deadline.
    pub skipped: usize,
}

/// Extract history records from raw listings into the repository.
pub async fn extract_history(
    repo: &dyn DeadlineHistoryRepository,
    listings: &[RawGrantListing],
) -> RepositoryResult<ExtractionReport> {
    let mut report = ExtractionReport::default();

    for listing in listings {
        report.scanned += 1;
        let record = match to_record(listing) {
            Some(record) => record,
            None => {
                report.skipped += 1;
                continue;
            }
        };
        if repo.insert_record(record).await? {
            report.inserted += 1;
        } else {
            report.duplicates += 1;
        }
    }

    Ok(report)
}

/// Build a record from a listing; None when a required field is missing
/// or blank.
fn to_record(listing: &RawGrantListing) -> Option<DeadlineHistoryRecord> {
    let funder = listing.funder.as_deref().map(str::trim).filter(|f| !f.is_empty())?;
    let title = listing.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let deadline = listing.deadline?;

    let mut record = DeadlineHistoryRecord::new(funder, title, deadline, &listing.source)
        .with_amounts(listing.amount_min, listing.amount_max)
        .with_categories(listing.categories.clone());
    record.open_date = listing.open_date;
    record.announcement_date = listing.announcement_date;
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn listing(funder: Option<&str>, title: Option<&str>, deadline: Option<NaiveDate>) -> RawGrantListing {
        RawGrantListing {
            funder: funder.map(String::from),
            title: title.map(String::from),
            deadline,
            open_date: None,
            announcement_date: None,
            amount_min: None,
            amount_max: None,
            categories: Vec::new(),
            source: "grants_gov".to_string(),
        }
    }

    #[tokio::test]
    async fn test_extract_inserts_complete_listings() {
        let repo = LocalRepository::new();
        let listings = vec![
            listing(Some("NSF"), Some("CAREER"), Some(date(2024, 7, 15))),
            listing(Some("NIH"), Some("R01"), Some(date(2024, 10, 5))),
        ];

        let report = extract_history(&repo, &listings).await.unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.skipped, 0);
        assert_eq!(repo.record_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_incomplete_listings_skipped_not_failed() {
        let repo = LocalRepository::new();
        let listings = vec![
            listing(None, Some("CAREER"), Some(date(2024, 7, 15))),
            listing(Some("NSF"), None, Some(date(2024, 7, 15))),
            listing(Some("NSF"), Some("CAREER"), None),
            listing(Some("   "), Some("CAREER"), Some(date(2024, 7, 15))),
            listing(Some("NSF"), Some("CAREER"), Some(date(2024, 7, 15))),
        ];

        let report = extract_history(&repo, &listings).await.unwrap();

        assert_eq!(report.scanned, 5);
        assert_eq!(report.skipped, 4);
        assert_eq!(report.inserted, 1);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let repo = LocalRepository::new();
        let listings = vec![
            listing(Some("NSF"), Some("CAREER"), Some(date(2024, 7, 15))),
            listing(Some("NIH"), Some("R01"), Some(date(2024, 10, 5))),
        ];

        let first = extract_history(&repo, &listings).await.unwrap();
        assert_eq!(first.inserted, 2);

        let second = extract_history(&repo, &listings).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, 2);
        assert_eq!(repo.record_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_optional_fields_carried_through() {
        let repo = LocalRepository::new();
        let mut l = listing(Some("NSF"), Some("CAREER"), Some(date(2024, 7, 15)));
        l.open_date = Some(date(2024, 5, 1));
        l.amount_min = Some(100_000);
        l.categories = vec!["engineering".to_string()];

        extract_history(&repo, &[l]).await.unwrap();

        let records = repo
            .find_by_funder("NSF", date(2020, 1, 1))
            .await
            .unwrap();
        assert_eq!(records[0].open_date, Some(date(2024, 5, 1)));
        assert_eq!(records[0].amount_min, Some(100_000));
        assert_eq!(records[0].categories, vec!["engineering"]);
    }
}
