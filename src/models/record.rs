//! Deadline history records and raw listing inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::fiscal_year;

/// One historical occurrence of a funding opportunity's deadline.
///
/// Records are created by the extraction pass (or direct insertion), never
/// mutated afterwards, and deduplicated on the (funder, title, deadline)
/// triple by the repository layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineHistoryRecord {
    pub funder: String,
    pub title: String,
    pub deadline: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_date: Option<NaiveDate>,
    /// U.S. federal fiscal year, derived from the deadline.
    pub fiscal_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_max: Option<i64>,
    pub categories: Vec<String>,
    pub source: String,
}

impl DeadlineHistoryRecord {
    /// Create a record from its required fields, deriving the fiscal year.
    pub fn new(
        funder: impl Into<String>,
        title: impl Into<String>,
        deadline: NaiveDate,
        source: impl Into<String>,
    ) -> Self {
        Self {
            funder: funder.into(),
            title: title.into(),
            deadline,
            open_date: None,
            announcement_date: None,
            fiscal_year: fiscal_year(deadline),
            amount_min: None,
            amount_max: None,
            categories: Vec::new(),
            source: source.into(),
        }
    }

    /// Set the open date.
    pub fn with_open_date(mut self, open_date: NaiveDate) -> Self {
        self.open_date = Some(open_date);
        self
    }

    /// Set the announcement date.
    pub fn with_announcement_date(mut self, announcement_date: NaiveDate) -> Self {
        self.announcement_date = Some(announcement_date);
        self
    }

    /// Set the funding amount range.
    pub fn with_amounts(mut self, amount_min: Option<i64>, amount_max: Option<i64>) -> Self {
        self.amount_min = amount_min;
        self.amount_max = amount_max;
        self
    }

    /// Set the focus-area categories.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }
}

/// A raw grant listing as harvested from an upstream source.
///
/// Listings are lossy: funder or deadline may be missing, in which case the
/// extraction pass skips them rather than failing the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGrantListing {
    pub funder: Option<String>,
    pub title: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub open_date: Option<NaiveDate>,
    pub announcement_date: Option<NaiveDate>,
    pub amount_min: Option<i64>,
    pub amount_max: Option<i64>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub source: String,
}
