//! Pattern analysis over a funder's deadline history.
//!
//! Computes, per funder, the typical day-of-month, typical months, timing
//! variance, and average cycle length from the historical store. All
//! statistics are deterministic: records are iterated in the repository's
//! stable deadline-ascending order, and mode ties break on the value first
//! encountered in that order.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::repository::{DeadlineHistoryRepository, RepositoryResult};
use crate::models::DeadlineHistoryRecord;

/// Gaps shorter than this are same-cycle duplicates, not a cycle length.
const MIN_CYCLE_GAP_DAYS: i64 = 30;
/// Gaps longer than this are multi-year holes, not a cycle length.
const MAX_CYCLE_GAP_DAYS: i64 = 730;
/// Display cap for the sample title list.
const MAX_TITLES: usize = 10;

/// Derived statistical summary of one funder's deadline history.
///
/// Computed on demand, never persisted. A funder with zero qualifying
/// records yields the explicit empty summary from [`FunderPattern::empty`]
/// rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunderPattern {
    pub funder: String,
    /// Most frequent day-of-month; ties break on first occurrence in
    /// deadline-ascending order. None when no records exist.
    pub typical_day: Option<u32>,
    /// Distinct months (1-12), most frequent first.
    pub typical_months: Vec<u32>,
    /// Every observed month, repeats reflecting frequency.
    pub month_observations: Vec<u32>,
    /// Sample standard deviation of day-of-month values; 0.0 below two
    /// data points, None when no records exist.
    pub day_variance: Option<f64>,
    /// Mean day-gap between consecutive deadlines, counting only gaps of
    /// 30-730 days. None if no gap qualifies.
    pub avg_cycle_days: Option<f64>,
    /// Historical deadline dates, ascending.
    pub dates: Vec<NaiveDate>,
    /// Distinct grant titles, capped at 10 for display.
    pub titles: Vec<String>,
    pub earliest_deadline: Option<NaiveDate>,
    pub latest_deadline: Option<NaiveDate>,
    pub avg_amount_min: Option<f64>,
    pub avg_amount_max: Option<f64>,
    pub records_count: usize,
}

impl FunderPattern {
    /// Explicit "no data" summary for a funder with zero qualifying records.
    pub fn empty(funder: impl Into<String>) -> Self {
        Self {
            funder: funder.into(),
            typical_day: None,
            typical_months: Vec::new(),
            month_observations: Vec::new(),
            day_variance: None,
            avg_cycle_days: None,
            dates: Vec::new(),
            titles: Vec::new(),
            earliest_deadline: None,
            latest_deadline: None,
            avg_amount_min: None,
            avg_amount_max: None,
            records_count: 0,
        }
    }

    /// Year span covered by the history, in fractional years.
    pub fn years_span(&self) -> f64 {
        match (self.earliest_deadline, self.latest_deadline) {
            (Some(first), Some(last)) => (last - first).num_days() as f64 / 365.25,
            _ => 0.0,
        }
    }
}

/// Most frequent value; ties break on the value first encountered.
pub(crate) fn mode_first_encountered(values: &[u32]) -> Option<u32> {
    let mut counted: Vec<(u32, usize)> = Vec::new();
    for v in values {
        match counted.iter_mut().find(|(value, _)| value == v) {
            Some((_, count)) => *count += 1,
            None => counted.push((*v, 1)),
        }
    }
    let mut best: Option<(u32, usize)> = None;
    for (value, count) in counted {
        // strictly-greater keeps the first-encountered value on ties
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Sample standard deviation; 0.0 below two data points.
pub(crate) fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (n - 1.0)).sqrt()
}

/// Distinct values ordered by descending frequency; frequency ties keep
/// first-encountered order (stable sort over insertion order).
fn by_descending_frequency(values: &[u32]) -> Vec<u32> {
    let mut counted: Vec<(u32, usize)> = Vec::new();
    for v in values {
        match counted.iter_mut().find(|(value, _)| value == v) {
            Some((_, count)) => *count += 1,
            None => counted.push((*v, 1)),
        }
    }
    counted.sort_by(|a, b| b.1.cmp(&a.1));
    counted.into_iter().map(|(value, _)| value).collect()
}

fn mean_cycle_days(dates: &[NaiveDate]) -> Option<f64> {
    let mut gaps: Vec<i64> = Vec::new();
    for pair in dates.windows(2) {
        let gap = (pair[1] - pair[0]).num_days();
        if (MIN_CYCLE_GAP_DAYS..=MAX_CYCLE_GAP_DAYS).contains(&gap) {
            gaps.push(gap);
        }
    }
    if gaps.is_empty() {
        return None;
    }
    Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64)
}

fn mean_of(values: impl Iterator<Item = i64>) -> Option<f64> {
    let collected: Vec<i64> = values.collect();
    if collected.is_empty() {
        return None;
    }
    Some(collected.iter().sum::<i64>() as f64 / collected.len() as f64)
}

/// Compute a funder's pattern summary from its records.
///
/// `records` must be sorted ascending by deadline (the repository contract);
/// the output is then bit-for-bit reproducible across calls.
pub fn compute_pattern(funder: &str, records: &[DeadlineHistoryRecord]) -> FunderPattern {
    if records.is_empty() {
        return FunderPattern::empty(funder);
    }

    let dates: Vec<NaiveDate> = records.iter().map(|r| r.deadline).collect();
    let days: Vec<u32> = dates.iter().map(|d| d.day()).collect();
    let day_values: Vec<f64> = days.iter().map(|d| *d as f64).collect();
    let month_observations: Vec<u32> = dates.iter().map(|d| d.month()).collect();

    let mut titles: Vec<String> = Vec::new();
    for record in records {
        if titles.len() >= MAX_TITLES {
            break;
        }
        if !titles.contains(&record.title) {
            titles.push(record.title.clone());
        }
    }

    FunderPattern {
        funder: funder.to_string(),
        typical_day: mode_first_encountered(&days),
        typical_months: by_descending_frequency(&month_observations),
        day_variance: Some(sample_stdev(&day_values)),
        avg_cycle_days: mean_cycle_days(&dates),
        earliest_deadline: dates.first().copied(),
        latest_deadline: dates.last().copied(),
        avg_amount_min: mean_of(records.iter().filter_map(|r| r.amount_min)),
        avg_amount_max: mean_of(records.iter().filter_map(|r| r.amount_max)),
        records_count: records.len(),
        month_observations,
        dates,
        titles,
    }
}

/// Analyze a funder by case-insensitive substring match over a lookback
/// window ending at `today`.
///
/// Returns the explicit empty summary when no records match; repository
/// failures propagate unchanged.
pub async fn analyze_funder(
    repo: &dyn DeadlineHistoryRepository,
    funder_query: &str,
    lookback_years: u32,
    today: NaiveDate,
) -> RepositoryResult<FunderPattern> {
    let since = lookback_start(today, lookback_years);
    let records = repo.find_by_funder(funder_query, since).await?;
    Ok(compute_pattern(funder_query, &records))
}

/// Start of the lookback window: `today` minus `lookback_years` years.
pub(crate) fn lookback_start(today: NaiveDate, lookback_years: u32) -> NaiveDate {
    crate::models::calendar::date_clamped(
        today.year() - lookback_years as i32,
        today.month(),
        today.day(),
    )
    .unwrap_or(today)
}
