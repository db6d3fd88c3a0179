//! Rule-based deadline prediction.
//!
//! Projects a funder's next deadline from its pattern summary: a forward
//! month-by-month scan over the typical months, per-month mean day, and a
//! fallback ladder for funders with thin history. Federal funders get a
//! fiscal-quarter alignment pass on top.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::calendar::{date_clamped, fiscal_quarter, fiscal_quarter_mid_month};
use crate::models::is_federal_funder;

use super::patterns::{sample_stdev, FunderPattern};

/// Day-of-month standard deviation at which day confidence decays to zero.
const DAY_STDEV_CEILING: f64 = 15.0;
/// Days ahead used when a funder has no usable history at all.
const NO_HISTORY_OFFSET_DAYS: i64 = 90;

/// One rule-based prediction for a funder's next deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictedDeadline {
    pub date: NaiveDate,
    pub month: u32,
    /// Confidence in the day-of-month estimate, in [0, 1].
    pub day_confidence: f64,
    /// Federal fiscal quarter (1-4) of the prediction, set for federal
    /// funders with date history.
    pub fiscal_quarter: Option<u8>,
    pub is_federal: bool,
}

/// Mean day-of-month for records falling in `month`, falling back to the
/// mean over all records when none match, then to the first of the month.
fn predicted_day(pattern: &FunderPattern, month: u32) -> u32 {
    let in_month: Vec<f64> = pattern
        .dates
        .iter()
        .filter(|d| d.month() == month)
        .map(|d| d.day() as f64)
        .collect();
    let pool: Vec<f64> = if in_month.is_empty() {
        pattern.dates.iter().map(|d| d.day() as f64).collect()
    } else {
        in_month
    };
    if pool.is_empty() {
        return 1;
    }
    let mean = pool.iter().sum::<f64>() / pool.len() as f64;
    mean.round().max(1.0) as u32
}

/// Linear decay from full confidence at zero variance to zero at 15 days
/// of standard deviation; 0.5 with only one data point.
fn day_confidence(pattern: &FunderPattern) -> f64 {
    let days: Vec<f64> = pattern.dates.iter().map(|d| d.day() as f64).collect();
    if days.len() < 2 {
        return 0.5;
    }
    (1.0 - sample_stdev(&days) / DAY_STDEV_CEILING).max(0.0)
}

/// Predict the next deadline for a funder pattern.
///
/// Scans month by month from `today` across the lookahead window plus a
/// 12-month guarantee margin until a typical month yields a strictly-future
/// date. Funders with no month history fall back to "last deadline plus one
/// year" at confidence 0.5, then to "today plus 90 days, first of month" at
/// confidence 0.0.
pub fn predict_next(
    pattern: &FunderPattern,
    today: NaiveDate,
    lookahead_months: u32,
) -> PredictedDeadline {
    if pattern.typical_months.is_empty() {
        return fallback_without_months(pattern, today);
    }

    let month_set: HashSet<u32> = pattern.typical_months.iter().copied().collect();
    let confidence = day_confidence(pattern);

    let mut year = today.year();
    let mut month = today.month();
    // +12 guarantees every typical month is visited at least once
    for _ in 0..=(lookahead_months + 12) {
        if month_set.contains(&month) {
            let day = predicted_day(pattern, month);
            if let Some(candidate) = date_clamped(year, month, day) {
                if candidate > today {
                    return finalize(pattern, today, candidate, confidence);
                }
            }
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }

    // No forward match: most frequent month, next year
    let month = pattern.typical_months[0];
    let day = predicted_day(pattern, month);
    let candidate = date_clamped(today.year() + 1, month, day)
        .unwrap_or_else(|| today + Duration::days(365));
    finalize(pattern, today, candidate, confidence)
}

fn fallback_without_months(pattern: &FunderPattern, today: NaiveDate) -> PredictedDeadline {
    if let Some(last) = pattern.latest_deadline {
        let candidate = date_clamped(last.year() + 1, last.month(), last.day())
            .unwrap_or_else(|| today + Duration::days(365));
        return finalize(pattern, today, candidate, 0.5);
    }

    let anchor = today + Duration::days(NO_HISTORY_OFFSET_DAYS);
    let candidate =
        date_clamped(anchor.year(), anchor.month(), 1).unwrap_or(anchor);
    PredictedDeadline {
        date: candidate,
        month: candidate.month(),
        day_confidence: 0.0,
        fiscal_quarter: None,
        is_federal: is_federal_funder(&pattern.funder),
    }
}

/// Apply the federal fiscal-calendar adjustment and assemble the result.
///
/// Federal funders with date history are snapped into their modal historical
/// fiscal quarter: if the predicted date falls in a different quarter, it
/// moves to the quarter's middle month at the next strictly-future
/// occurrence. The resulting month supersedes the originally computed one.
fn finalize(
    pattern: &FunderPattern,
    today: NaiveDate,
    predicted: NaiveDate,
    day_confidence: f64,
) -> PredictedDeadline {
    let is_federal = is_federal_funder(&pattern.funder);
    if !is_federal || pattern.dates.is_empty() {
        return PredictedDeadline {
            date: predicted,
            month: predicted.month(),
            day_confidence,
            fiscal_quarter: None,
            is_federal,
        };
    }

    let quarters: Vec<u32> = pattern
        .dates
        .iter()
        .map(|d| fiscal_quarter(*d) as u32)
        .collect();
    let modal_quarter = super::patterns::mode_first_encountered(&quarters)
        .unwrap_or(fiscal_quarter(predicted) as u32) as u8;

    let date = if fiscal_quarter(predicted) == modal_quarter {
        predicted
    } else {
        let target_month = fiscal_quarter_mid_month(modal_quarter);
        let mut year = today.year();
        let mut candidate = date_clamped(year, target_month, predicted.day());
        while candidate.map_or(false, |c| c <= today) {
            year += 1;
            candidate = date_clamped(year, target_month, predicted.day());
        }
        candidate.unwrap_or(predicted)
    };

    PredictedDeadline {
        month: date.month(),
        fiscal_quarter: Some(fiscal_quarter(date)),
        date,
        day_confidence,
        is_federal: true,
    }
}
