//! Forecast aggregation across all qualifying funders.
//!
//! Walks every funder group in the store, runs pattern analysis and the
//! rule-based predictor over each, and assembles a combined forecast list
//! sorted soonest-first. An optional researcher profile re-ranks the list
//! by topical match.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::db::repository::{DeadlineHistoryRepository, RepositoryResult};
use crate::db::ForecastSettings;
use crate::models::calendar::add_months;
use crate::models::DeadlineHistoryRecord;

use super::heuristic::predict_next;
use super::patterns::{compute_pattern, lookback_start};
use super::scoring::{classify_recurrence, confidence_score, month_consistency, round2, Recurrence};

/// Weight of the topical-overlap component in the profile match score.
const MATCH_OVERLAP_WEIGHT: f64 = 0.7;
/// Bonus for a funder seen within the last year.
const MATCH_RECENCY_WEIGHT: f64 = 0.1;
const MATCH_RECENCY_WINDOW_DAYS: i64 = 365;
/// Weight of forecast confidence in the profile match score.
const MATCH_CONFIDENCE_WEIGHT: f64 = 0.2;

/// Shown when forecasts cannot be personalized.
pub const PROFILE_PROMPT: &str =
    "Add research areas to your profile to get personalized forecast rankings.";

/// Tuning knobs for a full aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Years of history considered per funder.
    pub lookback_years: u32,
    /// Minimum records for a funder to be forecast at all.
    pub min_records: usize,
    /// Forecasts beyond this many months out are dropped.
    pub lookahead_months: u32,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            lookback_years: 3,
            min_records: 2,
            lookahead_months: 6,
        }
    }
}

impl From<&ForecastSettings> for ForecastOptions {
    fn from(settings: &ForecastSettings) -> Self {
        Self {
            lookback_years: settings.lookback_years,
            min_records: settings.min_records,
            lookahead_months: settings.lookahead_months,
        }
    }
}

/// One aggregated forecast for a funder's next expected deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    pub funder: String,
    pub predicted_deadline: NaiveDate,
    /// Expected opening of the solicitation, when historical open dates
    /// allow estimating the typical open-to-deadline lead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_open: Option<NaiveDate>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_max: Option<f64>,
    pub focus_areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_title: Option<String>,
    pub recurrence: Recurrence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<NaiveDate>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_quarter: Option<u8>,
    pub is_federal: bool,
}

/// Research interests used to personalize forecast ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearcherProfile {
    pub research_areas: Vec<String>,
}

/// A forecast annotated with its profile match score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredForecast {
    #[serde(flatten)]
    pub forecast: ForecastResult,
    /// Topical match in [0, 1]; None when no profile was available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
}

/// Final recommendation payload: scored forecasts plus an optional nudge
/// to fill in the researcher profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub forecasts: Vec<ScoredForecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_prompt: Option<String>,
}

/// Forecast the next deadline for every funder with enough history.
///
/// Funders whose qualifying records all lack dates are skipped with a debug
/// log line, as are predictions beyond the lookahead window. The result is
/// sorted by predicted date ascending, confidence descending on date ties.
pub async fn forecast_upcoming(
    repo: &dyn DeadlineHistoryRepository,
    today: NaiveDate,
    opts: &ForecastOptions,
) -> RepositoryResult<Vec<ForecastResult>> {
    let since = lookback_start(today, opts.lookback_years);
    let groups = repo.funder_groups(since, opts.min_records).await?;
    let cutoff = add_months(today, opts.lookahead_months);

    let mut results = Vec::new();
    for group in groups {
        let pattern = compute_pattern(&group.funder, &group.records);
        if pattern.dates.is_empty() {
            debug!("skipping funder '{}': no dated history", group.funder);
            continue;
        }

        let predicted = predict_next(&pattern, today, opts.lookahead_months);
        if predicted.date > cutoff {
            continue;
        }

        let shared = confidence_score(
            pattern.records_count,
            pattern.years_span(),
            month_consistency(&pattern.month_observations),
        );
        let confidence = round2(0.8 * shared + 0.2 * predicted.day_confidence);

        results.push(ForecastResult {
            funder: group.funder.clone(),
            predicted_deadline: predicted.date,
            predicted_open: predicted_open(&group.records, predicted.date),
            confidence,
            amount_min: pattern.avg_amount_min,
            amount_max: pattern.avg_amount_max,
            focus_areas: focus_areas(&group.records),
            sample_title: pattern.titles.first().cloned(),
            recurrence: classify_recurrence(&pattern.month_observations),
            last_seen: pattern.latest_deadline,
            source: group.source.clone(),
            fiscal_quarter: predicted.fiscal_quarter,
            is_federal: predicted.is_federal,
        });
    }

    results.sort_by(|a, b| {
        a.predicted_deadline
            .cmp(&b.predicted_deadline)
            .then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.funder.cmp(&b.funder))
    });
    Ok(results)
}

/// Estimated open date: predicted deadline minus the mean historical
/// open-to-deadline lead. None when no record carries an open date.
fn predicted_open(records: &[DeadlineHistoryRecord], deadline: NaiveDate) -> Option<NaiveDate> {
    let leads: Vec<i64> = records
        .iter()
        .filter_map(|r| r.open_date.map(|open| (r.deadline - open).num_days()))
        .filter(|lead| *lead > 0)
        .collect();
    if leads.is_empty() {
        return None;
    }
    let mean = leads.iter().sum::<i64>() as f64 / leads.len() as f64;
    Some(deadline - chrono::Duration::days(mean.round() as i64))
}

/// Distinct category strings in first-encountered order.
fn focus_areas(records: &[DeadlineHistoryRecord]) -> Vec<String> {
    let mut areas: Vec<String> = Vec::new();
    for record in records {
        for category in &record.categories {
            if !areas.contains(category) {
                areas.push(category.clone());
            }
        }
    }
    areas
}

/// Re-rank forecasts against a researcher profile.
///
/// With a non-empty profile, each forecast gets a match score from topical
/// overlap, funder recency, and forecast confidence, and the list is
/// reordered by score descending (date ascending on ties). Without one, the
/// original order is kept unscored and a profile prompt is attached.
pub fn recommend(
    forecasts: Vec<ForecastResult>,
    profile: Option<&ResearcherProfile>,
    today: NaiveDate,
) -> RecommendationSet {
    let areas: Vec<String> = profile
        .map(|p| {
            p.research_areas
                .iter()
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if areas.is_empty() {
        return RecommendationSet {
            forecasts: forecasts
                .into_iter()
                .map(|forecast| ScoredForecast {
                    forecast,
                    match_score: None,
                })
                .collect(),
            profile_prompt: Some(PROFILE_PROMPT.to_string()),
        };
    }

    let mut scored: Vec<ScoredForecast> = forecasts
        .into_iter()
        .map(|forecast| {
            let score = match_score(&forecast, &areas, today);
            ScoredForecast {
                forecast,
                match_score: Some(score),
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        let sa = a.match_score.unwrap_or(0.0);
        let sb = b.match_score.unwrap_or(0.0);
        sb.partial_cmp(&sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.forecast
                    .predicted_deadline
                    .cmp(&b.forecast.predicted_deadline)
            })
    });

    RecommendationSet {
        forecasts: scored,
        profile_prompt: None,
    }
}

fn match_score(forecast: &ForecastResult, profile_areas: &[String], today: NaiveDate) -> f64 {
    let focus: Vec<String> = forecast
        .focus_areas
        .iter()
        .map(|a| a.to_lowercase())
        .collect();
    // Fraction of the researcher's areas this forecast covers
    let matched = profile_areas
        .iter()
        .filter(|area| focus.contains(area))
        .count();
    let overlap = matched as f64 / profile_areas.len() as f64;

    let recency = forecast
        .last_seen
        .map(|seen| (today - seen).num_days() <= MATCH_RECENCY_WINDOW_DAYS)
        .unwrap_or(false);
    let recency_bonus = if recency { MATCH_RECENCY_WEIGHT } else { 0.0 };

    round2(
        (MATCH_OVERLAP_WEIGHT * overlap
            + recency_bonus
            + MATCH_CONFIDENCE_WEIGHT * forecast.confidence)
            .min(1.0),
    )
}
