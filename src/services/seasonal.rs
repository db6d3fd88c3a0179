//! Seasonal time-series prediction with a cached per-funder model.
//!
//! Fits a per-funder model over day-of-year values: yearly seasonality only
//! (one Fourier pair on calendar phase), a heavily damped linear trend
//! (funding cycles are assumed stable year over year), and an 80%
//! uncertainty interval derived from training residuals. Funders below the
//! training minimum, and any fit failure, transparently fall back to the
//! rule-based path; the fallback is a designed degraded state, never an
//! error.
//!
//! Trained models are cached in-process per funder with a staleness horizon.
//! The check-then-retrain sequence is not locked across await points; two
//! concurrent callers may both retrain the same funder. The entry is always
//! replaced wholesale, so the race costs duplicate work, not correctness.

use std::collections::HashMap;
use std::f64::consts::PI;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::warn;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::db::repository::{DeadlineHistoryRepository, RepositoryResult};
use crate::db::ForecastSettings;
use crate::models::calendar::day_of_year;

use super::heuristic::predict_next;
use super::patterns::{analyze_funder, FunderPattern};
use super::scoring::{confidence_score, month_consistency, round2};

/// Maximum gap between a predicted and actual day-of-year for the
/// self-consistency check to accept a candidate date. Tunable.
const SELF_CONSISTENCY_TOLERANCE_DAYS: f64 = 15.0;
/// Uncertainty-interval width at which model confidence bottoms out. Tunable.
const INTERVAL_CEILING_DAYS: f64 = 90.0;
/// z-value for an 80% two-sided interval.
const UNCERTAINTY_Z80: f64 = 1.2816;
/// Confidence bounds for the model path.
const MODEL_CONFIDENCE_FLOOR: f64 = 0.5;
const MODEL_CONFIDENCE_CEILING: f64 = 0.95;
/// Ridge penalty on the trend coefficient: low responsiveness to trend
/// shifts, since cycles are assumed stable year over year.
const TREND_PENALTY: f64 = 10.0;
/// Small ridge penalty on the seasonal coefficients for numerical stability.
const SEASONAL_PENALTY: f64 = 1e-3;

const YEARLY_PERIOD_DAYS: f64 = 365.25;

/// Which prediction path produced a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionMethod {
    #[serde(rename = "ml")]
    Ml,
    #[serde(rename = "rule_based")]
    RuleBased,
}

/// A prediction tagged with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodForecast {
    pub funder: String,
    pub predicted_date: NaiveDate,
    pub confidence: f64,
    pub method: PredictionMethod,
    /// Width of the 80% uncertainty interval in days (model path only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty_days: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<NaiveDate>,
}

/// Why a model fit was rejected.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("insufficient data: {0} records")]
    InsufficientData(usize),
    #[error("singular system during least-squares fit")]
    Singular,
}

/// Per-funder seasonal model: day-of-year regressed on calendar phase plus
/// a damped linear trend.
#[derive(Debug, Clone)]
struct SeasonalModel {
    /// [intercept, trend (per year), sin, cos]
    coeffs: [f64; 4],
    origin: NaiveDate,
    residual_std: f64,
}

impl SeasonalModel {
    fn fit(dates: &[NaiveDate]) -> Result<Self, FitError> {
        if dates.len() < 2 {
            return Err(FitError::InsufficientData(dates.len()));
        }
        let origin = dates[0];

        let rows: Vec<[f64; 4]> = dates.iter().map(|d| features(origin, *d)).collect();
        let targets: Vec<f64> = dates.iter().map(|d| day_of_year(*d) as f64).collect();

        // Normal equations with ridge penalties (intercept unpenalized)
        let mut ata = [[0.0f64; 4]; 4];
        let mut atb = [0.0f64; 4];
        for (row, y) in rows.iter().zip(targets.iter()) {
            for i in 0..4 {
                for j in 0..4 {
                    ata[i][j] += row[i] * row[j];
                }
                atb[i] += row[i] * y;
            }
        }
        ata[1][1] += TREND_PENALTY;
        ata[2][2] += SEASONAL_PENALTY;
        ata[3][3] += SEASONAL_PENALTY;

        let coeffs = solve_4x4(ata, atb).ok_or(FitError::Singular)?;
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(FitError::Singular);
        }

        let residuals: Vec<f64> = rows
            .iter()
            .zip(targets.iter())
            .map(|(row, y)| y - dot(&coeffs, row))
            .collect();
        let df = (residuals.len() - 1).max(1) as f64;
        let residual_std = (residuals.iter().map(|r| r * r).sum::<f64>() / df).sqrt();

        Ok(Self {
            coeffs,
            origin,
            residual_std,
        })
    }

    /// Model's predicted day-of-year for a calendar date.
    fn predict_day_of_year(&self, date: NaiveDate) -> f64 {
        dot(&self.coeffs, &features(self.origin, date))
    }

    /// Width of the 80% uncertainty interval, in days.
    fn interval_width(&self) -> f64 {
        2.0 * UNCERTAINTY_Z80 * self.residual_std
    }
}

fn features(origin: NaiveDate, date: NaiveDate) -> [f64; 4] {
    let t_years = (date - origin).num_days() as f64 / YEARLY_PERIOD_DAYS;
    let phase = 2.0 * PI * day_of_year(date) as f64 / YEARLY_PERIOD_DAYS;
    [1.0, t_years, phase.sin(), phase.cos()]
}

fn dot(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Gaussian elimination with partial pivoting.
fn solve_4x4(mut a: [[f64; 4]; 4], mut b: [f64; 4]) -> Option<[f64; 4]> {
    for col in 0..4 {
        let pivot_row = (col..4)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..4 {
            let factor = a[row][col] / a[col][col];
            for k in col..4 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0f64; 4];
    for row in (0..4).rev() {
        let mut sum = b[row];
        for k in (row + 1)..4 {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

fn circular_doy_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % YEARLY_PERIOD_DAYS;
    diff.min(YEARLY_PERIOD_DAYS - diff)
}

struct CachedModel {
    model: SeasonalModel,
    trained_at: DateTime<Utc>,
}

/// Inspection snapshot of the model cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    /// Funders with a currently cached model, sorted.
    pub cached_funders: Vec<String>,
    /// Horizon after which a cached model is retrained before reuse.
    pub staleness_hours: i64,
}

/// Seasonal prediction service owning the per-funder model cache.
///
/// One long-lived instance is shared by reference across callers; there is
/// no module-level global.
pub struct SeasonalPredictor {
    models: RwLock<HashMap<String, CachedModel>>,
    staleness_hours: i64,
    min_records: usize,
}

impl SeasonalPredictor {
    /// Default service: 24-hour staleness horizon, 4-record training minimum.
    pub fn new() -> Self {
        Self::with_settings(24, 4)
    }

    /// Service with explicit staleness horizon and training minimum.
    pub fn with_settings(staleness_hours: i64, min_records: usize) -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            staleness_hours,
            min_records,
        }
    }

    /// Minimum number of historical deadlines required to train.
    pub fn min_records(&self) -> usize {
        self.min_records
    }

    /// Predict the next deadline for a funder pattern.
    ///
    /// Trains (or reuses a fresh cached) seasonal model when the pattern has
    /// enough history, scanning `horizon_years` of future dates for the one
    /// whose calendar day-of-year best agrees with the model's seasonal
    /// curve. Falls back to the rule-based predictor on insufficient data or
    /// fit failure; the result's `method` tag records which path ran.
    pub fn predict(
        &self,
        pattern: &FunderPattern,
        today: NaiveDate,
        horizon_years: u32,
        lookahead_months: u32,
    ) -> MethodForecast {
        if pattern.dates.len() < self.min_records {
            return self.rule_based(pattern, today, lookahead_months);
        }

        let model = match self.model_for(&pattern.funder, &pattern.dates) {
            Ok(model) => model,
            Err(e) => {
                warn!(
                    "seasonal model fit failed for funder '{}': {}; using rule-based prediction",
                    pattern.funder, e
                );
                return self.rule_based(pattern, today, lookahead_months);
            }
        };

        let predicted_date = select_date(&model, today, horizon_years);
        let width = model.interval_width();
        let half = Duration::days((width / 2.0).round() as i64);

        MethodForecast {
            funder: pattern.funder.clone(),
            predicted_date,
            confidence: interval_confidence(width),
            method: PredictionMethod::Ml,
            uncertainty_days: Some(round2(width)),
            lower_bound: Some(predicted_date - half),
            upper_bound: Some(predicted_date + half),
        }
    }

    /// Analyze a funder from the repository and predict with fallback.
    pub async fn predict_for_funder(
        &self,
        repo: &dyn DeadlineHistoryRepository,
        funder_query: &str,
        lookback_years: u32,
        today: NaiveDate,
        horizon_years: u32,
        lookahead_months: u32,
    ) -> RepositoryResult<MethodForecast> {
        let pattern = analyze_funder(repo, funder_query, lookback_years, today).await?;
        Ok(self.predict(&pattern, today, horizon_years, lookahead_months))
    }

    /// Drop the cached model for one funder.
    pub fn invalidate(&self, funder: &str) {
        self.models.write().remove(funder);
    }

    /// Drop all cached models.
    pub fn invalidate_all(&self) {
        self.models.write().clear();
    }

    /// Snapshot of which funders currently have cached models.
    pub fn stats(&self) -> CacheStats {
        let mut cached_funders: Vec<String> = self.models.read().keys().cloned().collect();
        cached_funders.sort();
        CacheStats {
            cached_funders,
            staleness_hours: self.staleness_hours,
        }
    }

    fn model_for(&self, funder: &str, dates: &[NaiveDate]) -> Result<SeasonalModel, FitError> {
        let now = Utc::now();
        {
            let cache = self.models.read();
            if let Some(cached) = cache.get(funder) {
                if now - cached.trained_at < Duration::hours(self.staleness_hours) {
                    return Ok(cached.model.clone());
                }
            }
        }

        // Train outside the lock; a concurrent caller may duplicate this
        // work, and the last writer wins.
        let model = SeasonalModel::fit(dates)?;
        self.models.write().insert(
            funder.to_string(),
            CachedModel {
                model: model.clone(),
                trained_at: now,
            },
        );
        Ok(model)
    }

    fn rule_based(
        &self,
        pattern: &FunderPattern,
        today: NaiveDate,
        lookahead_months: u32,
    ) -> MethodForecast {
        let predicted = predict_next(pattern, today, lookahead_months);
        let shared = confidence_score(
            pattern.records_count,
            pattern.years_span(),
            month_consistency(&pattern.month_observations),
        );
        MethodForecast {
            funder: pattern.funder.clone(),
            predicted_date: predicted.date,
            confidence: round2(0.8 * shared + 0.2 * predicted.day_confidence),
            method: PredictionMethod::RuleBased,
            uncertainty_days: None,
            lower_bound: None,
            upper_bound: None,
        }
    }
}

impl Default for SeasonalPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&ForecastSettings> for SeasonalPredictor {
    fn from(settings: &ForecastSettings) -> Self {
        Self::with_settings(
            settings.cache_staleness_hours,
            settings.seasonal_min_records,
        )
    }
}

/// Choose the future date that best agrees with the model's seasonal curve.
///
/// Scans forward day by day; the first contiguous run of dates whose
/// predicted and actual day-of-year agree within tolerance is the funder's
/// next cycle, and the best-agreeing date inside that run is returned. A
/// marginally tighter fit in a later year never supersedes the upcoming
/// occurrence. When no date qualifies, falls back to the first future date
/// whose actual day-of-year equals the mean predicted day-of-year, then to
/// tomorrow.
fn select_date(model: &SeasonalModel, today: NaiveDate, horizon_years: u32) -> NaiveDate {
    let horizon_days = horizon_years.max(1) as i64 * 366;

    let mut window_best: Option<(f64, NaiveDate)> = None;
    let mut predicted_sum = 0.0;
    for offset in 1..=horizon_days {
        let date = today + Duration::days(offset);
        let predicted = model.predict_day_of_year(date);
        predicted_sum += predicted;
        let diff = circular_doy_distance(predicted, day_of_year(date) as f64);
        if diff <= SELF_CONSISTENCY_TOLERANCE_DAYS {
            if window_best.map_or(true, |(best_diff, _)| diff < best_diff) {
                window_best = Some((diff, date));
            }
        } else if let Some((_, best_date)) = window_best {
            // The qualifying run has ended; its minimum is the next cycle.
            return best_date;
        }
    }

    if let Some((_, date)) = window_best {
        return date;
    }

    // Mean-day-of-year fallback
    let mean_doy = (predicted_sum / horizon_days as f64).round();
    if (1.0..=366.0).contains(&mean_doy) {
        for offset in 1..=horizon_days {
            let date = today + Duration::days(offset);
            if day_of_year(date) as f64 == mean_doy {
                return date;
            }
        }
    }

    today + Duration::days(1)
}

/// Map interval width onto [0.5, 0.95]: wider interval, lower confidence.
fn interval_confidence(width_days: f64) -> f64 {
    let normalized = (width_days / INTERVAL_CEILING_DAYS).clamp(0.0, 1.0);
    let span = MODEL_CONFIDENCE_CEILING - MODEL_CONFIDENCE_FLOOR;
    round2(MODEL_CONFIDENCE_CEILING - normalized * span)
}
