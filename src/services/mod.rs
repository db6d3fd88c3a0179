//! Forecasting services over the deadline history store.
//!
//! The layering runs extraction -> pattern analysis -> prediction ->
//! aggregation: [`extraction`] loads raw listings into the store,
//! [`patterns`] derives per-funder statistical summaries, [`heuristic`] and
//! [`seasonal`] turn summaries into next-deadline predictions, and
//! [`aggregator`] fans out across funders and personalizes the result.
//! [`scoring`] holds the confidence and recurrence rules the other modules
//! share.

pub mod aggregator;
pub mod extraction;
pub mod heuristic;
pub mod patterns;
pub mod scoring;
pub mod seasonal;

#[cfg(test)]
mod seasonal_tests;

pub use aggregator::{
    forecast_upcoming, recommend, ForecastOptions, ForecastResult, RecommendationSet,
    ResearcherProfile, ScoredForecast, PROFILE_PROMPT,
};
pub use extraction::{extract_history, ExtractionReport};
pub use heuristic::{predict_next, PredictedDeadline};
pub use patterns::{analyze_funder, compute_pattern, FunderPattern};
pub use scoring::{classify_recurrence, confidence_score, month_consistency, Recurrence};
pub use seasonal::{CacheStats, MethodForecast, PredictionMethod, SeasonalPredictor};
