//! Public API surface for the forecast engine.
//!
//! This file consolidates the DTO types handed to the surrounding
//! application. All types derive Serialize/Deserialize for JSON
//! serialization.

pub use crate::db::repository::FunderGroup;
pub use crate::db::repository::RepositoryError;
pub use crate::db::repository::RepositoryResult;
pub use crate::db::ForecastSettings;
pub use crate::db::RepositoryConfig;
pub use crate::models::DeadlineHistoryRecord;
pub use crate::models::RawGrantListing;
pub use crate::services::aggregator::ForecastOptions;
pub use crate::services::aggregator::ForecastResult;
pub use crate::services::aggregator::RecommendationSet;
pub use crate::services::aggregator::ResearcherProfile;
pub use crate::services::aggregator::ScoredForecast;
pub use crate::services::extraction::ExtractionReport;
pub use crate::services::heuristic::PredictedDeadline;
pub use crate::services::patterns::FunderPattern;
pub use crate::services::scoring::Recurrence;
pub use crate::services::seasonal::CacheStats;
pub use crate::services::seasonal::MethodForecast;
pub use crate::services::seasonal::PredictionMethod;

#[cfg(test)]
mod tests {
    use super::{ForecastOptions, Recurrence};

    #[test]
    fn test_options_default() {
        let opts = ForecastOptions::default();
        assert_eq!(opts.lookback_years, 3);
        assert_eq!(opts.min_records, 2);
        assert_eq!(opts.lookahead_months, 6);
    }

    #[test]
    fn test_recurrence_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Recurrence::Annual).unwrap(),
            "\"annual\""
        );
        assert_eq!(
            serde_json::to_string(&Recurrence::Quarterly).unwrap(),
            "\"quarterly\""
        );
    }
}
