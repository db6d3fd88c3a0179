//! Shared confidence scoring and recurrence classification.
//!
//! Both the heuristic and seasonal prediction paths score through these
//! functions so that confidence values are comparable across methods.

use serde::{Deserialize, Serialize};

/// Round to 2 decimal places for stable, comparable confidence values.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Blend three evidence signals into a confidence score in [0, 1].
///
/// - Record-count factor: `min(record_count / 10, 1.0)`, weight 0.4
/// - Year-span factor: `min(years_span / 3, 1.0)`, weight 0.3
/// - Consistency factor: supplied by the caller, weight 0.3
///
/// The result is a deterministic function of its inputs, clamped to [0, 1]
/// and rounded to 2 decimals.
pub fn confidence_score(record_count: usize, years_span: f64, consistency: f64) -> f64 {
    let count_factor = (record_count as f64 / 10.0).min(1.0);
    let span_factor = (years_span / 3.0).clamp(0.0, 1.0);
    let consistency_factor = consistency.clamp(0.0, 1.0);

    let score = 0.4 * count_factor + 0.3 * span_factor + 0.3 * consistency_factor;
    round2(score.clamp(0.0, 1.0))
}

/// Timing consistency for a list of month observations:
/// `1 - unique_months / total_observations`.
///
/// A funder hitting the same month every cycle scores close to 1.0; a funder
/// spread evenly over new months every cycle scores 0.0.
pub fn month_consistency(months: &[u32]) -> f64 {
    if months.is_empty() {
        return 0.0;
    }
    let unique = {
        let mut seen: Vec<u32> = Vec::new();
        for m in months {
            if !seen.contains(m) {
                seen.push(*m);
            }
        }
        seen.len()
    };
    1.0 - unique as f64 / months.len() as f64
}

/// Coarse label for how often a funder's deadlines repeat within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Monthly,
    Quarterly,
    Biannual,
    Annual,
    Unknown,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Monthly => "monthly",
            Recurrence::Quarterly => "quarterly",
            Recurrence::Biannual => "biannual",
            Recurrence::Annual => "annual",
            Recurrence::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify recurrence from observed month numbers (repeats allowed).
///
/// Counts distinct months: >=10 monthly, >=4 quarterly, >=2 biannual,
/// >=1 annual. Empty input classifies as unknown.
pub fn classify_recurrence(months: &[u32]) -> Recurrence {
    let mut distinct: Vec<u32> = Vec::new();
    for m in months {
        if !distinct.contains(m) {
            distinct.push(*m);
        }
    }

    match distinct.len() {
        0 => Recurrence::Unknown,
        n if n >= 10 => Recurrence::Monthly,
        n if n >= 4 => Recurrence::Quarterly,
        n if n >= 2 => Recurrence::Biannual,
        _ => Recurrence::Annual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_score_full_evidence() {
        // 10+ records over 3+ years with perfect consistency saturates at 1.0
        assert_eq!(confidence_score(10, 3.0, 1.0), 1.0);
        assert_eq!(confidence_score(50, 10.0, 1.0), 1.0);
    }

    #[test]
    fn test_confidence_score_no_evidence() {
        assert_eq!(confidence_score(0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_confidence_score_weights() {
        // Count factor alone: 5/10 * 0.4 = 0.2
        assert_eq!(confidence_score(5, 0.0, 0.0), 0.2);
        // Span factor alone: 1.5/3 * 0.3 = 0.15
        assert_eq!(confidence_score(0, 1.5, 0.0), 0.15);
        // Consistency alone: 0.5 * 0.3 = 0.15
        assert_eq!(confidence_score(0, 0.0, 0.5), 0.15);
    }

    #[test]
    fn test_confidence_monotonic_in_record_count() {
        let mut previous = 0.0;
        for count in 0..20 {
            let score = confidence_score(count, 2.0, 0.5);
            assert!(
                score >= previous,
                "confidence decreased at count={}: {} < {}",
                count,
                score,
                previous
            );
            previous = score;
        }
    }

    #[test]
    fn test_confidence_monotonic_in_years_span() {
        let mut previous = 0.0;
        for tenths in 0..50 {
            let span = tenths as f64 / 10.0;
            let score = confidence_score(5, span, 0.5);
            assert!(score >= previous, "confidence decreased at span={}", span);
            previous = score;
        }
    }

    #[test]
    fn test_confidence_clamps_out_of_range_consistency() {
        assert_eq!(confidence_score(10, 3.0, 5.0), 1.0);
        assert_eq!(confidence_score(0, 0.0, -1.0), 0.0);
    }

    #[test]
    fn test_month_consistency() {
        assert_eq!(month_consistency(&[]), 0.0);
        // Same month every cycle: 1 - 1/4
        assert!((month_consistency(&[3, 3, 3, 3]) - 0.75).abs() < 1e-9);
        // All unique
        assert_eq!(month_consistency(&[1, 2, 3, 4]), 0.0);
    }

    #[test]
    fn test_recurrence_boundaries() {
        // Exactly 10 distinct months -> monthly
        let ten: Vec<u32> = (1..=10).collect();
        assert_eq!(classify_recurrence(&ten), Recurrence::Monthly);
        // 9 distinct -> quarterly
        let nine: Vec<u32> = (1..=9).collect();
        assert_eq!(classify_recurrence(&nine), Recurrence::Quarterly);
        // Exactly 4 distinct -> quarterly
        assert_eq!(classify_recurrence(&[1, 4, 7, 10]), Recurrence::Quarterly);
        // 3 distinct -> biannual
        assert_eq!(classify_recurrence(&[1, 5, 9]), Recurrence::Biannual);
        // 2 distinct -> biannual
        assert_eq!(classify_recurrence(&[3, 9]), Recurrence::Biannual);
        // 1 distinct -> annual
        assert_eq!(classify_recurrence(&[3, 3, 3]), Recurrence::Annual);
        // Empty -> unknown
        assert_eq!(classify_recurrence(&[]), Recurrence::Unknown);
    }

    #[test]
    fn test_recurrence_counts_distinct_not_total() {
        // 12 observations of the same month is still annual
        let months = vec![3; 12];
        assert_eq!(classify_recurrence(&months), Recurrence::Annual);
    }

    #[test]
    fn test_recurrence_serde_lowercase() {
        let json = serde_json::to_string(&Recurrence::Quarterly).unwrap();
        assert_eq!(json, "\"quarterly\"");
    }
}
