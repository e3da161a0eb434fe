//! Weighted rubric scoring
//!
//! Converts four sub-scores into an overall score and a disposition. Pure:
//! no side effects, no I/O. The overall score carries full floating
//! precision; rounding happens at the presentation boundary, never here.

use peerflow_common::db::models::Disposition;
use peerflow_common::errors::{AppError, Result};

/// Overall scores below this request changes
pub const CHANGES_REQUESTED_BELOW: f64 = 60.0;

/// Overall scores at or above this are approved
pub const APPROVED_AT_OR_ABOVE: f64 = 80.0;

/// Tolerance for the weight-sum check
const WEIGHT_SUM_EPSILON: f64 = 1e-9;

/// The fixed four-dimension weighting. Weights must sum to exactly 1.0;
/// construction fails fast otherwise.
#[derive(Debug, Clone, Copy)]
pub struct RubricWeights {
    functionality: f64,
    code_quality: f64,
    best_practices: f64,
    documentation: f64,
}

impl RubricWeights {
    /// Build a weight set, validating each weight and the sum
    pub fn new(
        functionality: f64,
        code_quality: f64,
        best_practices: f64,
        documentation: f64,
    ) -> Result<Self> {
        let weights = [functionality, code_quality, best_practices, documentation];

        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::Configuration {
                message: "rubric weights must be finite and non-negative".to_string(),
            });
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(AppError::Configuration {
                message: format!("rubric weights must sum to 1.0, got {}", sum),
            });
        }

        Ok(Self {
            functionality,
            code_quality,
            best_practices,
            documentation,
        })
    }

    /// The production weighting: functionality 40%, code quality 30%,
    /// best practices 20%, documentation 10%.
    pub fn standard() -> Self {
        Self {
            functionality: 0.40,
            code_quality: 0.30,
            best_practices: 0.20,
            documentation: 0.10,
        }
    }

    /// Score a set of sub-scores.
    ///
    /// Any absent sub-score means the review is feedback-only: overall is
    /// `None` and the disposition is `Pending`.
    pub fn score(&self, scores: &SubScores) -> RubricOutcome {
        let (Some(functionality), Some(code_quality), Some(best_practices), Some(documentation)) = (
            scores.functionality,
            scores.code_quality,
            scores.best_practices,
            scores.documentation,
        ) else {
            return RubricOutcome {
                overall: None,
                disposition: Disposition::Pending,
            };
        };

        let overall = self.functionality * f64::from(functionality)
            + self.code_quality * f64::from(code_quality)
            + self.best_practices * f64::from(best_practices)
            + self.documentation * f64::from(documentation);

        let disposition = if overall < CHANGES_REQUESTED_BELOW {
            Disposition::ChangesRequested
        } else if overall >= APPROVED_AT_OR_ABOVE {
            Disposition::Approved
        } else {
            Disposition::Completed
        };

        RubricOutcome {
            overall: Some(overall),
            disposition,
        }
    }
}

/// The four rubric sub-scores, each optional and bounded to [0, 100]
#[derive(Debug, Clone, Copy, Default)]
pub struct SubScores {
    pub functionality: Option<i32>,
    pub code_quality: Option<i32>,
    pub best_practices: Option<i32>,
    pub documentation: Option<i32>,
}

impl SubScores {
    /// Build a sub-score set, rejecting values outside [0, 100]
    pub fn new(
        functionality: Option<i32>,
        code_quality: Option<i32>,
        best_practices: Option<i32>,
        documentation: Option<i32>,
    ) -> Result<Self> {
        let fields = [
            ("functionality", functionality),
            ("code_quality", code_quality),
            ("best_practices", best_practices),
            ("documentation", documentation),
        ];

        for (field, value) in fields {
            if let Some(v) = value {
                if !(0..=100).contains(&v) {
                    return Err(AppError::InvalidScore {
                        field: field.to_string(),
                        value: v.into(),
                    });
                }
            }
        }

        Ok(Self {
            functionality,
            code_quality,
            best_practices,
            documentation,
        })
    }

    /// True when all four sub-scores are present
    pub fn is_complete(&self) -> bool {
        self.functionality.is_some()
            && self.code_quality.is_some()
            && self.best_practices.is_some()
            && self.documentation.is_some()
    }
}

/// Result of scoring one review
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RubricOutcome {
    /// Weighted overall score at full precision; `None` when any
    /// sub-score is absent
    pub overall: Option<f64>,

    pub disposition: Disposition,
}

impl RubricOutcome {
    /// Overall score rounded to the nearest integer, for presentation
    pub fn overall_rounded(&self) -> Option<i64> {
        self.overall.map(|s| s.round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(f: i32, c: i32, b: i32, d: i32) -> SubScores {
        SubScores::new(Some(f), Some(c), Some(b), Some(d)).unwrap()
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        assert!(RubricWeights::new(0.40, 0.30, 0.20, 0.10).is_ok());
        assert!(RubricWeights::new(0.40, 0.30, 0.20, 0.20).is_err());
        assert!(RubricWeights::new(0.25, 0.25, 0.25, 0.24).is_err());
    }

    #[test]
    fn test_weights_reject_negative_and_non_finite() {
        assert!(RubricWeights::new(-0.1, 0.5, 0.4, 0.2).is_err());
        assert!(RubricWeights::new(f64::NAN, 0.3, 0.2, 0.1).is_err());
        assert!(RubricWeights::new(f64::INFINITY, 0.3, 0.2, 0.1).is_err());
    }

    #[test]
    fn test_missing_subscore_means_pending() {
        let weights = RubricWeights::standard();

        let partial = SubScores::new(Some(90), Some(85), None, Some(70)).unwrap();
        let outcome = weights.score(&partial);
        assert_eq!(outcome.overall, None);
        assert_eq!(outcome.disposition, Disposition::Pending);

        let empty = SubScores::default();
        let outcome = weights.score(&empty);
        assert_eq!(outcome.overall, None);
        assert_eq!(outcome.disposition, Disposition::Pending);
    }

    #[test]
    fn test_weighted_sum_exact() {
        // 0.4*90 + 0.3*85 + 0.2*80 + 0.1*70 = 36 + 25.5 + 16 + 7 = 84.5
        let weights = RubricWeights::standard();
        let outcome = weights.score(&complete(90, 85, 80, 70));

        let overall = outcome.overall.unwrap();
        assert!((overall - 84.5).abs() < 1e-9);
        assert_eq!(outcome.disposition, Disposition::Approved);
        assert_eq!(outcome.overall_rounded(), Some(85));
    }

    #[test]
    fn test_threshold_law() {
        let weights = RubricWeights::standard();

        // All four at the same value gives overall == that value
        let outcome = weights.score(&complete(59, 59, 59, 59));
        assert_eq!(outcome.disposition, Disposition::ChangesRequested);

        let outcome = weights.score(&complete(60, 60, 60, 60));
        assert_eq!(outcome.disposition, Disposition::Completed);

        let outcome = weights.score(&complete(79, 79, 79, 79));
        assert_eq!(outcome.disposition, Disposition::Completed);

        let outcome = weights.score(&complete(80, 80, 80, 80));
        assert_eq!(outcome.disposition, Disposition::Approved);

        let outcome = weights.score(&complete(0, 0, 0, 0));
        assert_eq!(outcome.disposition, Disposition::ChangesRequested);

        let outcome = weights.score(&complete(100, 100, 100, 100));
        assert_eq!(outcome.disposition, Disposition::Approved);
        assert!((outcome.overall.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_subscores_bounds() {
        assert!(SubScores::new(Some(101), None, None, None).is_err());
        assert!(SubScores::new(None, Some(-1), None, None).is_err());
        assert!(SubScores::new(Some(0), Some(100), None, None).is_ok());
    }
}
