//! Threshold classification
//!
//! Maps a compound score to a [`SentimentLabel`] with a fixed threshold pair.

use crate::error::ReportError;
use crate::types::SentimentLabel;
use serde::{Deserialize, Serialize};

/// Default lower bound of the positive band
pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.05;

/// Default upper bound of the negative band
pub const DEFAULT_NEGATIVE_THRESHOLD: f64 = -0.05;

/// Polarity thresholds; `negative < positive` always holds for a constructed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            positive: DEFAULT_POSITIVE_THRESHOLD,
            negative: DEFAULT_NEGATIVE_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Create a threshold pair, rejecting non-finite or inverted values
    pub fn new(positive: f64, negative: f64) -> Result<Self, ReportError> {
        if !positive.is_finite() || !negative.is_finite() {
            return Err(ReportError::Configuration(format!(
                "thresholds must be finite (positive={positive}, negative={negative})"
            )));
        }
        if negative >= positive {
            return Err(ReportError::Configuration(format!(
                "negative threshold ({negative}) must be below positive threshold ({positive})"
            )));
        }
        Ok(Self { positive, negative })
    }

    /// Label a compound score
    pub fn classify(&self, compound: f64) -> SentimentLabel {
        classify(compound, self.positive, self.negative)
    }
}

/// Label a compound score: `>= pos` is positive, `<= neg` is negative,
/// anything else (NaN included) is neutral.
pub fn classify(compound: f64, pos_threshold: f64, neg_threshold: f64) -> SentimentLabel {
    if compound >= pos_threshold {
        SentimentLabel::Positive
    } else if compound <= neg_threshold {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_boundaries() {
        let thresholds = Thresholds::default();

        assert_eq!(thresholds.classify(0.05), SentimentLabel::Positive);
        assert_eq!(thresholds.classify(-0.05), SentimentLabel::Negative);
        assert_eq!(thresholds.classify(0.0), SentimentLabel::Neutral);
        assert_eq!(thresholds.classify(1.0), SentimentLabel::Positive);
        assert_eq!(thresholds.classify(-1.0), SentimentLabel::Negative);
        assert_eq!(thresholds.classify(0.0499), SentimentLabel::Neutral);
        assert_eq!(thresholds.classify(-0.0499), SentimentLabel::Neutral);
    }

    #[test]
    fn test_label_is_non_decreasing_in_compound() {
        let thresholds = Thresholds::default();
        let mut previous = SentimentLabel::Negative;

        for step in 0..=2000 {
            let compound = -1.0 + step as f64 * 0.001;
            let label = thresholds.classify(compound);
            assert!(label >= previous, "label dropped at {compound}");
            previous = label;
        }
    }

    #[test]
    fn test_invalid_threshold_pairs() {
        assert!(Thresholds::new(0.1, -0.1).is_ok());
        assert!(matches!(
            Thresholds::new(0.0, 0.0),
            Err(ReportError::Configuration(_))
        ));
        assert!(matches!(
            Thresholds::new(-0.2, 0.2),
            Err(ReportError::Configuration(_))
        ));
        assert!(Thresholds::new(f64::NAN, -0.1).is_err());
    }

    #[test]
    fn test_nan_compound_is_neutral() {
        assert_eq!(classify(f64::NAN, 0.05, -0.05), SentimentLabel::Neutral);
    }
}
