// Composite signal fusion.
//
// Three per-record signals arrive on wildly different scales: lexical
// importance (mean embedding value), sentiment polarity in [-1, 1], and
// raw engagement counts. Each is min-max normalized onto [0, 1] within
// the batch, then combined as a weighted sum. With non-negative weights
// summing to 1, the composite is itself guaranteed to stay in [0, 1].
//
// A constant signal column carries no ranking information, so it
// normalizes to all zeros instead of dividing by zero. This is logged,
// never thrown.

use tracing::warn;

use crate::error::AnalysisError;

/// Weights must sum to 1 within this tolerance.
const WEIGHT_SUM_TOL: f64 = 1e-6;

/// Fusion weights for the three component signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    /// Weight for the lexical importance signal (default 0.4)
    pub lexical: f64,
    /// Weight for the sentiment polarity signal (default 0.5)
    pub sentiment: f64,
    /// Weight for the engagement signal (default 0.1)
    pub engagement: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            lexical: 0.4,
            sentiment: 0.5,
            engagement: 0.1,
        }
    }
}

impl FusionWeights {
    pub fn sum(&self) -> f64 {
        self.lexical + self.sentiment + self.engagement
    }

    /// Check the weight triple: non-negative, summing to 1.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.lexical < 0.0 || self.sentiment < 0.0 || self.engagement < 0.0 {
            return Err(AnalysisError::Configuration(format!(
                "fusion weights must be non-negative, got {:.3}/{:.3}/{:.3}",
                self.lexical, self.sentiment, self.engagement
            )));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOL {
            return Err(AnalysisError::Configuration(format!(
                "fusion weights must sum to 1, got {sum:.6}"
            )));
        }
        Ok(())
    }

    /// Parse a "lexical,sentiment,engagement" triple such as "0.4,0.5,0.1".
    pub fn parse(spec: &str) -> Result<Self, AnalysisError> {
        let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(AnalysisError::Configuration(format!(
                "expected three comma-separated weights, got {spec:?}"
            )));
        }
        let mut values = [0.0f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                AnalysisError::Configuration(format!("invalid weight {part:?} in {spec:?}"))
            })?;
        }
        let weights = Self {
            lexical: values[0],
            sentiment: values[1],
            engagement: values[2],
        };
        weights.validate()?;
        Ok(weights)
    }
}

/// The normalized component signals and their weighted combination,
/// all aligned index-for-index with the input batch.
#[derive(Debug, Clone)]
pub struct FusedSignals {
    pub lexical: Vec<f64>,
    pub sentiment: Vec<f64>,
    pub engagement: Vec<f64>,
    pub composite: Vec<f64>,
}

/// Min-max normalize an array onto [0, 1].
///
/// `label` names the signal in the degenerate-input warning. A constant
/// array (max == min) normalizes to all zeros.
pub fn min_max_normalize(label: &str, values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        warn!(
            signal = label,
            value = min,
            "Constant signal array — normalizing to all zeros"
        );
        return vec![0.0; values.len()];
    }

    values.iter().map(|&x| (x - min) / range).collect()
}

/// Normalize the three component signals and combine them.
///
/// Side-effect-free: inputs are untouched, outputs are fresh arrays.
pub fn fuse(
    lexical: &[f64],
    sentiment: &[f64],
    engagement: &[f64],
    weights: &FusionWeights,
) -> Result<FusedSignals, AnalysisError> {
    weights.validate()?;

    if sentiment.len() != lexical.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: lexical.len(),
            actual: sentiment.len(),
        });
    }
    if engagement.len() != lexical.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: lexical.len(),
            actual: engagement.len(),
        });
    }

    let lexical = min_max_normalize("lexical", lexical);
    let sentiment = min_max_normalize("sentiment", sentiment);
    let engagement = min_max_normalize("engagement", engagement);

    let composite: Vec<f64> = (0..lexical.len())
        .map(|i| {
            weights.lexical * lexical[i]
                + weights.sentiment * sentiment[i]
                + weights.engagement * engagement[i]
        })
        .collect();

    Ok(FusedSignals {
        lexical,
        sentiment,
        engagement,
        composite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_valid() {
        FusionWeights::default().validate().unwrap();
    }

    #[test]
    fn weights_must_sum_to_one() {
        let weights = FusionWeights {
            lexical: 0.4,
            sentiment: 0.4,
            engagement: 0.1,
        };
        assert!(matches!(
            weights.validate(),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let weights = FusionWeights {
            lexical: -0.1,
            sentiment: 1.0,
            engagement: 0.1,
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn parse_round_trips_default() {
        let weights = FusionWeights::parse("0.4,0.5,0.1").unwrap();
        assert_eq!(weights, FusionWeights::default());
    }

    #[test]
    fn parse_rejects_bad_specs() {
        assert!(FusionWeights::parse("0.4,0.6").is_err());
        assert!(FusionWeights::parse("a,b,c").is_err());
        assert!(FusionWeights::parse("0.5,0.6,0.7").is_err());
    }

    #[test]
    fn normalize_maps_to_unit_interval() {
        let normalized = min_max_normalize("test", &[2.0, 4.0, 6.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn normalize_constant_array_is_all_zeros() {
        let normalized = min_max_normalize("test", &[7.0, 7.0, 7.0]);
        assert_eq!(normalized, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn normalize_empty_is_empty() {
        assert!(min_max_normalize("test", &[]).is_empty());
    }

    #[test]
    fn normalize_is_idempotent_on_unit_spread() {
        // An already-normalized array with min 0 and max 1 maps to itself
        let input = vec![0.0, 0.25, 0.75, 1.0];
        let normalized = min_max_normalize("test", &input);
        for (a, b) in input.iter().zip(&normalized) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn normalize_handles_negative_ranges() {
        let normalized = min_max_normalize("test", &[-1.0, 0.0, 1.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn fuse_composite_stays_in_unit_interval() {
        let fused = fuse(
            &[0.1, 0.9, 0.4],
            &[-0.8, 0.2, 0.9],
            &[0.0, 150.0, 42.0],
            &FusionWeights::default(),
        )
        .unwrap();
        for value in &fused.composite {
            assert!((0.0..=1.0).contains(value), "composite {value} out of range");
        }
    }

    #[test]
    fn fuse_rejects_mismatched_lengths() {
        let result = fuse(&[0.1, 0.2], &[0.3], &[1.0, 2.0], &FusionWeights::default());
        assert!(matches!(
            result,
            Err(AnalysisError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn fuse_all_zero_engagement_normalizes_to_zero() {
        let fused = fuse(
            &[0.1, 0.9],
            &[0.5, -0.5],
            &[0.0, 0.0],
            &FusionWeights::default(),
        )
        .unwrap();
        assert_eq!(fused.engagement, vec![0.0, 0.0]);
    }

    #[test]
    fn fuse_weights_tilt_the_composite() {
        let lexical = [0.0, 1.0];
        let sentiment = [1.0, 0.0];
        let engagement = [0.0, 0.0];

        let sentiment_heavy = FusionWeights {
            lexical: 0.1,
            sentiment: 0.9,
            engagement: 0.0,
        };
        let fused = fuse(&lexical, &sentiment, &engagement, &sentiment_heavy).unwrap();
        assert!(fused.composite[0] > fused.composite[1]);

        let lexical_heavy = FusionWeights {
            lexical: 0.9,
            sentiment: 0.1,
            engagement: 0.0,
        };
        let fused = fuse(&lexical, &sentiment, &engagement, &lexical_heavy).unwrap();
        assert!(fused.composite[1] > fused.composite[0]);
    }
}
