//! Facet confidence scoring.
//!
//! Confidence combines two signals: the summed reliability weights of the
//! sources that actually contributed data, and how many of the facet's
//! expected fields ended up filled. The normalization constants are
//! empirically chosen carry-overs kept as tunables rather than re-derived.

use serde::{Deserialize, Serialize};

/// Facet-specific scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTunables {
    /// Divisor applied to the summed source weights before clamping; the
    /// maximum achievable weight sum for the facet.
    pub weight_divisor: f64,
    /// Bonus added when at least `bonus_threshold` expected fields are
    /// filled.
    pub completeness_bonus: f64,
    /// Minimum count of filled expected fields required for the bonus.
    pub bonus_threshold: usize,
}

impl ScoreTunables {
    /// Scoring used when a facet's confidence is exactly the sum of its
    /// contributing source weights (single-source facets, coverage-style
    /// facets where each source carries a fractional weight).
    pub const fn weight_sum() -> Self {
        Self {
            weight_divisor: 1.0,
            completeness_bonus: 0.0,
            bonus_threshold: usize::MAX,
        }
    }
}

impl Default for ScoreTunables {
    fn default() -> Self {
        Self::weight_sum()
    }
}

/// Clamps a score into `[0, 1]`.
pub fn clamp01(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Computes a facet confidence from the reliability weights of contributing
/// sources plus the filled-field count, rounded to two decimals.
pub fn facet_confidence(weights: &[f64], filled: usize, tunables: &ScoreTunables) -> f64 {
    if weights.is_empty() {
        return 0.0;
    }
    let weight_sum: f64 = weights.iter().sum();
    let mut score = clamp01(weight_sum / tunables.weight_divisor.max(f64::EPSILON));
    if filled >= tunables.bonus_threshold {
        score += tunables.completeness_bonus;
    }
    round2(clamp01(score))
}

/// Plain coverage ratio, for callers scoring on found-out-of-total alone.
pub fn coverage(found: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(clamp01(found as f64 / total as f64))
}

fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERVIEW: ScoreTunables = ScoreTunables {
        weight_divisor: 1.6,
        completeness_bonus: 0.1,
        bonus_threshold: 3,
    };

    #[test]
    fn no_contributing_sources_scores_zero() {
        assert_eq!(facet_confidence(&[], 5, &OVERVIEW), 0.0);
    }

    #[test]
    fn weight_sum_normalized_by_divisor() {
        // Wikipedia (0.85) + website (0.75) saturate the 1.6 divisor.
        assert_eq!(facet_confidence(&[0.85, 0.75], 0, &OVERVIEW), 1.0);
        assert_eq!(facet_confidence(&[0.85], 0, &OVERVIEW), 0.53);
    }

    #[test]
    fn completeness_bonus_applies_at_threshold() {
        let sparse = facet_confidence(&[0.85], 2, &OVERVIEW);
        let full = facet_confidence(&[0.85], 3, &OVERVIEW);
        assert_eq!(full, round2(sparse + OVERVIEW.completeness_bonus));
    }

    #[test]
    fn confidence_never_leaves_unit_interval() {
        for weights in [&[][..], &[0.5][..], &[0.9, 0.9, 0.9][..]] {
            for filled in [0usize, 1, 3, 10] {
                let score = facet_confidence(weights, filled, &OVERVIEW);
                assert!((0.0..=1.0).contains(&score), "score {score} out of bounds");
            }
        }
    }

    #[test]
    fn coverage_is_a_plain_ratio() {
        assert_eq!(coverage(3, 4), 0.75);
        assert_eq!(coverage(0, 4), 0.0);
        assert_eq!(coverage(4, 4), 1.0);
        assert_eq!(coverage(1, 0), 0.0);
    }
}
