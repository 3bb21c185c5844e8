//! Skewed samplers and deterministic seasonal multipliers.
//!
//! Every function is stateless: randomness comes from the caller's
//! generator, so populators running concurrently never share state.

use std::f64::consts::PI;

use rand::Rng;

/// Exponent used for unit costs; values cluster near the lower bound.
pub const COST_SKEW_EXPONENT: f64 = 2.5;

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 10;

/// Map a uniform draw onto `[min, max]` as `min + (max - min) * u^exponent`.
///
/// With `exponent > 1` most of the mass sits near `min` and a minority
/// reaches towards `max`.
pub fn skewed_magnitude(min: f64, max: f64, exponent: f64, u: f64) -> f64 {
    min + (max - min) * u.powf(exponent)
}

pub fn sample_skewed<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64, exponent: f64) -> f64 {
    skewed_magnitude(min, max, exponent, rng.random::<f64>())
}

/// Box-Muller transform of two uniforms. `u1` must lie in `(0, 1]`.
pub fn standard_normal(u1: f64, u2: f64) -> f64 {
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Round `mean + z * stddev` and clamp into `[1, 10]`.
///
/// Out-of-range draws are clamped rather than resampled, which piles some
/// extra mass onto both ends of the scale.
pub fn score_from_deviate(mean: f64, stddev: f64, z: f64) -> i64 {
    let raw = (mean + z * stddev).round();
    if raw.is_nan() {
        return MIN_SCORE;
    }
    (raw as i64).clamp(MIN_SCORE, MAX_SCORE)
}

pub fn sample_score<R: Rng + ?Sized>(rng: &mut R, mean: f64, stddev: f64) -> i64 {
    // random::<f64>() is [0, 1); flip it so ln() never sees zero
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    score_from_deviate(mean, stddev, standard_normal(u1, u2))
}

/// Revenue multiplier by calendar month (1-12).
pub fn seasonal_revenue_factor(month: u32) -> f64 {
    match month {
        12 => 1.5,
        1 => 0.7,
        6 | 7 => 1.2,
        _ => 1.0,
    }
}

/// Linear growth from 1.0 at the first period to 1.5 at the end of the series.
pub fn traffic_growth_factor(position: u32, periods: u32) -> f64 {
    if periods == 0 {
        return 1.0;
    }
    1.0 + f64::from(position) / f64::from(periods) * 0.5
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn skewed_magnitude_hits_bounds() {
        assert_eq!(skewed_magnitude(30.0, 150.0, 2.5, 0.0), 30.0);
        assert_eq!(skewed_magnitude(30.0, 150.0, 2.5, 1.0), 150.0);
        // u = 0.5 lands well below the midpoint
        assert!(skewed_magnitude(30.0, 150.0, 2.5, 0.5) < 60.0);
    }

    #[test]
    fn skewed_sampler_median_below_midpoint() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut draws: Vec<f64> = (0..10_000)
            .map(|_| sample_skewed(&mut rng, 30.0, 150.0, COST_SKEW_EXPONENT))
            .collect();
        draws.sort_by(f64::total_cmp);

        assert!(draws.iter().all(|value| (30.0..=150.0).contains(value)));
        let median = draws[draws.len() / 2];
        assert!(median < 90.0, "median {median} should sit below 90");
    }

    #[test]
    fn scores_stay_in_range_with_expected_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let scores: Vec<i64> = (0..10_000).map(|_| sample_score(&mut rng, 8.0, 1.5)).collect();

        assert!(scores.iter().all(|score| (MIN_SCORE..=MAX_SCORE).contains(score)));
        let mean = scores.iter().sum::<i64>() as f64 / scores.len() as f64;
        assert!((6.0..=9.0).contains(&mean), "mean {mean} out of [6, 9]");
    }

    #[test]
    fn extreme_deviates_are_clamped() {
        assert_eq!(score_from_deviate(8.0, 1.5, 10.0), MAX_SCORE);
        assert_eq!(score_from_deviate(8.0, 1.5, -10.0), MIN_SCORE);
        assert_eq!(score_from_deviate(8.0, 1.5, f64::INFINITY), MAX_SCORE);
        assert_eq!(score_from_deviate(7.5, 1.8, 0.0), 8);
    }

    #[test]
    fn seasonal_factors() {
        assert_eq!(seasonal_revenue_factor(12), 1.5);
        assert_eq!(seasonal_revenue_factor(1), 0.7);
        assert_eq!(seasonal_revenue_factor(7), 1.2);
        assert_eq!(seasonal_revenue_factor(3), 1.0);
        assert_eq!(traffic_growth_factor(0, 36), 1.0);
        assert!(traffic_growth_factor(35, 36) > traffic_growth_factor(10, 36));
        assert_eq!(traffic_growth_factor(3, 0), 1.0);
    }
}
