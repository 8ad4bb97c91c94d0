//! Poisson primitives shared by every goal market.
//!
//! Home and away goals are modelled as two independent Poisson processes; no
//! correlation term is applied to any scoreline.

const FACTORIAL_TABLE_LEN: usize = 21;

const FACTORIALS: [f64; FACTORIAL_TABLE_LEN] = build_factorials();

const fn build_factorials() -> [f64; FACTORIAL_TABLE_LEN] {
    let mut out = [1.0; FACTORIAL_TABLE_LEN];
    let mut k = 1;
    while k < FACTORIAL_TABLE_LEN {
        out[k] = out[k - 1] * k as f64;
        k += 1;
    }
    out
}

pub fn factorial(k: u32) -> f64 {
    let k = k as usize;
    if k < FACTORIAL_TABLE_LEN {
        return FACTORIALS[k];
    }
    let mut acc = FACTORIALS[FACTORIAL_TABLE_LEN - 1];
    for n in FACTORIAL_TABLE_LEN..=k {
        acc *= n as f64;
    }
    acc
}

/// P(X = k) for X ~ Poisson(lambda).
///
/// A non-positive rate is treated as a point mass at zero goals.
pub fn poisson_probability(lambda: f64, k: u32) -> f64 {
    if lambda <= 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    lambda.powi(k as i32) * (-lambda).exp() / factorial(k)
}

/// P(X <= up_to).
pub fn poisson_cumulative(lambda: f64, up_to: u32) -> f64 {
    (0..=up_to).map(|k| poisson_probability(lambda, k)).sum()
}

/// Probability mass for k = 0..=max_k, without folding the tail into the last bucket.
pub fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    (0..=max_k).map(|k| poisson_probability(lambda, k)).collect()
}

/// Probability that the total goals exceed `threshold` (Over `threshold`.5).
pub fn over_probability(lambda_home: f64, lambda_away: f64, threshold: u32) -> f64 {
    let mut under = 0.0;
    for h in 0..=threshold {
        let p_h = poisson_probability(lambda_home, h);
        for a in 0..=(threshold - h) {
            under += p_h * poisson_probability(lambda_away, a);
        }
    }
    (1.0 - under).clamp(0.0, 1.0)
}

/// Both teams to score.
pub fn btts_probability(lambda_home: f64, lambda_away: f64) -> f64 {
    let home_scores = 1.0 - poisson_probability(lambda_home, 0);
    let away_scores = 1.0 - poisson_probability(lambda_away, 0);
    (home_scores * away_scores).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_goals_is_exp_minus_lambda() {
        for lambda in [0.3_f64, 1.0, 1.8, 3.5] {
            let p0 = poisson_probability(lambda, 0);
            assert!((p0 - (-lambda).exp()).abs() < 1e-12);
        }
    }

    #[test]
    fn mass_converges_to_one() {
        for lambda in [0.5, 1.25, 2.7, 4.0] {
            let sum = poisson_cumulative(lambda, 30);
            assert!((sum - 1.0).abs() < 1e-6, "lambda={lambda} sum={sum}");
        }
    }

    #[test]
    fn non_positive_rate_is_point_mass() {
        assert_eq!(poisson_probability(0.0, 0), 1.0);
        assert_eq!(poisson_probability(0.0, 2), 0.0);
        assert_eq!(poisson_probability(-1.0, 0), 1.0);
        assert_eq!(poisson_probability(-1.0, 1), 0.0);
    }

    #[test]
    fn factorial_table_and_tail_agree() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(5), 120.0);
        assert_eq!(factorial(10), 3_628_800.0);
        let tail = factorial(22);
        assert!((tail / (factorial(20) * 21.0 * 22.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn over_probability_decreases_with_threshold() {
        let mut prev = 1.0;
        for threshold in 0..8 {
            let p = over_probability(1.6, 1.2, threshold);
            assert!(p <= prev, "threshold={threshold} p={p} prev={prev}");
            prev = p;
        }
        assert!(over_probability(1.6, 1.2, 1) > over_probability(1.6, 1.2, 3));
    }

    #[test]
    fn btts_stays_in_unit_interval() {
        for (h, a) in [(0.0, 2.0), (0.3, 0.3), (1.5, 1.1), (4.0, 3.5)] {
            let p = btts_probability(h, a);
            assert!((0.0..=1.0).contains(&p));
        }
        assert_eq!(btts_probability(0.0, 2.0), 0.0);
        assert!(btts_probability(0.3, 0.3) > 0.0);
    }

    #[test]
    fn pmf_matches_pointwise() {
        let pmf = poisson_pmf(1.4, 6);
        assert_eq!(pmf.len(), 7);
        assert!((pmf[3] - poisson_probability(1.4, 3)).abs() < 1e-15);
    }
}
