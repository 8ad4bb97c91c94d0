use serde::{Deserialize, Serialize};

use crate::league_params::LeagueAverages;
use crate::poisson::{btts_probability, over_probability, poisson_pmf};
use crate::team_stats::TeamStats;
use crate::value::Market;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prob3 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Prob3 {
    pub fn uniform() -> Self {
        Self {
            home: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            away: 1.0 / 3.0,
        }
    }

    pub fn get(&self, market: Market) -> f64 {
        match market {
            Market::Home => self.home,
            Market::Draw => self.draw,
            Market::Away => self.away,
        }
    }

    /// Integer percentages summing to exactly 100. Rounding residue goes into
    /// the draw, which keeps the favourite's number stable.
    pub fn to_percentages(&self) -> (u8, u8, u8) {
        let home = (self.home * 100.0).round().clamp(0.0, 100.0) as i32;
        let mut away = (self.away * 100.0).round().clamp(0.0, 100.0) as i32;
        if home + away > 100 {
            away = 100 - home;
        }
        let draw = 100 - home - away;
        (home as u8, draw as u8, away as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambdaBounds {
    pub home_min: f64,
    pub home_max: f64,
    pub away_min: f64,
    pub away_max: f64,
}

impl Default for LambdaBounds {
    fn default() -> Self {
        Self {
            home_min: 0.5,
            home_max: 4.0,
            away_min: 0.3,
            away_max: 3.5,
        }
    }
}

impl LambdaBounds {
    pub fn clamp_home(&self, lambda: f64) -> f64 {
        clamp_rate(lambda, self.home_min, self.home_max)
    }

    pub fn clamp_away(&self, lambda: f64) -> f64 {
        clamp_rate(lambda, self.away_min, self.away_max)
    }
}

fn clamp_rate(lambda: f64, lo: f64, hi: f64) -> f64 {
    if !lambda.is_finite() {
        return lo;
    }
    lambda.clamp(lo, hi)
}

/// Fixed multiplicative home advantage, applied to every league alike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VenueFactors {
    pub home: f64,
    pub away: f64,
}

impl Default for VenueFactors {
    fn default() -> Self {
        Self {
            home: 1.15,
            away: 0.85,
        }
    }
}

/// Poisson rate for one side. Strength inputs are on a 0..100-ish scale where
/// 50 is league average.
pub fn expected_goals(
    attack_strength: f64,
    defense_weakness: f64,
    league_avg: f64,
    venue_factor: f64,
) -> f64 {
    league_avg * (attack_strength / 50.0) * (defense_weakness / 50.0) * venue_factor
}

fn attack_rating(stats: &TeamStats) -> f64 {
    stats.avg_goals_scored * 40.0 + 20.0
}

fn defense_weakness(stats: &TeamStats) -> f64 {
    stats.avg_goals_conceded * 40.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambdas {
    pub home: f64,
    pub away: f64,
    pub home_raw: f64,
    pub away_raw: f64,
}

pub fn match_lambdas(
    home: &TeamStats,
    away: &TeamStats,
    averages: &LeagueAverages,
    venue: &VenueFactors,
    bounds: &LambdaBounds,
) -> Lambdas {
    let home_raw = expected_goals(
        attack_rating(home),
        defense_weakness(away),
        averages.home_goals,
        venue.home,
    );
    let away_raw = expected_goals(
        attack_rating(away),
        defense_weakness(home),
        averages.away_goals,
        venue.away,
    );
    Lambdas {
        home: bounds.clamp_home(home_raw),
        away: bounds.clamp_away(away_raw),
        home_raw,
        away_raw,
    }
}

/// 1X2 probabilities from the truncated score grid, renormalized to sum to 1.
pub fn outcome_probabilities(lambda_home: f64, lambda_away: f64, max_goals: u32) -> Prob3 {
    let pmf_h = poisson_pmf(lambda_home, max_goals);
    let pmf_a = poisson_pmf(lambda_away, max_goals);

    let mut p_home = 0.0;
    let mut p_draw = 0.0;
    let mut p_away = 0.0;
    for (h, p_h) in pmf_h.iter().enumerate() {
        for (a, p_a) in pmf_a.iter().enumerate() {
            let p = p_h * p_a;
            if h > a {
                p_home += p;
            } else if h == a {
                p_draw += p;
            } else {
                p_away += p;
            }
        }
    }

    let sum = p_home + p_draw + p_away;
    if sum > 0.0 && sum.is_finite() {
        Prob3 {
            home: p_home / sum,
            draw: p_draw / sum,
            away: p_away / sum,
        }
    } else {
        Prob3::uniform()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreProb {
    pub home_goals: u32,
    pub away_goals: u32,
    pub prob: f64,
}

impl ScoreProb {
    pub fn label(&self) -> String {
        format!("{}-{}", self.home_goals, self.away_goals)
    }
}

/// Most likely exact scores on a `0..=max_goals` grid, best first. Ties keep
/// row-major order.
pub fn score_matrix(
    lambda_home: f64,
    lambda_away: f64,
    max_goals: u32,
    top_n: usize,
) -> Vec<ScoreProb> {
    let pmf_h = poisson_pmf(lambda_home, max_goals);
    let pmf_a = poisson_pmf(lambda_away, max_goals);
    let mut scores = Vec::with_capacity(pmf_h.len() * pmf_a.len());
    for (h, p_h) in pmf_h.iter().enumerate() {
        for (a, p_a) in pmf_a.iter().enumerate() {
            scores.push(ScoreProb {
                home_goals: h as u32,
                away_goals: a as u32,
                prob: p_h * p_a,
            });
        }
    }
    scores.sort_by(|x, y| y.prob.total_cmp(&x.prob));
    scores.truncate(top_n);
    scores
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixLimits {
    // Grid for the 1X2 sum; mass past 10 goals is negligible.
    pub outcome_max_goals: u32,
    pub score_max_goals: u32,
    pub score_top_n: usize,
}

impl Default for MatrixLimits {
    fn default() -> Self {
        Self {
            outcome_max_goals: 10,
            score_max_goals: 5,
            score_top_n: 5,
        }
    }
}

/// Everything derivable from the two rates alone.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMarkets {
    pub outcome: Prob3,
    pub over_15: f64,
    pub over_25: f64,
    pub over_35: f64,
    pub btts: f64,
    pub top_scores: Vec<ScoreProb>,
}

impl DerivedMarkets {
    pub fn most_likely_score(&self) -> String {
        self.top_scores
            .first()
            .map(ScoreProb::label)
            .unwrap_or_else(|| "1-1".to_string())
    }
}

pub fn derive_markets(lambda_home: f64, lambda_away: f64, limits: &MatrixLimits) -> DerivedMarkets {
    DerivedMarkets {
        outcome: outcome_probabilities(lambda_home, lambda_away, limits.outcome_max_goals),
        over_15: over_probability(lambda_home, lambda_away, 1),
        over_25: over_probability(lambda_home, lambda_away, 2),
        over_35: over_probability(lambda_home, lambda_away, 3),
        btts: btts_probability(lambda_home, lambda_away),
        top_scores: score_matrix(
            lambda_home,
            lambda_away,
            limits.score_max_goals,
            limits.score_top_n,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team_stats::Side;

    #[test]
    fn outcome_probabilities_sum_to_one() {
        for (h, a) in [(0.5, 0.3), (1.8, 1.1), (4.0, 3.5), (0.5, 3.5)] {
            let p = outcome_probabilities(h, a, 10);
            assert!((p.home + p.draw + p.away - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn percentages_always_total_100() {
        for (h, a) in [(0.5, 0.3), (1.8, 1.1), (4.0, 0.3), (0.5, 3.5), (1.3, 1.3)] {
            let (ph, pd, pa) = outcome_probabilities(h, a, 10).to_percentages();
            assert_eq!(ph as u32 + pd as u32 + pa as u32, 100);
        }
        let edge = Prob3 {
            home: 0.495,
            draw: 0.0,
            away: 0.505,
        };
        let (ph, pd, pa) = edge.to_percentages();
        assert_eq!(ph as u32 + pd as u32 + pa as u32, 100);
    }

    #[test]
    fn typical_rates_favour_low_scores() {
        let markets = derive_markets(1.8, 1.1, &MatrixLimits::default());
        let best = markets.most_likely_score();
        assert!(["1-0", "1-1", "2-1"].contains(&best.as_str()), "best={best}");
        let over25 = (markets.over_25 * 100.0).round() as i32;
        assert!((45..=55).contains(&over25), "over25={over25}");
        assert!(markets.over_15 > markets.over_25 && markets.over_25 > markets.over_35);
        assert_eq!(markets.top_scores.len(), 5);
    }

    #[test]
    fn extreme_attack_is_clamped() {
        let bounds = LambdaBounds::default();
        let raw = expected_goals(1000.0, 100.0, 1.45, 1.15);
        assert!(raw > 4.0);
        assert_eq!(bounds.clamp_home(raw), 4.0);
        assert_eq!(bounds.clamp_home(0.0), 0.5);
        assert_eq!(bounds.clamp_away(f64::NAN), 0.3);
        assert_eq!(bounds.clamp_away(99.0), 3.5);
    }

    #[test]
    fn infinite_rates_fall_to_the_floor() {
        let bounds = LambdaBounds::default();
        assert_eq!(bounds.clamp_home(f64::INFINITY), 0.5);
        assert_eq!(bounds.clamp_home(f64::NEG_INFINITY), 0.5);
        assert_eq!(bounds.clamp_away(f64::INFINITY), 0.3);
        assert_eq!(bounds.clamp_away(f64::NEG_INFINITY), 0.3);
    }

    #[test]
    fn home_advantage_alone_tilts_outcome() {
        let venue = VenueFactors::default();
        let home = expected_goals(70.0, 50.0, 1.3, venue.home);
        let away = expected_goals(70.0, 50.0, 1.3, venue.away);
        let p = outcome_probabilities(home, away, 10);
        assert!(p.home > p.away);
    }

    #[test]
    fn neutral_teams_get_moderate_rates() {
        let home = TeamStats::neutral("H", Side::Home);
        let away = TeamStats::neutral("A", Side::Away);
        let l = match_lambdas(
            &home,
            &away,
            &LeagueAverages::defaults(crate::league_params::League::SerieA),
            &VenueFactors::default(),
            &LambdaBounds::default(),
        );
        // 1.45 * (70 / 50) * (50 / 50) * 1.15
        assert!((l.home - 2.3345).abs() < 1e-9);
        assert!((l.away - 1.3685).abs() < 1e-9);
        assert_eq!(l.home, l.home_raw);
    }

    #[test]
    fn score_matrix_is_sorted() {
        let scores = score_matrix(1.2, 1.2, 5, 36);
        assert_eq!(scores.len(), 36);
        assert!(scores.windows(2).all(|w| w[0].prob >= w[1].prob));
        assert_eq!(scores[0].label(), "1-1");
    }
}
