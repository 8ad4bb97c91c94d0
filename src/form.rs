use serde::{Deserialize, Serialize};

use crate::team_stats::TeamStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    pub fn from_token(raw: &str) -> Option<Self> {
        match raw.trim() {
            "W" | "w" => Some(Self::Win),
            "D" | "d" => Some(Self::Draw),
            "L" | "l" => Some(Self::Loss),
            _ => None,
        }
    }

    fn points(self) -> f64 {
        match self {
            Self::Win => 100.0,
            Self::Draw => 40.0,
            Self::Loss => 0.0,
        }
    }
}

/// Parses a `"W,D,L"` form string, most recent first. Unknown tokens are skipped.
pub fn parse_form(raw: &str) -> Vec<FormResult> {
    raw.split(',').filter_map(FormResult::from_token).collect()
}

/// Recency weights applied to the latest results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormWeights {
    pub recency: Vec<f64>,
    // Weight for positions past the end of `recency`.
    pub fallback: f64,
    pub window: usize,
}

impl Default for FormWeights {
    fn default() -> Self {
        Self {
            recency: vec![0.35, 0.25, 0.20, 0.12, 0.08],
            fallback: 0.05,
            window: 5,
        }
    }
}

impl FormWeights {
    fn weight(&self, index: usize) -> f64 {
        self.recency.get(index).copied().unwrap_or(self.fallback)
    }
}

/// Recency-weighted form score in 0..=100. No history at all is a neutral 50.
pub fn form_score(form: &[FormResult], weights: &FormWeights) -> u8 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (idx, result) in form.iter().take(weights.window).enumerate() {
        let w = weights.weight(idx);
        weighted += result.points() * w;
        total_weight += w;
    }
    if total_weight <= 0.0 {
        return 50;
    }
    (weighted / total_weight).round().clamp(0.0, 100.0) as u8
}

/// Composite 0..=100 rating from table position, goal difference, attack and defense.
pub fn strength_index(stats: &TeamStats, total_teams: u32) -> u8 {
    let position_score = if total_teams > 1 {
        let total = total_teams as f64;
        ((total - stats.position as f64) / (total - 1.0) * 100.0).clamp(0.0, 100.0)
    } else {
        50.0
    };

    let games = stats.games_played.max(1) as f64;
    let gd_per_game = (stats.goals_for as f64 - stats.goals_against as f64) / games;
    let gd_score = (50.0 + gd_per_game * 20.0).clamp(0.0, 100.0);

    let attack_score = (stats.avg_goals_scored / 2.5 * 100.0).min(100.0);
    let defense_score = (100.0 - stats.avg_goals_conceded / 2.0 * 50.0).max(0.0);

    let combined =
        position_score * 0.30 + gd_score * 0.25 + attack_score * 0.25 + defense_score * 0.20;
    combined.round().clamp(0.0, 100.0) as u8
}
