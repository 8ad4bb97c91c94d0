use serde::{Deserialize, Serialize};

use crate::form::{FormResult, parse_form};
use crate::standings::LeagueStanding;

// Table slot used when a team's position is unknown.
const NEUTRAL_POSITION: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

/// Per-match view of one team, rebuilt on every prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub name: String,
    pub position: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub games_played: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub form: Vec<FormResult>,
    pub avg_goals_scored: f64,
    pub avg_goals_conceded: f64,
    // Venue splits. The standings feed only carries totals, so these are usually
    // None and `venue_splits` derives them from the season averages.
    pub home_goals_scored: Option<f64>,
    pub home_goals_conceded: Option<f64>,
    pub away_goals_scored: Option<f64>,
    pub away_goals_conceded: Option<f64>,
    pub home_games: Option<u32>,
    pub away_games: Option<u32>,
}

impl TeamStats {
    /// Builds stats for `name` from its standings row. The row's `won` count is
    /// attributed to the venue the team plays at in this fixture. A row without
    /// a position (0) is placed mid-table.
    pub fn from_standing(name: &str, row: &LeagueStanding, side: Side) -> Self {
        let games = row.played_games.max(1) as f64;
        let (home_wins, away_wins) = match side {
            Side::Home => (row.won, 0),
            Side::Away => (0, row.won),
        };
        Self {
            name: name.to_string(),
            position: if row.position == 0 {
                NEUTRAL_POSITION
            } else {
                row.position
            },
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            games_played: row.played_games,
            home_wins,
            away_wins,
            form: row.form.as_deref().map(parse_form).unwrap_or_default(),
            avg_goals_scored: row.goals_for as f64 / games,
            avg_goals_conceded: row.goals_against as f64 / games,
            home_goals_scored: None,
            home_goals_conceded: None,
            away_goals_scored: None,
            away_goals_conceded: None,
            home_games: None,
            away_games: None,
        }
    }

    /// Mid-table placeholder for a team with no standings row. It carries no
    /// form history, so its form score is the neutral 50.
    pub fn neutral(name: &str, side: Side) -> Self {
        let (home_wins, away_wins) = match side {
            Side::Home => (3, 2),
            Side::Away => (2, 3),
        };
        Self {
            name: name.to_string(),
            position: NEUTRAL_POSITION,
            goals_for: 15,
            goals_against: 15,
            games_played: 12,
            home_wins,
            away_wins,
            form: Vec::new(),
            avg_goals_scored: 1.25,
            avg_goals_conceded: 1.25,
            home_goals_scored: None,
            home_goals_conceded: None,
            away_goals_scored: None,
            away_goals_conceded: None,
            home_games: None,
            away_games: None,
        }
    }

    pub fn attack_at_home(&self) -> f64 {
        self.home_goals_scored
            .unwrap_or(self.avg_goals_scored * 1.15)
    }

    pub fn defense_at_home(&self) -> f64 {
        self.home_goals_conceded
            .unwrap_or(self.avg_goals_conceded * 0.9)
    }

    pub fn attack_away(&self) -> f64 {
        self.away_goals_scored
            .unwrap_or(self.avg_goals_scored * 0.85)
    }

    pub fn defense_away(&self) -> f64 {
        self.away_goals_conceded
            .unwrap_or(self.avg_goals_conceded * 1.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VenueSplits {
    pub home_attack_at_home: f64,
    pub home_defense_at_home: f64,
    pub away_attack_away: f64,
    pub away_defense_away: f64,
}

pub fn venue_splits(home: &TeamStats, away: &TeamStats) -> VenueSplits {
    VenueSplits {
        home_attack_at_home: home.attack_at_home(),
        home_defense_at_home: home.defense_at_home(),
        away_attack_away: away.attack_away(),
        away_defense_away: away.defense_away(),
    }
}
