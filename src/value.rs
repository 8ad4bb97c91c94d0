use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Prob3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Market {
    Home,
    Draw,
    Away,
}

impl Market {
    pub fn label(self) -> &'static str {
        match self {
            Market::Home => "1 (Casa)",
            Market::Draw => "X (Pareggio)",
            Market::Away => "2 (Ospite)",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueRating {
    Strong,
    Moderate,
    Weak,
}

/// Edge cut-offs in percentage points. Heuristics, not fitted against
/// historical returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueThresholds {
    pub value_edge: f64,
    pub strong_edge: f64,
    pub moderate_edge: f64,
}

impl Default for ValueThresholds {
    fn default() -> Self {
        Self {
            value_edge: 5.0,
            strong_edge: 15.0,
            moderate_edge: 8.0,
        }
    }
}

impl ValueRating {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueRating::Strong => "STRONG",
            ValueRating::Moderate => "MODERATE",
            ValueRating::Weak => "WEAK",
        }
    }
}

impl ValueThresholds {
    pub fn rate(&self, edge: f64) -> ValueRating {
        if edge > self.strong_edge {
            ValueRating::Strong
        } else if edge > self.moderate_edge {
            ValueRating::Moderate
        } else {
            ValueRating::Weak
        }
    }
}

/// Decimal odds for the 1X2 market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl MatchOdds {
    pub fn get(&self, market: Market) -> f64 {
        match market {
            Market::Home => self.home,
            Market::Draw => self.draw,
            Market::Away => self.away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEdge {
    pub market: Market,
    pub label: String,
    pub calculated_prob: u8,
    pub implied_prob: u8,
    pub edge: f64,
    pub is_value: bool,
    pub rating: ValueRating,
}

/// Compares model probabilities against the bookmaker's implied probabilities.
///
/// Returns one edge per 1X2 outcome, best edge first. Odds must already be
/// validated (> 1.0).
pub fn detect_value_bets(
    probs: Prob3,
    odds: &MatchOdds,
    thresholds: &ValueThresholds,
) -> Vec<ValueEdge> {
    let mut edges: Vec<ValueEdge> = [Market::Home, Market::Draw, Market::Away]
        .into_iter()
        .map(|market| {
            let calculated = probs.get(market);
            let implied = 1.0 / odds.get(market);
            let edge = (calculated - implied) * 100.0;
            ValueEdge {
                market,
                label: market.label().to_string(),
                calculated_prob: percent(calculated),
                implied_prob: percent(implied),
                edge: (edge * 10.0).round() / 10.0,
                is_value: edge > thresholds.value_edge,
                rating: thresholds.rate(edge),
            }
        })
        .collect();

    edges.sort_by(|a, b| b.edge.total_cmp(&a.edge));
    edges
}

fn percent(p: f64) -> u8 {
    (p * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_favourite_with_model_edge_is_moderate_value() {
        let probs = Prob3 {
            home: 0.85,
            draw: 0.10,
            away: 0.05,
        };
        let odds = MatchOdds {
            home: 1.30,
            draw: 5.00,
            away: 9.00,
        };
        let edges = detect_value_bets(probs, &odds, &ValueThresholds::default());
        assert_eq!(edges.len(), 3);
        let best = &edges[0];
        assert_eq!(best.market, Market::Home);
        assert_eq!(best.label, "1 (Casa)");
        assert_eq!(best.calculated_prob, 85);
        assert_eq!(best.implied_prob, 77);
        assert!((best.edge - 8.1).abs() < 1e-9);
        assert!(best.is_value);
        assert_eq!(best.rating, ValueRating::Moderate);
    }

    #[test]
    fn fair_odds_have_no_edge() {
        let probs = Prob3 {
            home: 0.5,
            draw: 0.3,
            away: 0.2,
        };
        let odds = MatchOdds {
            home: 1.0 / 0.5,
            draw: 1.0 / 0.3,
            away: 1.0 / 0.2,
        };
        for edge in detect_value_bets(probs, &odds, &ValueThresholds::default()) {
            assert!(edge.edge.abs() < 1e-9, "{edge:?}");
            assert!(!edge.is_value);
            assert_eq!(edge.rating, ValueRating::Weak);
        }
    }

    #[test]
    fn edges_are_sorted_descending() {
        let probs = Prob3 {
            home: 0.30,
            draw: 0.30,
            away: 0.40,
        };
        let odds = MatchOdds {
            home: 2.0,
            draw: 3.2,
            away: 5.0,
        };
        let edges = detect_value_bets(probs, &odds, &ValueThresholds::default());
        assert_eq!(edges[0].market, Market::Away);
        assert_eq!(edges[0].rating, ValueRating::Strong);
        assert!(edges.windows(2).all(|w| w[0].edge >= w[1].edge));
    }

    #[test]
    fn thresholds_are_configurable() {
        let strict = ValueThresholds {
            value_edge: 10.0,
            ..ValueThresholds::default()
        };
        let probs = Prob3 {
            home: 0.85,
            draw: 0.10,
            away: 0.05,
        };
        let odds = MatchOdds {
            home: 1.30,
            draw: 5.00,
            away: 9.00,
        };
        let edges = detect_value_bets(probs, &odds, &strict);
        assert!(!edges[0].is_value);
    }
}
