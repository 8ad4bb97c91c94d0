use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::PredictionError;
use crate::explain::{
    ConfidenceLevel, DataCoverage, PickContext, WhyPickReason, analysis_text, confidence_boost,
    why_this_pick,
};
use crate::form::{form_score, strength_index};
use crate::league_params::{League, fit_from_standings};
use crate::model::{ScoreProb, derive_markets, match_lambdas};
use crate::standings::{LeagueStanding, StandingsStore, filter_league};
use crate::team_names::{TeamMatch, TeamNameMatcher};
use crate::team_stats::{Side, TeamStats, VenueSplits, venue_splits};
use crate::value::{Market, MatchOdds, ValueEdge, detect_value_bets};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInput {
    #[serde(default)]
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    // ISO 8601, passed through untouched.
    #[serde(default)]
    pub start_time: String,
    pub odds: MatchOdds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePair {
    pub home: u8,
    pub away: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub home_win_prob: u8,
    pub draw_prob: u8,
    pub away_win_prob: u8,
    pub expected_goals_home: f64,
    pub expected_goals_away: f64,
    pub over15_prob: u8,
    pub over25_prob: u8,
    pub over35_prob: u8,
    pub btts_prob: u8,
    pub most_likely_score: String,
    pub score_matrix: Vec<ScoreProb>,
    pub value_edges: Vec<ValueEdge>,
    pub form_score: SidePair,
    pub strength_index: SidePair,
    pub confidence_boost: u32,
    pub confidence_level: ConfidenceLevel,
    pub analysis: String,
    pub why_this_pick: Vec<WhyPickReason>,
    pub home_away_advantage: VenueSplits,
}

impl PredictionResult {
    pub fn best_value(&self) -> Option<&ValueEdge> {
        self.value_edges.iter().find(|e| e.is_value)
    }
}

/// Decimal odds must be finite and strictly greater than 1.0.
pub fn validate_odds(odds: &MatchOdds) -> Result<(), PredictionError> {
    for market in [Market::Home, Market::Draw, Market::Away] {
        let value = odds.get(market);
        if !value.is_finite() || value <= 1.0 {
            return Err(PredictionError::InvalidOdds { market, value });
        }
    }
    Ok(())
}

/// Stateless prediction engine. Cheap to share across threads; every call
/// works on its own standings snapshot.
#[derive(Debug, Clone, Default)]
pub struct PredictionEngine {
    config: EngineConfig,
    names: TeamNameMatcher,
}

impl PredictionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            names: TeamNameMatcher::default(),
        }
    }

    pub fn with_name_matcher(mut self, names: TeamNameMatcher) -> Self {
        self.names = names;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reads a snapshot from `store` and predicts one match. A failing store
    /// is logged and treated as empty, which leaves both teams synthetic.
    pub fn generate_prediction<S>(
        &self,
        input: &MatchInput,
        league: League,
        store: &S,
    ) -> Result<PredictionResult, PredictionError>
    where
        S: StandingsStore + ?Sized,
    {
        let rows = self.snapshot(store, league);
        self.predict_with_standings(input, league, &rows)
    }

    /// Predicts several matches in parallel against one snapshot. Results keep
    /// the order of `inputs`.
    pub fn predict_many<S>(
        &self,
        inputs: &[MatchInput],
        league: League,
        store: &S,
    ) -> Vec<Result<PredictionResult, PredictionError>>
    where
        S: StandingsStore + ?Sized,
    {
        let rows = self.snapshot(store, league);
        inputs
            .par_iter()
            .map(|input| self.predict_with_standings(input, league, &rows))
            .collect()
    }

    fn snapshot<S>(&self, store: &S, league: League) -> Vec<LeagueStanding>
    where
        S: StandingsStore + ?Sized,
    {
        let rows = match store.standings() {
            Ok(rows) => rows,
            Err(err) => {
                warn!("standings unavailable, using neutral stats: {err:#}");
                Vec::new()
            }
        };
        filter_league(rows, league)
    }

    /// Core pipeline over an already filtered snapshot.
    pub fn predict_with_standings(
        &self,
        input: &MatchInput,
        league: League,
        rows: &[LeagueStanding],
    ) -> Result<PredictionResult, PredictionError> {
        validate_odds(&input.odds)?;
        let cfg = &self.config;

        let home_match = self.names.resolve(&input.home_team, rows);
        let away_match = self.names.resolve(&input.away_team, rows);
        let home_found = home_match.is_matched();
        let away_found = away_match.is_matched();
        let home = team_stats(&input.home_team, home_match, Side::Home);
        let away = team_stats(&input.away_team, away_match, Side::Away);
        if !home_found || !away_found {
            debug!(
                home = %input.home_team,
                away = %input.away_team,
                home_found,
                away_found,
                "team missing from standings, using neutral stats"
            );
        }

        let home_strength = strength_index(&home, cfg.total_teams);
        let away_strength = strength_index(&away, cfg.total_teams);
        let home_form = form_score(&home.form, &cfg.form_weights);
        let away_form = form_score(&away.form, &cfg.form_weights);

        let mut averages = cfg.leagues.get(league);
        if cfg.fit_league_from_standings {
            averages = fit_from_standings(league, rows, averages);
        }
        let lambdas = match_lambdas(&home, &away, &averages, &cfg.venue, &cfg.lambda_bounds);
        debug!(
            league = %league,
            lambda_home = lambdas.home,
            lambda_away = lambdas.away,
            raw_home = lambdas.home_raw,
            raw_away = lambdas.away_raw,
            "expected goals"
        );

        let markets = derive_markets(lambdas.home, lambdas.away, &cfg.matrix);
        let (home_pct, draw_pct, away_pct) = markets.outcome.to_percentages();
        let value_edges = detect_value_bets(markets.outcome, &input.odds, &cfg.value);
        let best_value = value_edges.iter().find(|e| e.is_value);

        let boost = confidence_boost(&DataCoverage {
            home_found,
            away_found,
            home_form_len: home.form.len(),
            away_form_len: away.form.len(),
            any_value: best_value.is_some(),
        });

        let ctx = PickContext {
            home: &home,
            away: &away,
            home_form,
            away_form,
            home_strength,
            away_strength,
            lambda_home: lambdas.home,
            lambda_away: lambdas.away,
            best_value,
        };
        let reasons = why_this_pick(&ctx, &cfg.explain);
        let analysis = analysis_text(&ctx, &cfg.explain);

        Ok(PredictionResult {
            home_win_prob: home_pct,
            draw_prob: draw_pct,
            away_win_prob: away_pct,
            expected_goals_home: round2(lambdas.home),
            expected_goals_away: round2(lambdas.away),
            over15_prob: percent(markets.over_15),
            over25_prob: percent(markets.over_25),
            over35_prob: percent(markets.over_35),
            btts_prob: percent(markets.btts),
            most_likely_score: markets.most_likely_score(),
            score_matrix: markets.top_scores,
            form_score: SidePair {
                home: home_form,
                away: away_form,
            },
            strength_index: SidePair {
                home: home_strength,
                away: away_strength,
            },
            confidence_boost: boost,
            confidence_level: ConfidenceLevel::from_boost(boost),
            analysis,
            why_this_pick: reasons,
            home_away_advantage: venue_splits(&home, &away),
            value_edges,
        })
    }
}

fn team_stats(name: &str, found: TeamMatch<'_>, side: Side) -> TeamStats {
    match found.standing() {
        Some(row) => TeamStats::from_standing(name, row, side),
        None => TeamStats::neutral(name, side),
    }
}

fn percent(p: f64) -> u8 {
    (p * 100.0).round().clamp(0.0, 100.0) as u8
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Plain-text block with every number of a prediction, meant to be pasted into
/// a downstream language-model prompt.
pub fn prompt_context(input: &MatchInput, p: &PredictionResult) -> String {
    let home = &input.home_team;
    let away = &input.away_team;
    let value_block: String = p
        .value_edges
        .iter()
        .map(|e| {
            let sign = if e.edge > 0.0 { "+" } else { "" };
            let flag = if e.is_value { " VALUE" } else { "" };
            format!(
                "• {}: Prob Calcolata {}% vs Implicita {}% → Edge: {sign}{:.1}%{flag}\n",
                e.label, e.calculated_prob, e.implied_prob, e.edge
            )
        })
        .collect();

    format!(
        "=== ANALISI MATEMATICA (POISSON) ===\n\n\
         PROBABILITÀ CALCOLATE:\n\
         • Vittoria Casa (1): {}%\n\
         • Pareggio (X): {}%\n\
         • Vittoria Ospite (2): {}%\n\n\
         GOL ATTESI:\n\
         • {home}: {:.2} xG\n\
         • {away}: {:.2} xG\n\
         • Totale: {:.2} xG\n\n\
         MERCATI GOL:\n\
         • Over 1.5: {}%\n\
         • Over 2.5: {}%\n\
         • Over 3.5: {}%\n\
         • BTTS (Entrambe segnano): {}%\n\n\
         RISULTATO PIÙ PROBABILE: {}\n\n\
         ANALISI FORMA:\n\
         • {home}: Form Score {}/100\n\
         • {away}: Form Score {}/100\n\n\
         INDICE DI FORZA:\n\
         • {home}: {}/100\n\
         • {away}: {}/100\n\n\
         VALUE BETTING:\n\
         {value_block}\n\
         CONFIDENZA DATI: {:?} (+{})\n\n\
         {}",
        p.home_win_prob,
        p.draw_prob,
        p.away_win_prob,
        p.expected_goals_home,
        p.expected_goals_away,
        p.expected_goals_home + p.expected_goals_away,
        p.over15_prob,
        p.over25_prob,
        p.over35_prob,
        p.btts_prob,
        p.most_likely_score,
        p.form_score.home,
        p.form_score.away,
        p.strength_index.home,
        p.strength_index.away,
        p.confidence_level,
        p.confidence_boost,
        p.analysis,
    )
}
