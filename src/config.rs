use std::env;
use std::path::PathBuf;

use crate::explain::ExplainThresholds;
use crate::form::FormWeights;
use crate::league_params::{LeagueTable, load_league_overrides};
use crate::model::{LambdaBounds, MatrixLimits, VenueFactors};
use crate::value::ValueThresholds;

const CACHE_DIR: &str = "redzone_engine";

/// Every tunable the engine reads. Tests build one by hand; binaries start from
/// `from_env`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub leagues: LeagueTable,
    pub form_weights: FormWeights,
    pub total_teams: u32,
    pub venue: VenueFactors,
    pub lambda_bounds: LambdaBounds,
    pub matrix: MatrixLimits,
    pub value: ValueThresholds,
    pub explain: ExplainThresholds,
    // Refit the league goal rate from the standings snapshot before predicting.
    pub fit_league_from_standings: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            leagues: LeagueTable::default(),
            form_weights: FormWeights::default(),
            total_teams: 20,
            venue: VenueFactors::default(),
            lambda_bounds: LambdaBounds::default(),
            matrix: MatrixLimits::default(),
            value: ValueThresholds::default(),
            explain: ExplainThresholds::default(),
            fit_league_from_standings: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::new();

        if let Some(v) = env_f64("PREDICT_VALUE_EDGE_MIN") {
            cfg.value.value_edge = v.clamp(0.0, 50.0);
            cfg.explain.value_edge = cfg.value.value_edge;
        }
        if let Some(v) = env_f64("PREDICT_STRONG_EDGE") {
            cfg.value.strong_edge = v.clamp(0.0, 100.0);
        }
        if let Some(v) = env_f64("PREDICT_MODERATE_EDGE") {
            cfg.value.moderate_edge = v.clamp(0.0, 100.0);
        }
        if let Some(v) = env::var("PREDICT_TOTAL_TEAMS")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            cfg.total_teams = v.clamp(2, 64);
        }
        cfg.fit_league_from_standings = env_bool("PREDICT_FIT_LEAGUE", false);

        let params_path = env::var("PREDICT_LEAGUE_PARAMS_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(|| app_cache_dir().map(|dir| dir.join("league_params.json")));
        if let Some(path) = params_path {
            cfg.leagues.apply_overrides(load_league_overrides(&path));
        }

        cfg
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(val) => matches!(
            val.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}
