pub mod config;
pub mod engine;
pub mod error;
pub mod explain;
pub mod fake_league;
pub mod form;
pub mod league_params;
pub mod logging;
pub mod model;
pub mod poisson;
pub mod standings;
pub mod standings_db;
pub mod team_names;
pub mod team_stats;
pub mod value;

pub use config::EngineConfig;
pub use engine::{MatchInput, PredictionEngine, PredictionResult, prompt_context};
pub use error::PredictionError;
pub use league_params::League;
pub use standings::{LeagueStanding, StandingsStore};
