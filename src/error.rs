use thiserror::Error;

use crate::value::Market;

/// Input-boundary failures. Everything past validation degrades to neutral
/// defaults instead of erroring.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("invalid {market} odds {value}: decimal odds must be finite and greater than 1.0")]
    InvalidOdds { market: Market, value: f64 },

    #[error("unknown league code: {0}")]
    UnknownLeague(String),
}
