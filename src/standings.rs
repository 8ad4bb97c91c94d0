use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::league_params::League;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingTeam {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub tla: String,
    #[serde(default)]
    pub crest: String,
}

/// One row of a league table, shaped like the football-data.org `TOTAL` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueStanding {
    #[serde(default)]
    pub position: u32,
    pub team: StandingTeam,
    #[serde(default)]
    pub played_games: u32,
    #[serde(default)]
    pub won: u32,
    #[serde(default)]
    pub draw: u32,
    #[serde(default)]
    pub lost: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
    #[serde(default)]
    pub goal_difference: i32,
    // "W,W,D,L,W", most recent first. The feed sends null early in the season.
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
}

/// Read side of whatever keeps the latest league tables.
///
/// The engine only ever takes a snapshot at the start of a prediction, so a
/// store being refreshed concurrently may hand back a partial table. Callers
/// cope with that by falling back to neutral team stats.
pub trait StandingsStore {
    fn standings(&self) -> Result<Vec<LeagueStanding>>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStandings {
    rows: Vec<LeagueStanding>,
}

impl MemoryStandings {
    pub fn new(rows: Vec<LeagueStanding>) -> Self {
        Self { rows }
    }

    pub fn replace(&mut self, rows: Vec<LeagueStanding>) {
        self.rows = rows;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl StandingsStore for MemoryStandings {
    fn standings(&self) -> Result<Vec<LeagueStanding>> {
        Ok(self.rows.clone())
    }
}

impl StandingsStore for [LeagueStanding] {
    fn standings(&self) -> Result<Vec<LeagueStanding>> {
        Ok(self.to_vec())
    }
}

/// Standings persisted as a JSON file (the same document the sync job writes).
#[derive(Debug, Clone)]
pub struct JsonStandingsFile {
    path: PathBuf,
}

impl JsonStandingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, rows: &[LeagueStanding]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string(rows).context("serialize standings")?;
        fs::write(&tmp, json).context("write standings")?;
        fs::rename(&tmp, &self.path).context("swap standings")?;
        Ok(())
    }
}

impl StandingsStore for JsonStandingsFile {
    fn standings(&self) -> Result<Vec<LeagueStanding>> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Ok(Vec::new());
        };
        match parse_standings_json(&raw) {
            Ok(rows) => Ok(rows),
            Err(err) => {
                warn!(path = %self.path.display(), "unreadable standings file: {err:#}");
                Ok(Vec::new())
            }
        }
    }
}

/// Parses either a bare array of rows or a football-data.org `/standings`
/// response. For the latter only the `TOTAL` table is kept and every row is
/// tagged with the competition code when the row carries none.
pub fn parse_standings_json(raw: &str) -> Result<Vec<LeagueStanding>> {
    let value: Value = serde_json::from_str(raw).context("parse standings json")?;
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => {
            serde_json::from_value(value).context("decode standings rows")
        }
        Value::Object(ref obj) => {
            let code = obj
                .get("competition")
                .and_then(|c| c.get("code"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let Some(groups) = obj.get("standings").and_then(Value::as_array) else {
                return Ok(Vec::new());
            };
            let table = groups
                .iter()
                .find(|g| g.get("type").and_then(Value::as_str) == Some("TOTAL"))
                .or_else(|| groups.first())
                .and_then(|g| g.get("table"))
                .cloned()
                .unwrap_or(Value::Null);
            if table.is_null() {
                return Ok(Vec::new());
            }
            let mut rows: Vec<LeagueStanding> =
                serde_json::from_value(table).context("decode standings table")?;
            if let Some(code) = code {
                for row in &mut rows {
                    if row.league.is_none() {
                        row.league = Some(code.clone());
                    }
                }
            }
            Ok(rows)
        }
        _ => Ok(Vec::new()),
    }
}

/// Rows tagged for `league`. Untagged rows are kept so a single-league
/// snapshot without tags still resolves teams.
pub fn filter_league(rows: Vec<LeagueStanding>, league: League) -> Vec<LeagueStanding> {
    rows.into_iter()
        .filter(|row| row.league.as_deref().is_none_or(|tag| league.matches_tag(tag)))
        .collect()
}
