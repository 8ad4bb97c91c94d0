use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OpenFlags, params};

use crate::config::app_cache_dir;
use crate::standings::{LeagueStanding, StandingTeam, StandingsStore};

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("standings.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS standings (
            league TEXT NOT NULL,
            team_name TEXT NOT NULL,
            team_id INTEGER NOT NULL,
            tla TEXT NOT NULL,
            crest TEXT NOT NULL,
            position INTEGER NOT NULL,
            played_games INTEGER NOT NULL,
            won INTEGER NOT NULL,
            draw INTEGER NOT NULL,
            lost INTEGER NOT NULL,
            points INTEGER NOT NULL,
            goals_for INTEGER NOT NULL,
            goals_against INTEGER NOT NULL,
            goal_difference INTEGER NOT NULL,
            form TEXT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (league, team_name)
        );
        CREATE INDEX IF NOT EXISTS idx_standings_position ON standings(league, position);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Writes `rows` under `league` in one transaction. Rows that carry their own
/// league tag keep it. Returns the number of rows written.
pub fn upsert_standings(
    conn: &mut Connection,
    league: &str,
    rows: &[LeagueStanding],
) -> Result<usize> {
    let updated_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin standings transaction")?;
    let mut written = 0usize;
    for row in rows {
        let tag = row.league.as_deref().unwrap_or(league).to_ascii_uppercase();
        tx.execute(
            r#"
            INSERT INTO standings (
                league, team_name, team_id, tla, crest, position, played_games,
                won, draw, lost, points, goals_for, goals_against, goal_difference,
                form, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            ON CONFLICT(league, team_name) DO UPDATE SET
                team_id = excluded.team_id,
                tla = excluded.tla,
                crest = excluded.crest,
                position = excluded.position,
                played_games = excluded.played_games,
                won = excluded.won,
                draw = excluded.draw,
                lost = excluded.lost,
                points = excluded.points,
                goals_for = excluded.goals_for,
                goals_against = excluded.goals_against,
                goal_difference = excluded.goal_difference,
                form = excluded.form,
                updated_at = excluded.updated_at
            "#,
            params![
                tag,
                row.team.name,
                row.team.id as i64,
                row.team.tla,
                row.team.crest,
                row.position as i64,
                row.played_games as i64,
                row.won as i64,
                row.draw as i64,
                row.lost as i64,
                row.points as i64,
                row.goals_for as i64,
                row.goals_against as i64,
                row.goal_difference as i64,
                row.form,
                updated_at,
            ],
        )
        .with_context(|| format!("upsert standing {}", row.team.name))?;
        written += 1;
    }
    tx.commit().context("commit standings transaction")?;
    Ok(written)
}

/// Loads rows ordered by league and position, optionally for one league tag.
pub fn load_standings(conn: &Connection, league: Option<&str>) -> Result<Vec<LeagueStanding>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                league, team_name, team_id, tla, crest, position, played_games,
                won, draw, lost, points, goals_for, goals_against, goal_difference, form
            FROM standings
            WHERE ?1 IS NULL OR league = ?1
            ORDER BY league ASC, position ASC
            "#,
        )
        .context("prepare load standings query")?;

    let filter = league.map(str::to_ascii_uppercase);
    let rows = stmt
        .query_map(params![filter], |row| {
            Ok(LeagueStanding {
                league: Some(row.get(0)?),
                team: StandingTeam {
                    name: row.get(1)?,
                    id: row.get::<_, u32>(2)?,
                    tla: row.get(3)?,
                    crest: row.get(4)?,
                },
                position: row.get::<_, u32>(5)?,
                played_games: row.get::<_, u32>(6)?,
                won: row.get::<_, u32>(7)?,
                draw: row.get::<_, u32>(8)?,
                lost: row.get::<_, u32>(9)?,
                points: row.get::<_, u32>(10)?,
                goals_for: row.get::<_, u32>(11)?,
                goals_against: row.get::<_, u32>(12)?,
                goal_difference: row.get::<_, i32>(13)?,
                form: row.get(14)?,
            })
        })
        .context("query load standings")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode standing row")?);
    }
    Ok(out)
}

/// `StandingsStore` over a SQLite file. A connection is opened per read, so the
/// store itself is `Send + Sync` and sees whatever the last ingest committed.
#[derive(Debug, Clone)]
pub struct SqliteStandings {
    path: PathBuf,
    league: Option<String>,
}

impl SqliteStandings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            league: None,
        }
    }

    pub fn for_league(mut self, league: &str) -> Self {
        self.league = Some(league.to_string());
        self
    }
}

impl StandingsStore for SqliteStandings {
    /// Reads never create the database; a missing file is an empty table.
    fn standings(&self) -> Result<Vec<LeagueStanding>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("open sqlite db {}", self.path.display()))?;
        load_standings(&conn, self.league.as_deref())
    }
}
