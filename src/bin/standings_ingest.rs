use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use redzone_engine::league_params::League;
use redzone_engine::standings::{filter_league, parse_standings_json};
use redzone_engine::{logging, standings_db};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init("info");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let input = arg_value(&args, "--input")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("missing --input <standings.json>"))?;
    let league = match arg_value(&args, "--league") {
        Some(code) => code.parse::<League>()?,
        None => League::default(),
    };
    let db_path = arg_value(&args, "--db")
        .map(PathBuf::from)
        .or_else(standings_db::default_db_path)
        .context("unable to resolve sqlite path")?;

    let raw = fs::read_to_string(&input)
        .with_context(|| format!("read standings {}", input.display()))?;
    let rows = parse_standings_json(&raw)?;
    let total = rows.len();
    let mut rows = filter_league(rows, league);
    for row in &mut rows {
        row.league = Some(league.code().to_string());
    }
    if rows.is_empty() {
        return Err(anyhow!(
            "no {} rows in {} ({total} rows read)",
            league.code(),
            input.display()
        ));
    }

    let mut conn = standings_db::open_db(&db_path)?;
    let written = standings_db::upsert_standings(&mut conn, league.code(), &rows)?;
    info!(league = %league, written, db = %db_path.display(), "standings ingested");

    println!("Standings ingest complete");
    println!("DB: {}", db_path.display());
    println!("League: {} ({})", league.label(), league.code());
    println!("Rows upserted: {written}");
    if total > rows.len() {
        println!("Skipped (other leagues): {}", total - rows.len());
    }

    Ok(())
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
