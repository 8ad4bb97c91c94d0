use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use redzone_engine::engine::{MatchInput, PredictionEngine, PredictionResult, prompt_context};
use redzone_engine::fake_league::fake_standings;
use redzone_engine::league_params::League;
use redzone_engine::standings::{JsonStandingsFile, MemoryStandings, StandingsStore};
use redzone_engine::{EngineConfig, logging};

const DEMO_SEED: u64 = 2026;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init("warn");

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_usage();
        return Ok(());
    }

    let league = match arg_value(&args, "--league") {
        Some(code) => code.parse::<League>()?,
        None => League::default(),
    };
    let match_path = arg_value(&args, "--match")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("missing --match <file.json>"))?;
    let raw = fs::read_to_string(&match_path)
        .with_context(|| format!("read match file {}", match_path.display()))?;
    let inputs = parse_matches(&raw).context("parse match file")?;

    let store: Box<dyn StandingsStore> = if has_flag(&args, "--demo") {
        Box::new(MemoryStandings::new(fake_standings(DEMO_SEED, league, 12)))
    } else if let Some(path) = arg_value(&args, "--standings") {
        Box::new(JsonStandingsFile::new(path))
    } else {
        Box::new(MemoryStandings::default())
    };

    let engine = PredictionEngine::new(EngineConfig::from_env());
    let results = engine.predict_many(&inputs, league, store.as_ref());

    let json = has_flag(&args, "--json");
    let context = has_flag(&args, "--context");
    let mut out = Vec::new();
    for (input, result) in inputs.iter().zip(results) {
        let prediction = result.with_context(|| format!("predict {}", match_label(input)))?;
        if json {
            out.push(prediction);
            continue;
        }
        print_prediction(input, &prediction);
        if context {
            println!();
            println!("{}", prompt_context(input, &prediction));
        }
        println!();
    }

    if json {
        let rendered = if out.len() == 1 {
            serde_json::to_string_pretty(&out[0])
        } else {
            serde_json::to_string_pretty(&out)
        }
        .context("serialize predictions")?;
        println!("{rendered}");
    }

    Ok(())
}

/// Accepts one match object or an array of them.
fn parse_matches(raw: &str) -> Result<Vec<MatchInput>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

fn match_label(input: &MatchInput) -> String {
    format!("{} vs {}", input.home_team, input.away_team)
}

fn print_prediction(input: &MatchInput, p: &PredictionResult) {
    println!("{}", match_label(input));
    if !input.start_time.is_empty() {
        println!("Kickoff: {}", input.start_time);
    }
    println!(
        "1X2: {}% / {}% / {}%",
        p.home_win_prob, p.draw_prob, p.away_win_prob
    );
    println!(
        "xG: {:.2} - {:.2}",
        p.expected_goals_home, p.expected_goals_away
    );
    println!(
        "Over 1.5/2.5/3.5: {}% / {}% / {}%  BTTS: {}%",
        p.over15_prob, p.over25_prob, p.over35_prob, p.btts_prob
    );
    let scores = p
        .score_matrix
        .iter()
        .map(|s| format!("{} ({:.1}%)", s.label(), s.prob * 100.0))
        .collect::<Vec<_>>()
        .join(", ");
    println!("Most likely: {}  [{scores}]", p.most_likely_score);
    println!(
        "Form: {} / {}  Strength: {} / {}",
        p.form_score.home, p.form_score.away, p.strength_index.home, p.strength_index.away
    );
    for edge in &p.value_edges {
        println!(
            "  {:<14} calc {:>3}% implied {:>3}% edge {:+.1} {}{}",
            edge.label,
            edge.calculated_prob,
            edge.implied_prob,
            edge.edge,
            edge.rating.as_str(),
            if edge.is_value { " VALUE" } else { "" }
        );
    }
    println!(
        "Confidence: {:?} (+{})",
        p.confidence_level, p.confidence_boost
    );
    for reason in &p.why_this_pick {
        println!(
            "  [{}] {} ({:?}): {}",
            reason.weight, reason.factor, reason.impact, reason.description
        );
    }
    println!("{}", p.analysis);
}

fn print_usage() {
    println!(
        "usage: redzone_engine --match <file.json> [--standings <file.json> | --demo] [--league SA|PL|CL|LL] [--json] [--context]"
    );
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
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
