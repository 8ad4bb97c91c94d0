use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use redzone_engine::engine::{MatchInput, PredictionEngine};
use redzone_engine::fake_league::fake_standings;
use redzone_engine::league_params::League;
use redzone_engine::model::{MatrixLimits, derive_markets, outcome_probabilities};
use redzone_engine::standings::{MemoryStandings, parse_standings_json};
use redzone_engine::team_names::normalize_team_name;
use redzone_engine::value::MatchOdds;

fn fixture(home: &str, away: &str) -> MatchInput {
    MatchInput {
        id: format!("{home}-{away}"),
        home_team: home.to_string(),
        away_team: away.to_string(),
        start_time: String::new(),
        odds: MatchOdds {
            home: 2.1,
            draw: 3.3,
            away: 3.6,
        },
    }
}

fn bench_outcome_matrix(c: &mut Criterion) {
    c.bench_function("outcome_matrix_11x11", |b| {
        b.iter(|| {
            let p = outcome_probabilities(black_box(1.8), black_box(1.1), 10);
            black_box(p.home);
        })
    });
}

fn bench_derive_markets(c: &mut Criterion) {
    let limits = MatrixLimits::default();
    c.bench_function("derive_markets", |b| {
        b.iter(|| {
            let m = derive_markets(black_box(2.3), black_box(1.4), &limits);
            black_box(m.top_scores.len());
        })
    });
}

fn bench_single_prediction(c: &mut Criterion) {
    let engine = PredictionEngine::default();
    let rows = fake_standings(2026, League::SerieA, 12);
    let input = fixture("Inter", "Venezia");
    c.bench_function("predict_single", |b| {
        b.iter(|| {
            let p = engine
                .predict_with_standings(black_box(&input), League::SerieA, &rows)
                .unwrap();
            black_box(p.home_win_prob);
        })
    });
}

fn bench_predict_many(c: &mut Criterion) {
    let engine = PredictionEngine::default();
    let rows = fake_standings(2026, League::SerieA, 12);
    let names: Vec<String> = rows.iter().map(|r| r.team.name.clone()).collect();
    let inputs: Vec<MatchInput> = names
        .chunks(2)
        .map(|pair| fixture(&pair[0], &pair[1]))
        .collect();
    let store = MemoryStandings::new(rows);
    c.bench_function("predict_matchday", |b| {
        b.iter(|| {
            let out = engine.predict_many(black_box(&inputs), League::SerieA, &store);
            black_box(out.len());
        })
    });
}

fn bench_name_normalize(c: &mut Criterion) {
    c.bench_function("normalize_team_name", |b| {
        b.iter(|| {
            black_box(normalize_team_name(black_box("Club Atlético de Madrid")));
            black_box(normalize_team_name(black_box("FC Internazionale Milano")));
        })
    });
}

fn bench_standings_parse(c: &mut Criterion) {
    c.bench_function("standings_parse", |b| {
        b.iter(|| {
            let rows = parse_standings_json(black_box(STANDINGS_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

criterion_group!(
    perf,
    bench_outcome_matrix,
    bench_derive_markets,
    bench_single_prediction,
    bench_predict_many,
    bench_name_normalize,
    bench_standings_parse
);
criterion_main!(perf);

static STANDINGS_JSON: &str = include_str!("../tests/fixtures/football_data_standings.json");
