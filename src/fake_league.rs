use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::league_params::League;
use crate::standings::{LeagueStanding, StandingTeam};

const TEAM_NAMES: [&str; 20] = [
    "Inter", "Napoli", "Juventus", "Milan", "Atalanta", "Roma", "Lazio", "Fiorentina",
    "Bologna", "Torino", "Udinese", "Genoa", "Como", "Cagliari", "Lecce", "Verona", "Parma",
    "Empoli", "Monza", "Venezia",
];

/// Deterministic synthetic table for demos and benches. The same seed always
/// yields the same table; rows come back sorted by points with positions set.
pub fn fake_standings(seed: u64, league: League, games: u32) -> Vec<LeagueStanding> {
    let mut rng = StdRng::seed_from_u64(seed);
    let games = games.max(1);
    let n = TEAM_NAMES.len();

    let mut rows: Vec<LeagueStanding> = TEAM_NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            // Earlier names are stronger on average.
            let quality = 1.0 - idx as f64 / n as f64;
            let win_p = 0.15 + 0.45 * quality + rng.gen_range(-0.05..0.05);
            let draw_p = 0.25;

            let mut won = 0;
            let mut draw = 0;
            let mut lost = 0;
            let mut form = Vec::new();
            for _ in 0..games {
                let roll: f64 = rng.gen_range(0.0..1.0);
                let token = if roll < win_p {
                    won += 1;
                    "W"
                } else if roll < win_p + draw_p {
                    draw += 1;
                    "D"
                } else {
                    lost += 1;
                    "L"
                };
                form.insert(0, token);
            }
            form.truncate(5);

            let scored_rate = 0.8 + 1.2 * quality + rng.gen_range(-0.2..0.2);
            let conceded_rate = 1.8 - 1.0 * quality + rng.gen_range(-0.2..0.2);
            let goals_for = (scored_rate * games as f64).round().max(0.0) as u32;
            let goals_against = (conceded_rate * games as f64).round().max(0.0) as u32;

            LeagueStanding {
                position: 0,
                team: StandingTeam {
                    id: 1000 + idx as u32,
                    name: (*name).to_string(),
                    tla: name.chars().take(3).collect::<String>().to_ascii_uppercase(),
                    crest: String::new(),
                },
                played_games: games,
                won,
                draw,
                lost,
                points: won * 3 + draw,
                goals_for,
                goals_against,
                goal_difference: goals_for as i32 - goals_against as i32,
                form: Some(form.join(",")),
                league: Some(league.code().to_string()),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx as u32 + 1;
    }
    rows
}
