use serde::{Deserialize, Serialize};

use crate::team_stats::TeamStats;
use crate::value::ValueEdge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhyPickReason {
    pub factor: String,
    pub impact: Impact,
    // 1..=10
    pub weight: u8,
    pub description: String,
}

impl WhyPickReason {
    fn new(factor: &str, impact: Impact, weight: u8, description: String) -> Self {
        Self {
            factor: factor.to_string(),
            impact,
            weight,
            description,
        }
    }
}

/// How much input data backed a prediction.
///
/// This grades data completeness (standings found, enough recent results, a
/// priced edge), not how certain the forecast itself is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn from_boost(boost: u32) -> Self {
        match boost {
            30.. => ConfidenceLevel::VeryHigh,
            20..=29 => ConfidenceLevel::High,
            10..=19 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataCoverage {
    pub home_found: bool,
    pub away_found: bool,
    pub home_form_len: usize,
    pub away_form_len: usize,
    pub any_value: bool,
}

pub fn confidence_boost(coverage: &DataCoverage) -> u32 {
    let mut boost = 0;
    if coverage.home_found {
        boost += 10;
    }
    if coverage.away_found {
        boost += 10;
    }
    if coverage.home_form_len >= 5 {
        boost += 5;
    }
    if coverage.away_form_len >= 5 {
        boost += 5;
    }
    if coverage.any_value {
        boost += 5;
    }
    boost
}

/// Gaps that turn a differential into a stated reason.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplainThresholds {
    pub form_gap: u8,
    pub position_gap: u32,
    pub strength_gap: u8,
    pub high_total_xg: f64,
    pub low_total_xg: f64,
    // Compared against the edge as reported, rounded to one decimal.
    pub value_edge: f64,
    // The summary text only calls out clearer form gaps than the reason list.
    pub summary_form_gap: u8,
}

impl Default for ExplainThresholds {
    fn default() -> Self {
        Self {
            form_gap: 15,
            position_gap: 5,
            strength_gap: 10,
            high_total_xg: 3.0,
            low_total_xg: 2.0,
            value_edge: 5.0,
            summary_form_gap: 20,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PickContext<'a> {
    pub home: &'a TeamStats,
    pub away: &'a TeamStats,
    pub home_form: u8,
    pub away_form: u8,
    pub home_strength: u8,
    pub away_strength: u8,
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub best_value: Option<&'a ValueEdge>,
}

impl PickContext<'_> {
    fn total_xg(&self) -> f64 {
        self.lambda_home + self.lambda_away
    }

    fn home_ahead_in_table(&self, gap: u32) -> bool {
        self.home.position + gap < self.away.position
    }

    fn away_ahead_in_table(&self, gap: u32) -> bool {
        self.away.position + gap < self.home.position
    }
}

/// Rule-based reasons, in fixed rule order.
pub fn why_this_pick(ctx: &PickContext<'_>, t: &ExplainThresholds) -> Vec<WhyPickReason> {
    let mut out = Vec::new();
    let home_name = &ctx.home.name;
    let away_name = &ctx.away.name;

    if ctx.home_form > ctx.away_form.saturating_add(t.form_gap) {
        out.push(WhyPickReason::new(
            "Forma Casa",
            Impact::Positive,
            8,
            format!(
                "{home_name} in forma superiore ({}% vs {}%)",
                ctx.home_form, ctx.away_form
            ),
        ));
    } else if ctx.away_form > ctx.home_form.saturating_add(t.form_gap) {
        out.push(WhyPickReason::new(
            "Forma Ospite",
            Impact::Positive,
            8,
            format!(
                "{away_name} in forma superiore ({}% vs {}%)",
                ctx.away_form, ctx.home_form
            ),
        ));
    }

    if ctx.home_ahead_in_table(t.position_gap) {
        out.push(WhyPickReason::new(
            "Classifica",
            Impact::Positive,
            7,
            format!(
                "{home_name} {}° vs {away_name} {}°",
                ctx.home.position, ctx.away.position
            ),
        ));
    } else if ctx.away_ahead_in_table(t.position_gap) {
        out.push(WhyPickReason::new(
            "Classifica",
            Impact::Negative,
            7,
            format!(
                "Ospite superiore in classifica ({}° vs {}°)",
                ctx.away.position, ctx.home.position
            ),
        ));
    }

    if ctx.home_strength > ctx.away_strength.saturating_add(t.strength_gap) {
        out.push(WhyPickReason::new(
            "Fattore Casa",
            Impact::Positive,
            6,
            format!(
                "Forza casa: {}/100 vs trasferta: {}/100",
                ctx.home_strength, ctx.away_strength
            ),
        ));
    }

    let total_xg = ctx.total_xg();
    if total_xg > t.high_total_xg {
        out.push(WhyPickReason::new(
            "Alto xG",
            Impact::Positive,
            6,
            format!("Expected Goals totale: {total_xg:.1} → Over probabile"),
        ));
    } else if total_xg < t.low_total_xg {
        out.push(WhyPickReason::new(
            "Basso xG",
            Impact::Neutral,
            5,
            format!("Expected Goals totale: {total_xg:.1} → Under probabile"),
        ));
    }

    if let Some(best) = ctx.best_value
        && best.is_value
        && best.edge > t.value_edge
    {
        out.push(WhyPickReason::new(
            "Value Bet",
            Impact::Positive,
            9,
            format!(
                "{} con edge {:.1}% ({})",
                best.label,
                best.edge,
                best.rating.as_str()
            ),
        ));
    }

    out
}

/// Heaviest reasons first; equal weights keep rule order.
pub fn sort_by_weight(reasons: &mut [WhyPickReason]) {
    reasons.sort_by(|a, b| b.weight.cmp(&a.weight));
}

/// One-paragraph summary of the numbers behind a prediction.
pub fn analysis_text(ctx: &PickContext<'_>, t: &ExplainThresholds) -> String {
    let mut parts: Vec<String> = Vec::new();

    if ctx.home_ahead_in_table(t.position_gap) {
        parts.push(format!(
            "{} superiore in classifica ({}° vs {}°).",
            ctx.home.name, ctx.home.position, ctx.away.position
        ));
    } else if ctx.away_ahead_in_table(t.position_gap) {
        parts.push(format!(
            "{} meglio in classifica ({}° vs {}°).",
            ctx.away.name, ctx.away.position, ctx.home.position
        ));
    }

    if ctx.home_form > ctx.away_form.saturating_add(t.summary_form_gap) {
        parts.push(format!(
            "Casa in forma migliore ({}% vs {}%).",
            ctx.home_form, ctx.away_form
        ));
    } else if ctx.away_form > ctx.home_form.saturating_add(t.summary_form_gap) {
        parts.push(format!(
            "Ospite in forma superiore ({}% vs {}%).",
            ctx.away_form, ctx.home_form
        ));
    }

    let total_xg = ctx.total_xg();
    if total_xg > t.high_total_xg {
        parts.push(format!(
            "Alto potenziale offensivo (xG totale: {total_xg:.1}). Over probabile."
        ));
    } else if total_xg < t.low_total_xg {
        parts.push(format!(
            "Partita chiusa prevista (xG totale: {total_xg:.1}). Under favorito."
        ));
    }

    if let Some(best) = ctx.best_value {
        parts.push(format!(
            "VALUE DETECTED: {} con edge +{:.1}%.",
            best.label, best.edge
        ));
    }

    if parts.is_empty() {
        "Analisi statistica completata.".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team_stats::Side;
    use crate::value::{Market, ValueRating};

    fn ctx<'a>(home: &'a TeamStats, away: &'a TeamStats) -> PickContext<'a> {
        PickContext {
            home,
            away,
            home_form: 50,
            away_form: 50,
            home_strength: 50,
            away_strength: 50,
            lambda_home: 1.4,
            lambda_away: 1.1,
            best_value: None,
        }
    }

    fn edge(value: f64) -> ValueEdge {
        ValueEdge {
            market: Market::Home,
            label: Market::Home.label().to_string(),
            calculated_prob: 60,
            implied_prob: 50,
            edge: value,
            is_value: value > 5.0,
            rating: ValueRating::Moderate,
        }
    }

    #[test]
    fn boost_buckets() {
        assert_eq!(ConfidenceLevel::from_boost(0), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_boost(9), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_boost(10), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_boost(25), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_boost(35), ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn full_coverage_is_35() {
        let coverage = DataCoverage {
            home_found: true,
            away_found: true,
            home_form_len: 5,
            away_form_len: 6,
            any_value: true,
        };
        assert_eq!(confidence_boost(&coverage), 35);
        let sparse = DataCoverage {
            home_found: false,
            away_found: false,
            home_form_len: 0,
            away_form_len: 4,
            any_value: true,
        };
        assert_eq!(confidence_boost(&sparse), 5);
    }

    #[test]
    fn balanced_match_gives_no_reasons() {
        let home = TeamStats::neutral("Home", Side::Home);
        let away = TeamStats::neutral("Away", Side::Away);
        let c = ctx(&home, &away);
        let t = ExplainThresholds::default();
        assert!(why_this_pick(&c, &t).is_empty());
        assert_eq!(analysis_text(&c, &t), "Analisi statistica completata.");
    }

    #[test]
    fn rules_fire_in_order() {
        let mut home = TeamStats::neutral("Inter", Side::Home);
        home.position = 1;
        let mut away = TeamStats::neutral("Lecce", Side::Away);
        away.position = 17;
        let best = edge(12.3);
        let c = PickContext {
            home_form: 88,
            away_form: 30,
            home_strength: 80,
            away_strength: 35,
            lambda_home: 2.4,
            lambda_away: 0.9,
            best_value: Some(&best),
            ..ctx(&home, &away)
        };
        let reasons = why_this_pick(&c, &ExplainThresholds::default());
        let factors: Vec<&str> = reasons.iter().map(|r| r.factor.as_str()).collect();
        assert_eq!(
            factors,
            vec!["Forma Casa", "Classifica", "Fattore Casa", "Alto xG", "Value Bet"]
        );
        assert_eq!(reasons[1].description, "Inter 1° vs Lecce 17°");
        assert_eq!(
            reasons[4].description,
            "1 (Casa) con edge 12.3% (MODERATE)"
        );

        let mut sorted = reasons.clone();
        sort_by_weight(&mut sorted);
        assert_eq!(sorted[0].factor, "Value Bet");
        assert_eq!(sorted[3].factor, "Fattore Casa");
        assert_eq!(sorted[4].factor, "Alto xG");

        let text = analysis_text(&c, &ExplainThresholds::default());
        assert!(text.starts_with("Inter superiore in classifica (1° vs 17°)."));
        assert!(text.contains("Casa in forma migliore (88% vs 30%)."));
        assert!(text.ends_with("VALUE DETECTED: 1 (Casa) con edge +12.3%."));
    }

    #[test]
    fn away_side_rules_and_low_scoring() {
        let mut home = TeamStats::neutral("Empoli", Side::Home);
        home.position = 18;
        let mut away = TeamStats::neutral("Napoli", Side::Away);
        away.position = 2;
        let c = PickContext {
            home_form: 20,
            away_form: 70,
            lambda_home: 0.9,
            lambda_away: 0.8,
            ..ctx(&home, &away)
        };
        let reasons = why_this_pick(&c, &ExplainThresholds::default());
        assert_eq!(reasons[0].factor, "Forma Ospite");
        assert_eq!(reasons[1].impact, Impact::Negative);
        assert_eq!(reasons[2].factor, "Basso xG");
        assert_eq!(reasons[2].impact, Impact::Neutral);
        assert_eq!(reasons[2].weight, 5);
    }

    #[test]
    fn weak_edge_is_not_called_out() {
        let home = TeamStats::neutral("H", Side::Home);
        let away = TeamStats::neutral("A", Side::Away);
        let best = edge(4.0);
        let c = PickContext {
            best_value: Some(&best),
            ..ctx(&home, &away)
        };
        assert!(why_this_pick(&c, &ExplainThresholds::default()).is_empty());
    }

    #[test]
    fn edge_rounding_to_threshold_is_not_a_value_bet() {
        let home = TeamStats::neutral("H", Side::Home);
        let away = TeamStats::neutral("A", Side::Away);
        // Raw edge 5.02 is value, but it is reported as 5.0.
        let best = ValueEdge {
            is_value: true,
            rating: ValueRating::Weak,
            ..edge(5.0)
        };
        let c = PickContext {
            best_value: Some(&best),
            ..ctx(&home, &away)
        };
        let t = ExplainThresholds::default();
        assert!(why_this_pick(&c, &t).iter().all(|r| r.factor != "Value Bet"));

        let clear = ValueEdge {
            rating: ValueRating::Weak,
            ..edge(5.1)
        };
        let c = PickContext {
            best_value: Some(&clear),
            ..ctx(&home, &away)
        };
        let reasons = why_this_pick(&c, &t);
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].description, "1 (Casa) con edge 5.1% (WEAK)");
    }
}
