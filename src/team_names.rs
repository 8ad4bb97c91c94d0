//! Team-name resolution between the odds feed and the standings feed.
//!
//! The two providers spell clubs differently ("Inter" vs "FC Internazionale
//! Milano", "Man Utd" vs "Manchester United FC"). Names are reduced to a compact
//! key (lower-case ASCII letters only) and compared by equality or containment.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::standings::LeagueStanding;

const CLUB_TOKENS: &[&str] = &[
    "fc", "ac", "as", "ssc", "calcio", "football", "club", "sportiva", "us", "cf", "bc", "ss",
    "gnk", "kv", "cd", "sl", "osc", "cp", "afc", "sc", "1907", "1913", "04",
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    // Serie A
    ("inter", "inter"),
    ("internazionale", "inter"),
    ("inter milan", "inter"),
    ("fc internazionale milano", "inter"),
    ("internazionale milano", "inter"),
    ("milan", "milan"),
    ("ac milan", "milan"),
    ("juventus", "juventus"),
    ("juve", "juventus"),
    ("juventus fc", "juventus"),
    ("juventus turin", "juventus"),
    ("roma", "roma"),
    ("as roma", "roma"),
    ("lazio", "lazio"),
    ("ss lazio", "lazio"),
    ("napoli", "napoli"),
    ("ssc napoli", "napoli"),
    ("fiorentina", "fiorentina"),
    ("acf fiorentina", "fiorentina"),
    ("atalanta", "atalanta"),
    ("atalanta bc", "atalanta"),
    ("bologna", "bologna"),
    ("bologna fc", "bologna"),
    ("udinese", "udinese"),
    ("udinese calcio", "udinese"),
    ("torino", "torino"),
    ("torino fc", "torino"),
    ("monza", "monza"),
    ("ac monza", "monza"),
    ("lecce", "lecce"),
    ("us lecce", "lecce"),
    ("verona", "verona"),
    ("hellas verona", "verona"),
    // Premier League
    ("manchester city", "manchestercity"),
    ("man city", "manchestercity"),
    ("manchester united", "manchesterunited"),
    ("man utd", "manchesterunited"),
    ("man united", "manchesterunited"),
    ("tottenham hotspur", "tottenham"),
    ("tottenham", "tottenham"),
    ("spurs", "tottenham"),
    ("aston villa", "astonvilla"),
    ("newcastle united", "newcastle"),
    ("newcastle", "newcastle"),
    ("west ham united", "westham"),
    ("west ham", "westham"),
    ("brighton & hove albion", "brighton"),
    ("brighton and hove albion", "brighton"),
    ("brighton", "brighton"),
    ("wolverhampton wanderers", "wolves"),
    ("wolves", "wolves"),
    ("nottingham forest", "nottingham"),
    ("nottingham", "nottingham"),
    ("crystal palace", "crystalpalace"),
    ("luton town", "luton"),
    ("sheffield united", "sheffield"),
    ("leicester city", "leicester"),
    ("ipswich town", "ipswich"),
    // Europe
    ("real madrid", "realmadrid"),
    ("real madrid cf", "realmadrid"),
    ("barcelona", "barcelona"),
    ("fc barcelona", "barcelona"),
    ("atletico madrid", "atleticomadrid"),
    ("club atletico de madrid", "atleticomadrid"),
    ("atletico de madrid", "atleticomadrid"),
    ("bayern munich", "bayernmunchen"),
    ("bayern munchen", "bayernmunchen"),
    ("fc bayern munchen", "bayernmunchen"),
    ("borussia dortmund", "borussiadortmund"),
    ("bvb", "borussiadortmund"),
    ("bayer leverkusen", "bayerleverkusen"),
    ("bayer 04 leverkusen", "bayerleverkusen"),
    ("leipzig", "rbleipzig"),
    ("rb leipzig", "rbleipzig"),
    ("stuttgart", "vfbstuttgart"),
    ("psg", "parissaintgermain"),
    ("paris saint germain", "parissaintgermain"),
    ("paris sg", "parissaintgermain"),
    ("monaco", "asmonaco"),
    ("lille", "lilleosc"),
    ("brest", "stadebrestois29"),
    ("benfica", "slbenfica"),
    ("sporting cp", "sportingcp"),
    ("sporting lisbon", "sportingcp"),
    ("psv", "psveindhoven"),
    ("feyenoord", "feyenoordrotterdam"),
    ("club brugge", "clubbruggekv"),
    ("shakhtar donetsk", "shakhtardonetsk"),
    ("red star belgrade", "crvenazvezda"),
    ("young boys", "bscyoungboys"),
    ("salzburg", "rbsalzburg"),
    ("sparta prague", "acspartapraha"),
    ("sturm graz", "sksturmgraz"),
    ("dinamo zagreb", "gnkdinamozagreb"),
    ("slovan bratislava", "skslovanbratislava"),
];

static BUILTIN: Lazy<TeamNameMatcher> = Lazy::new(|| TeamNameMatcher {
    aliases: DEFAULT_ALIASES
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect(),
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeamMatch<'a> {
    Matched(&'a LeagueStanding),
    Unmatched,
}

impl<'a> TeamMatch<'a> {
    pub fn standing(self) -> Option<&'a LeagueStanding> {
        match self {
            TeamMatch::Matched(row) => Some(row),
            TeamMatch::Unmatched => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, TeamMatch::Matched(_))
    }
}

#[derive(Debug, Clone)]
pub struct TeamNameMatcher {
    aliases: HashMap<String, String>,
}

impl Default for TeamNameMatcher {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl TeamNameMatcher {
    /// Matcher without any alias entries; only token stripping applies.
    pub fn without_aliases() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Adds or replaces an alias. `from` goes through the same cleanup as
    /// lookups, so accents and punctuation in it are fine.
    pub fn with_alias(mut self, from: &str, canonical: &str) -> Self {
        let key = words(&fold(from)).join(" ");
        self.aliases.insert(key, compact(canonical));
        self
    }

    pub fn normalize(&self, name: &str) -> String {
        let folded = fold(name);
        let all_words = words(&folded);
        if all_words.is_empty() {
            return String::new();
        }

        let phrase = all_words.join(" ");
        if let Some(hit) = self.aliases.get(&phrase) {
            return hit.clone();
        }

        let kept: Vec<&str> = all_words
            .iter()
            .map(String::as_str)
            .filter(|w| !CLUB_TOKENS.contains(w))
            .collect();
        let stripped = kept.join(" ");
        if let Some(hit) = self.aliases.get(&stripped) {
            return hit.clone();
        }

        compact(&stripped)
    }

    /// First standings row whose key equals, contains or is contained by the
    /// key of `name`. Rows are scanned in table order.
    pub fn resolve<'a>(&self, name: &str, rows: &'a [LeagueStanding]) -> TeamMatch<'a> {
        let wanted = self.normalize(name);
        if wanted.is_empty() {
            return TeamMatch::Unmatched;
        }
        rows.iter()
            .find(|row| {
                let candidate = self.normalize(&row.team.name);
                !candidate.is_empty()
                    && (candidate == wanted
                        || candidate.contains(&wanted)
                        || wanted.contains(&candidate))
            })
            .map_or(TeamMatch::Unmatched, TeamMatch::Matched)
    }
}

pub fn normalize_team_name(name: &str) -> String {
    BUILTIN.normalize(name)
}

pub fn resolve_team<'a>(name: &str, rows: &'a [LeagueStanding]) -> TeamMatch<'a> {
    BUILTIN.resolve(name, rows)
}

// Lower-case and strip diacritics ("Atlético" -> "atletico", "München" -> "munchen").
fn fold(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

// Dots are dropped so "U.S. Lecce" yields the token "us"; other punctuation
// separates words. "&" survives as its own token for alias keys.
fn words(folded: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(folded.len());
    for ch in folded.chars() {
        if ch == '.' {
            continue;
        }
        if ch.is_alphanumeric() || ch == '&' {
            cleaned.push(ch);
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().map(str::to_string).collect()
}

fn compact(raw: &str) -> String {
    fold(raw).chars().filter(|c| c.is_ascii_lowercase()).collect()
}
