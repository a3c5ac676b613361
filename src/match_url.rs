//! Human-readable match URLs and the reverse id extraction.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid pattern"));
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w-]+").expect("valid pattern"));
static DASH_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"--+").expect("valid pattern"));
static MATCHUP_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(\d+-\d+-\d+)").expect("valid pattern"));
static GAME_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#/]id=(\d+)").expect("valid pattern"));
static TRAILING_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d+)$").expect("valid pattern"));

pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(lowered.trim(), "-");
    let anded = dashed.replace('&', "and");
    let cleaned = NON_WORD_RE.replace_all(&anded, "");
    let collapsed = DASH_RUN_RE.replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}

pub fn sport_slug(sport_id: i64) -> &'static str {
    match sport_id {
        1 => "football",
        2 => "basketball",
        3 => "tennis",
        4 => "hockey",
        _ => "unknown-sport",
    }
}

/// Public site URL for one match, in the
/// `{comp}-{id}/{home}-{away}-{homeId}-{awayId}-{compId}#id={gameId}` shape.
#[allow(clippy::too_many_arguments)]
pub fn build_match_url(
    sport_id: i64,
    competition_name: &str,
    competition_id: i64,
    home_team_name: &str,
    home_team_id: i64,
    away_team_name: &str,
    away_team_id: i64,
    game_id: i64,
) -> String {
    let comp_slug = slugify(competition_name);
    let home_slug = slugify(home_team_name);
    let away_slug = slugify(away_team_name);
    format!(
        "https://www.365scores.com/{}/match/{comp_slug}-{competition_id}/\
         {home_slug}-{away_slug}-{home_team_id}-{away_team_id}-{competition_id}#id={game_id}",
        sport_slug(sport_id)
    )
}

/// Recover (matchup id, game id) from a public match URL. Either part may
/// be absent; the game id also matches bare trailing path ids.
pub fn extract_ids(url: &str) -> (Option<String>, Option<i64>) {
    let matchup_id = MATCHUP_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let game_id = GAME_ID_RE
        .captures(url)
        .or_else(|| {
            let path = url.split(['#', '?']).next().unwrap_or(url);
            TRAILING_ID_RE.captures(path)
        })
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok());

    (matchup_id, game_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_normalizes_names() {
        assert_eq!(slugify("Brighton & Hove Albion"), "brighton-and-hove-albion");
        assert_eq!(slugify("  Real   Madrid  "), "real-madrid");
        assert_eq!(slugify("Saint-Étienne"), "saint-étienne");
    }

    #[test]
    fn build_and_extract_round_trip() {
        let url = build_match_url(1, "Premier League", 7, "Liverpool", 131, "Arsenal", 105, 4145678);
        assert!(url.starts_with("https://www.365scores.com/football/match/premier-league-7/"));
        let (matchup_id, game_id) = extract_ids(&url);
        assert_eq!(matchup_id.as_deref(), Some("131-105-7"));
        assert_eq!(game_id, Some(4145678));
    }

    #[test]
    fn extract_ids_handles_bare_path_ids() {
        let (matchup_id, game_id) = extract_ids("https://example.com/match/4145678");
        assert_eq!(matchup_id, None);
        assert_eq!(game_id, Some(4145678));
    }
}
