use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::http_client::get_with_retry;
use crate::util::{pick_i64, pick_string, safe_int};

const RESULTS_URL: &str = "https://webws.365scores.com/web/games/results/";

static AFTER_GAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"aftergame=(\d+)").expect("valid cursor pattern"));

/// Walk direction through the listing's result ordering. The endpoint's
/// default ordering is most-recent-first, so `Older` follows `prevPage`
/// cursors and `Newer` follows `nextPage` cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Newer,
    Older,
}

impl Direction {
    pub fn query_value(self) -> i32 {
        match self {
            Direction::Newer => 1,
            Direction::Older => -1,
        }
    }
}

/// One fetched listing page. A failed fetch is represented by
/// [`ResultsPage::empty`], which callers cannot distinguish from a genuine
/// end of stream; that ambiguity is inherent to the upstream contract.
#[derive(Debug, Clone, Default)]
pub struct ResultsPage {
    pub rows: Vec<MatchSummary>,
    pub next_token: Option<u64>,
    pub prev_token: Option<u64>,
    pub total_games: u64,
}

impl ResultsPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.rows.is_empty() && self.next_token.is_none() && self.prev_token.is_none()
    }
}

/// Flattened listing row. Identity key is `match_id`; rows are immutable
/// once built and deduplicated across a whole collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: i64,
    pub season: Option<i64>,
    pub round: Option<String>,
    pub status: Option<String>,
    pub start_time_raw: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub start_date: Option<String>,
    pub start_clock: Option<String>,
    pub home_team: Option<String>,
    pub home_score: i64,
    pub away_team: Option<String>,
    pub away_score: i64,
    pub competition_id: Option<i64>,
    pub sport_id: Option<i64>,
}

/// Fetch one listing page. Any transport or decode failure degrades to an
/// empty page; the collection engine treats that as the end of a direction.
pub fn fetch_results_page(
    client: &Client,
    competition_id: u32,
    after: Option<u64>,
    direction: Direction,
    page_size: u32,
) -> ResultsPage {
    let url = results_url(competition_id, after, direction, page_size);
    match get_with_retry(client, &url).and_then(|body| parse_results_page(&body)) {
        Ok(page) => page,
        Err(err) => {
            warn!("results page fetch failed for competition {competition_id}: {err:#}");
            ResultsPage::empty()
        }
    }
}

fn results_url(
    competition_id: u32,
    after: Option<u64>,
    direction: Direction,
    page_size: u32,
) -> String {
    let mut url = format!(
        "{RESULTS_URL}?appTypeId=5&langId=1&timezoneName=Asia/Hebron&userCountryId=115\
         &competitions={competition_id}&showOdds=false&games={page_size}&direction={}",
        direction.query_value()
    );
    if let Some(after) = after {
        url.push_str(&format!("&aftergame={after}"));
    }
    url
}

/// Pure page parser: extracts the `games` array and both continuation
/// cursors from the `paging` block's relative URLs.
pub fn parse_results_page(raw: &str) -> Result<ResultsPage> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(ResultsPage::empty());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid results json")?;

    let games: Vec<MatchSummary> = root
        .get("games")
        .and_then(Value::as_array)
        .map(|games| games.iter().filter_map(summarize_game).collect())
        .unwrap_or_default();

    let paging = root.get("paging");
    let total_games = paging
        .and_then(|p| p.get("totalGames"))
        .and_then(Value::as_u64)
        .unwrap_or(games.len() as u64);
    let next_token = paging
        .and_then(|p| p.get("nextPage"))
        .and_then(Value::as_str)
        .and_then(extract_cursor);
    let prev_token = paging
        .and_then(|p| p.get("prevPage"))
        .and_then(Value::as_str)
        .and_then(extract_cursor);

    Ok(ResultsPage {
        rows: games,
        next_token,
        prev_token,
        total_games,
    })
}

/// Pull the numeric cursor out of a paging URL.
pub fn extract_cursor(page_url: &str) -> Option<u64> {
    AFTER_GAME_RE
        .captures(page_url)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

fn summarize_game(game: &Value) -> Option<MatchSummary> {
    // A record without an id cannot be deduplicated; drop it.
    let match_id = pick_i64(game, &["id"])?;
    let home = game.get("homeCompetitor");
    let away = game.get("awayCompetitor");

    let start_time_raw = game
        .get("startTime")
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    let start_time = start_time_raw.as_deref().and_then(parse_start_time);

    Some(MatchSummary {
        match_id,
        season: pick_i64(game, &["seasonNum"]),
        round: pick_string(game, &["roundName"]),
        status: pick_string(game, &["shortStatusText"]),
        start_date: start_time.map(|dt| dt.format("%Y-%m-%d").to_string()),
        start_clock: start_time.map(|dt| dt.format("%H:%M").to_string()),
        start_time_raw,
        start_time,
        home_team: home.and_then(|c| pick_string(c, &["name"])),
        home_score: safe_int(home.and_then(|c| c.get("score"))),
        away_team: away.and_then(|c| pick_string(c, &["name"])),
        away_score: safe_int(away.and_then(|c| c.get("score"))),
        competition_id: pick_i64(game, &["competitionId"]),
        sport_id: pick_i64(game, &["sportId"]),
    })
}

/// Parse an upstream start time. Unparseable values leave both derived
/// date/time fields absent without failing the row.
pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        // Keep the upstream wall-clock, which already carries the listing's
        // requested timezone.
        return Some(dt.naive_local());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    None
}

/// Symbolic status filters mapped to the upstream's short status codes,
/// applied post-hoc to summary rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Finished,
    Upcoming,
    Live,
}

impl StatusFilter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "finished" => Some(StatusFilter::Finished),
            "upcoming" => Some(StatusFilter::Upcoming),
            "live" => Some(StatusFilter::Live),
            _ => None,
        }
    }

    fn statuses(self) -> &'static [&'static str] {
        match self {
            StatusFilter::Finished => &["FT", "Ended", "AET", "Pen"],
            StatusFilter::Upcoming => &["NS", "Not Started", "Postp", "Scheduled"],
            StatusFilter::Live => &["1H", "2H", "HT", "LIVE", "ET"],
        }
    }

    pub fn matches(self, status: Option<&str>) -> bool {
        status.is_some_and(|s| self.statuses().contains(&s))
    }
}

pub fn apply_status_filter(rows: &mut Vec<MatchSummary>, filter: StatusFilter) {
    rows.retain(|row| filter.matches(row.status.as_deref()));
}
