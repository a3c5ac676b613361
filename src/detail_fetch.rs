use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::warn;

use crate::http_cache::fetch_json_cached;
use crate::schema::MatchDetail;

const GAME_URL: &str = "https://webws.365scores.com/web/game/";

/// Fetch one match's full nested payload. Failures degrade to `None` so a
/// single bad match never aborts a batch; the caller counts skipped units.
pub fn fetch_match_detail(
    client: &Client,
    game_id: i64,
    competition_id: Option<i64>,
    matchup_id: Option<&str>,
) -> Option<MatchDetail> {
    let url = game_url(game_id, competition_id, matchup_id);
    match fetch_json_cached(client, &url).and_then(|body| parse_match_detail(&body)) {
        Ok(detail) => detail,
        Err(err) => {
            warn!("match {game_id} fetch failed: {err:#}");
            None
        }
    }
}

fn game_url(game_id: i64, competition_id: Option<i64>, matchup_id: Option<&str>) -> String {
    let mut url = format!(
        "{GAME_URL}?appTypeId=5&langId=1&timezoneName=America/Buenos_Aires\
         &userCountryId=382&gameId={game_id}"
    );
    if let Some(competition_id) = competition_id {
        url.push_str(&format!("&competitions={competition_id}"));
    }
    if let Some(matchup_id) = matchup_id {
        url.push_str(&format!("&matchupId={matchup_id}"));
    }
    url.push_str("&topBookmaker=14");
    url
}

/// Unwrap the `game` envelope and build the canonical model. An empty or
/// envelope-less body parses to `None` rather than an error.
pub fn parse_match_detail(raw: &str) -> Result<Option<MatchDetail>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid match json")?;
    let Some(game) = root.get("game") else {
        return Ok(None);
    };
    if !game.is_object() {
        return Ok(None);
    }
    Ok(Some(MatchDetail::from_value(game)))
}
