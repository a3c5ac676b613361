//! Canonical nested model for one match payload.
//!
//! The upstream schema drifts between responses: fields appear and vanish,
//! numbers arrive as strings, and the root `members` block is sometimes a
//! keyed object and sometimes a flat list. There is deliberately one
//! versionless model here, built from raw JSON with tolerant constructors —
//! a missing or misshapen field degrades to its default, never to an error.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::util::{as_i64, coerce_f64, pick_bool, pick_f64, pick_i64, pick_string, safe_int};

#[derive(Debug, Clone, Default)]
pub struct MatchDetail {
    pub id: Option<i64>,
    pub sport_id: Option<i64>,
    pub competition_id: Option<i64>,
    pub season_num: Option<i64>,
    pub round_num: Option<i64>,
    pub round_name: Option<String>,
    pub stage_name: Option<String>,
    pub group_name: Option<String>,
    pub competition_display_name: Option<String>,
    pub start_time: Option<String>,
    pub status_id: Option<i64>,
    pub status_text: Option<String>,
    pub short_status_text: Option<String>,
    pub game_time_and_status: Option<String>,
    pub home_competitor: Option<Competitor>,
    pub away_competitor: Option<Competitor>,
    /// Root-level members block, kept raw: upstream drifts between an object
    /// holding `homeTeamMembers`/`awayTeamMembers` lists and a flat list.
    pub members: Option<Value>,
    pub events: Vec<GameEvent>,
    pub chart_events: Option<ChartEvents>,
    pub top_performers: Vec<TopPerformerCategory>,
    /// Widget entries are passed through to their flat table untyped.
    pub widgets: Vec<Value>,
    /// Root aggregate statistics block (e.g. corners/possession), kept raw
    /// for the team-stats lookup helper.
    pub statistics: Option<Value>,
    pub officials: Vec<Official>,
    pub stages: Vec<GameStage>,
}

impl MatchDetail {
    pub fn from_value(game: &Value) -> Self {
        MatchDetail {
            id: pick_i64(game, &["id"]),
            sport_id: pick_i64(game, &["sportId"]),
            competition_id: pick_i64(game, &["competitionId"]),
            season_num: pick_i64(game, &["seasonNum"]),
            round_num: pick_i64(game, &["roundNum"]),
            round_name: pick_string(game, &["roundName"]),
            stage_name: pick_string(game, &["stageName"]),
            group_name: pick_string(game, &["groupName"]),
            competition_display_name: pick_string(game, &["competitionDisplayName"]),
            start_time: pick_string(game, &["startTime"]),
            status_id: pick_i64(game, &["statusId"]),
            status_text: pick_string(game, &["statusText"]),
            short_status_text: pick_string(game, &["shortStatusText"]),
            game_time_and_status: pick_string(game, &["gameTimeAndStatus"]),
            home_competitor: game.get("homeCompetitor").and_then(Competitor::from_value),
            away_competitor: game.get("awayCompetitor").and_then(Competitor::from_value),
            members: game.get("members").cloned(),
            events: collect_objects(game.get("events"), GameEvent::from_value),
            chart_events: game.get("chartEvents").and_then(ChartEvents::from_value),
            top_performers: collect_objects(
                game.get("topPerformers").and_then(|tp| tp.get("categories")),
                TopPerformerCategory::from_value,
            ),
            widgets: game
                .get("widgets")
                .and_then(Value::as_array)
                .map(|list| list.iter().filter(|w| w.is_object()).cloned().collect())
                .unwrap_or_default(),
            statistics: game.get("statistics").cloned(),
            officials: collect_objects(game.get("officials"), Official::from_value),
            stages: collect_objects(game.get("stages"), GameStage::from_value),
        }
    }
}

fn collect_objects<T>(value: Option<&Value>, build: impl Fn(&Value) -> T) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter(|entry| entry.is_object())
                .map(build)
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct Competitor {
    pub id: Option<i64>,
    pub country_id: Option<i64>,
    pub name: Option<String>,
    pub score: i64,
    pub is_winner: Option<bool>,
    pub color: Option<String>,
    pub lineup: Option<Lineup>,
    pub recent_matches: Vec<RecentMatch>,
    pub stat_categories: Vec<StatCategory>,
    /// Explicit per-team aggregate blocks, kept raw for the tiered
    /// team-stats fallback.
    pub statistics: Option<Value>,
    pub status_block: Option<Value>,
}

impl Competitor {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Competitor {
            id: pick_i64(value, &["id"]),
            country_id: pick_i64(value, &["countryId"]),
            name: pick_string(value, &["name"]),
            score: safe_int(value.get("score")),
            is_winner: pick_bool(value, &["isWinner"]),
            color: pick_string(value, &["color"]),
            lineup: value.get("lineups").and_then(Lineup::from_value),
            recent_matches: collect_objects(value.get("recentMatches"), RecentMatch::from_value),
            stat_categories: collect_objects(value.get("statsCategory"), StatCategory::from_value),
            statistics: value.get("statistics").cloned(),
            status_block: value.get("status").cloned(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Lineup {
    pub status: Option<i64>,
    pub formation: Option<String>,
    pub members: Vec<LineupMember>,
}

impl Lineup {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Lineup {
            status: pick_i64(value, &["status"]),
            formation: pick_string(value, &["formation"]),
            members: collect_objects(value.get("members"), LineupMember::from_value),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineupMember {
    pub id: Option<i64>,
    pub athlete_id: Option<i64>,
    pub competitor_id: Option<i64>,
    pub national_id: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub status_text: Option<String>,
    pub position_name: Option<String>,
    pub formation_name: Option<String>,
    pub jersey_number: Option<i64>,
    pub ranking: Option<f64>,
    pub popularity_rank: Option<i64>,
    pub has_stats: Option<bool>,
    pub stats: Vec<PlayerStat>,
}

impl LineupMember {
    pub fn from_value(value: &Value) -> Self {
        LineupMember {
            id: pick_i64(value, &["id"]),
            athlete_id: pick_i64(value, &["athleteId"]),
            competitor_id: pick_i64(value, &["competitorId"]),
            national_id: pick_i64(value, &["nationalId"]),
            name: pick_string(value, &["name"]),
            short_name: pick_string(value, &["shortName"]),
            status_text: pick_string(value, &["statusText"]),
            position_name: value
                .get("position")
                .and_then(|p| pick_string(p, &["name"])),
            formation_name: value
                .get("formation")
                .and_then(|f| pick_string(f, &["name"])),
            jersey_number: pick_i64(value, &["jerseyNumber", "jerseyNum"]),
            ranking: pick_f64(value, &["ranking"]),
            popularity_rank: pick_i64(value, &["popularityRank"]),
            has_stats: pick_bool(value, &["hasStats"]),
            stats: collect_objects(value.get("stats"), PlayerStat::from_value),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerStat {
    pub stat_type: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub category_id: Option<i64>,
    pub order: Option<i64>,
    pub is_top: Option<bool>,
    /// Values arrive as numbers or strings interchangeably.
    pub value: Option<Value>,
}

impl PlayerStat {
    pub fn from_value(value: &Value) -> Self {
        PlayerStat {
            stat_type: pick_i64(value, &["type"]),
            name: pick_string(value, &["name"]),
            short_name: pick_string(value, &["shortName"]),
            category_id: pick_i64(value, &["categoryId"]),
            order: pick_i64(value, &["order"]),
            is_top: pick_bool(value, &["isTop"]),
            value: value.get("value").cloned(),
        }
    }

    /// Column key for the wide stat expansion: the stat's name when present,
    /// else its numeric type, else a catch-all.
    pub fn column_key(&self) -> String {
        if let Some(name) = self.name.as_deref() {
            return name.to_string();
        }
        if let Some(stat_type) = self.stat_type {
            return format!("type_{stat_type}");
        }
        "unknown".to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecentMatch {
    pub id: Option<i64>,
    pub date: Option<String>,
    pub home_team_name: Option<String>,
    pub home_team_score: Option<i64>,
    pub away_team_name: Option<String>,
    pub away_team_score: Option<i64>,
    pub competition_name: Option<String>,
}

impl RecentMatch {
    pub fn from_value(value: &Value) -> Self {
        RecentMatch {
            id: pick_i64(value, &["id"]),
            date: pick_string(value, &["date"]),
            home_team_name: pick_string(value, &["homeTeamName"]),
            home_team_score: pick_i64(value, &["homeTeamScore"]),
            away_team_name: pick_string(value, &["awayTeamName"]),
            away_team_score: pick_i64(value, &["awayTeamScore"]),
            competition_name: pick_string(value, &["competitionName"]),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatCategory {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub order_level: Option<i64>,
}

impl StatCategory {
    pub fn from_value(value: &Value) -> Self {
        StatCategory {
            id: pick_i64(value, &["id"]),
            name: pick_string(value, &["name"]),
            order_level: pick_i64(value, &["orderLevel"]),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameEvent {
    pub order: Option<i64>,
    pub game_time_display: Option<String>,
    pub game_time: Option<f64>,
    pub added_time: Option<i64>,
    pub is_major: Option<bool>,
    pub event_type_id: Option<i64>,
    pub event_type_name: Option<String>,
    pub sub_type_id: Option<i64>,
    pub sub_type_name: Option<String>,
    pub player_id: Option<i64>,
    /// Incidental display name occasionally carried on the event itself;
    /// lowest-trust identity source.
    pub player_name: Option<String>,
    pub competitor_id: Option<i64>,
    pub status_id: Option<i64>,
    pub stage_id: Option<i64>,
    pub num: Option<i64>,
    pub game_time_and_status_display_type: Option<i64>,
    pub extra_players: Vec<i64>,
}

impl GameEvent {
    pub fn from_value(value: &Value) -> Self {
        let event_type = value.get("eventType");
        GameEvent {
            order: pick_i64(value, &["order"]),
            game_time_display: pick_string(value, &["gameTimeDisplay"]),
            game_time: pick_f64(value, &["gameTime"]),
            added_time: pick_i64(value, &["addedTime"]),
            is_major: pick_bool(value, &["isMajor"]),
            event_type_id: event_type.and_then(|t| pick_i64(t, &["id"])),
            event_type_name: event_type.and_then(|t| pick_string(t, &["name"])),
            sub_type_id: event_type.and_then(|t| pick_i64(t, &["subTypeId"])),
            sub_type_name: event_type.and_then(|t| pick_string(t, &["subTypeName"])),
            player_id: pick_i64(value, &["playerId"]),
            player_name: pick_string(value, &["playerName"]),
            competitor_id: pick_i64(value, &["competitorId"]),
            status_id: pick_i64(value, &["statusId"]),
            stage_id: pick_i64(value, &["stageId"]),
            num: pick_i64(value, &["num"]),
            game_time_and_status_display_type: pick_i64(value, &["gameTimeAndStatusDisplayType"]),
            extra_players: value
                .get("extraPlayers")
                .and_then(Value::as_array)
                .map(|list| list.iter().filter_map(as_i64).collect())
                .unwrap_or_default(),
        }
    }
}

/// Shot-chart payload: shot lists keyed by category, plus the lookup tables
/// the upstream ships alongside them for decorating type/status codes.
#[derive(Debug, Clone, Default)]
pub struct ChartEvents {
    pub categories: BTreeMap<String, Vec<ChartEvent>>,
    pub event_type_names: BTreeMap<i64, String>,
    pub status_names: BTreeMap<i64, String>,
    pub sub_type_names: BTreeMap<i64, String>,
}

impl ChartEvents {
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let mut chart = ChartEvents::default();
        for (key, entry) in map {
            match key.as_str() {
                "eventTypes" => chart.event_type_names = name_table(entry, "value"),
                "statuses" => chart.status_names = name_table(entry, "id"),
                "eventSubTypes" => chart.sub_type_names = name_table(entry, "value"),
                _ => {
                    if entry.as_array().is_some_and(|list| !list.is_empty()) {
                        chart.categories.insert(
                            key.clone(),
                            collect_objects(Some(entry), ChartEvent::from_value),
                        );
                    }
                }
            }
        }
        if chart.categories.is_empty() {
            None
        } else {
            Some(chart)
        }
    }
}

fn name_table(value: &Value, id_key: &str) -> BTreeMap<i64, String> {
    let mut table = BTreeMap::new();
    let Some(list) = value.as_array() else {
        return table;
    };
    for entry in list {
        if let (Some(id), Some(name)) = (pick_i64(entry, &[id_key]), pick_string(entry, &["name"]))
        {
            table.insert(id, name);
        }
    }
    table
}

#[derive(Debug, Clone, Default)]
pub struct ChartEvent {
    pub key: Option<i64>,
    pub time: Option<i64>,
    pub minute: Option<i64>,
    pub event_type: Option<i64>,
    pub sub_type: Option<i64>,
    pub status: Option<i64>,
    pub player_id: Option<i64>,
    pub player_name: Option<String>,
    pub competitor_num: Option<i64>,
    /// Shot-quality metrics, coerced to 0.0 on absent or non-numeric input.
    pub xg: f64,
    pub xgot: f64,
    pub body_part: Option<i64>,
    pub goal_description: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub outcome: Option<ShotOutcome>,
}

impl ChartEvent {
    pub fn from_value(value: &Value) -> Self {
        ChartEvent {
            key: pick_i64(value, &["key"]),
            time: pick_i64(value, &["time"]),
            minute: pick_i64(value, &["minute"]),
            event_type: pick_i64(value, &["type"]),
            sub_type: pick_i64(value, &["subType"]),
            status: pick_i64(value, &["status"]),
            player_id: pick_i64(value, &["playerId"]),
            player_name: pick_string(value, &["playerName"]),
            competitor_num: pick_i64(value, &["competitorNum"]),
            xg: coerce_f64(value.get("xg")),
            xgot: coerce_f64(value.get("xgot")),
            body_part: pick_i64(value, &["bodyPart"]),
            goal_description: pick_string(value, &["goalDescription"]),
            x: pick_f64(value, &["x", "line"]),
            y: pick_f64(value, &["y", "side"]),
            outcome: value.get("outcome").and_then(ShotOutcome::from_value),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShotOutcome {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl ShotOutcome {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(ShotOutcome {
            id: pick_i64(value, &["id"]),
            name: pick_string(value, &["name"]),
            x: pick_f64(value, &["x"]),
            y: pick_f64(value, &["y"]),
            z: pick_f64(value, &["z"]),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopPerformerCategory {
    pub name: Option<String>,
    pub home_player: Option<TopPerformerPlayer>,
    pub away_player: Option<TopPerformerPlayer>,
}

impl TopPerformerCategory {
    pub fn from_value(value: &Value) -> Self {
        TopPerformerCategory {
            name: pick_string(value, &["name"]),
            home_player: value
                .get("homePlayer")
                .and_then(TopPerformerPlayer::from_value),
            away_player: value
                .get("awayPlayer")
                .and_then(TopPerformerPlayer::from_value),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopPerformerPlayer {
    pub id: Option<i64>,
    pub athlete_id: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub position_name: Option<String>,
    pub position_short_name: Option<String>,
    pub image_version: Option<i64>,
    pub name_for_url: Option<String>,
    pub stats: Vec<PlayerStat>,
}

impl TopPerformerPlayer {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(TopPerformerPlayer {
            id: pick_i64(value, &["id"]),
            athlete_id: pick_i64(value, &["athleteId"]),
            name: pick_string(value, &["name"]),
            short_name: pick_string(value, &["shortName"]),
            position_name: pick_string(value, &["positionName"]),
            position_short_name: pick_string(value, &["positionShortName"]),
            image_version: pick_i64(value, &["imageVersion"]),
            name_for_url: pick_string(value, &["nameForURL"]),
            stats: collect_objects(value.get("stats"), PlayerStat::from_value),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Official {
    pub id: Option<i64>,
    pub role: Option<String>,
    pub country_id: Option<i64>,
    pub name: Option<String>,
    pub name_for_url: Option<String>,
    pub image_version: Option<i64>,
}

impl Official {
    pub fn from_value(value: &Value) -> Self {
        Official {
            id: pick_i64(value, &["id"]),
            role: pick_string(value, &["role"]),
            country_id: pick_i64(value, &["countryId"]),
            name: pick_string(value, &["name"]),
            name_for_url: pick_string(value, &["nameForURL"]),
            image_version: pick_i64(value, &["imageVersion"]),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameStage {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub home_competitor_score: Option<i64>,
    pub away_competitor_score: Option<i64>,
    pub is_ended: Option<bool>,
    pub is_current: Option<bool>,
}

impl GameStage {
    pub fn from_value(value: &Value) -> Self {
        GameStage {
            id: pick_i64(value, &["id"]),
            name: pick_string(value, &["name"]),
            short_name: pick_string(value, &["shortName"]),
            home_competitor_score: pick_i64(value, &["homeCompetitorScore"]),
            away_competitor_score: pick_i64(value, &["awayCompetitorScore"]),
            is_ended: pick_bool(value, &["isEnded"]),
            is_current: pick_bool(value, &["isCurrent"]),
        }
    }
}
