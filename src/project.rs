//! Projection of one nested match payload into independent flat tables.
//!
//! Rows are plain JSON maps rather than fixed structs: stat columns are
//! named from runtime data, so the column set varies per match by design
//! and is reconciled by the consumer, not here. The full set of dynamic
//! stat keys seen is reported alongside the tables.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::match_url::build_match_url;
use crate::resolve::ResolvedIdentities;
use crate::schema::{Competitor, MatchDetail, PlayerStat};
use crate::team_stats::{lookup_stat, team_aggregate_stats};

pub type FlatRow = Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// When set, only officials whose role matches (case-insensitively) are
    /// projected; by default every official row passes through.
    pub officials_role: Option<String>,
}

/// The flat record sets for one or more matches; every row carries
/// `matchId` as a foreign key.
#[derive(Debug, Default)]
pub struct MatchTables {
    pub matches: Vec<FlatRow>,
    pub players: Vec<FlatRow>,
    pub events: Vec<FlatRow>,
    pub shot_events: Vec<FlatRow>,
    pub top_performers: Vec<FlatRow>,
    pub widgets: Vec<FlatRow>,
    pub officials: Vec<FlatRow>,
    pub stages: Vec<FlatRow>,
    /// Every dynamic stat column emitted into players/topPerformers rows;
    /// an explicit reporting side-channel for schema discovery.
    pub stat_keys: BTreeSet<String>,
}

impl MatchTables {
    pub fn merge(&mut self, other: MatchTables) {
        self.matches.extend(other.matches);
        self.players.extend(other.players);
        self.events.extend(other.events);
        self.shot_events.extend(other.shot_events);
        self.top_performers.extend(other.top_performers);
        self.widgets.extend(other.widgets);
        self.officials.extend(other.officials);
        self.stages.extend(other.stages);
        self.stat_keys.extend(other.stat_keys);
    }

    pub fn row_count(&self) -> usize {
        self.matches.len()
            + self.players.len()
            + self.events.len()
            + self.shot_events.len()
            + self.top_performers.len()
            + self.widgets.len()
            + self.officials.len()
            + self.stages.len()
    }
}

/// Project one match into its flat tables using the resolved identities.
pub fn project(
    detail: &MatchDetail,
    ids: &ResolvedIdentities,
    opts: &ProjectOptions,
) -> MatchTables {
    let mut tables = MatchTables::default();
    let match_id = id_value(detail.id);

    tables.matches.push(match_row(detail, &match_id));
    project_players(detail, ids, &match_id, &mut tables);
    project_events(detail, ids, &match_id, &mut tables);
    project_shot_events(detail, ids, &match_id, &mut tables);
    project_top_performers(detail, ids, &match_id, &mut tables);
    project_passthrough(detail, opts, &match_id, &mut tables);
    tables
}

fn id_value(id: Option<i64>) -> Value {
    id.map_or(Value::Null, Value::from)
}

fn insert_opt<T: Into<Value>>(row: &mut FlatRow, key: &str, value: Option<T>) {
    if let Some(value) = value {
        row.insert(key.to_string(), value.into());
    }
}

fn match_row(detail: &MatchDetail, match_id: &Value) -> FlatRow {
    let mut row = FlatRow::new();
    row.insert("matchId".to_string(), match_id.clone());
    insert_opt(&mut row, "competitionId", detail.competition_id);
    insert_opt(
        &mut row,
        "competitionName",
        detail.competition_display_name.clone(),
    );
    insert_opt(&mut row, "sportId", detail.sport_id);
    insert_opt(&mut row, "seasonNum", detail.season_num);
    insert_opt(&mut row, "roundName", detail.round_name.clone());
    insert_opt(&mut row, "stageName", detail.stage_name.clone());
    insert_opt(&mut row, "startTime", detail.start_time.clone());
    insert_opt(&mut row, "statusText", detail.status_text.clone());
    insert_opt(
        &mut row,
        "shortStatusText",
        detail.short_status_text.clone(),
    );
    insert_opt(
        &mut row,
        "gameTimeAndStatus",
        detail.game_time_and_status.clone(),
    );

    for (comp, name_key, score_key, suffix) in [
        (
            detail.home_competitor.as_ref(),
            "homeTeamName",
            "homeTeamScore",
            "home",
        ),
        (
            detail.away_competitor.as_ref(),
            "awayTeamName",
            "awayTeamScore",
            "away",
        ),
    ] {
        let Some(comp) = comp else {
            continue;
        };
        insert_opt(&mut row, name_key, comp.name.clone());
        row.insert(score_key.to_string(), Value::from(comp.score));
        append_team_stats(&mut row, comp, suffix);
    }
    insert_opt(&mut row, "matchUrl", public_url(detail));
    row
}

/// Public site link for the match; only built when every slug ingredient
/// is present.
fn public_url(detail: &MatchDetail) -> Option<String> {
    let home = detail.home_competitor.as_ref()?;
    let away = detail.away_competitor.as_ref()?;
    Some(build_match_url(
        detail.sport_id?,
        detail.competition_display_name.as_deref()?,
        detail.competition_id?,
        home.name.as_deref()?,
        home.id?,
        away.name.as_deref()?,
        away.id?,
        detail.id?,
    ))
}

/// Per-team aggregate stat columns (`{stat}_home` / `{stat}_away`), plus a
/// canonical expected-goals column resolved through the candidate-name
/// lookup since the upstream is inconsistent about what it calls xG.
fn append_team_stats(row: &mut FlatRow, comp: &Competitor, suffix: &str) {
    let stats = team_aggregate_stats(comp);
    for (name, value) in &stats {
        row.insert(format!("{name}_{suffix}"), value.clone());
    }
    if let Some(xg) = lookup_stat(&stats, &["Expected Goals", "Expected goals", "xG"]) {
        row.insert(format!("xg_{suffix}"), xg);
    }
}

fn project_players(
    detail: &MatchDetail,
    ids: &ResolvedIdentities,
    match_id: &Value,
    tables: &mut MatchTables,
) {
    for (comp, is_home) in [
        (detail.home_competitor.as_ref(), true),
        (detail.away_competitor.as_ref(), false),
    ] {
        let Some(comp) = comp else {
            continue;
        };
        let Some(lineup) = comp.lineup.as_ref() else {
            continue;
        };
        for member in &lineup.members {
            let mut row = FlatRow::new();
            row.insert("matchId".to_string(), match_id.clone());
            insert_opt(&mut row, "playerId", member.id);
            insert_opt(&mut row, "athleteId", member.athlete_id);
            // The resolved name wins over the embedded one; fall back to the
            // member's own name only when the resolver knows nothing.
            let name = member
                .id
                .and_then(|id| ids.player_name(Some(id)))
                .or_else(|| member.name.clone());
            insert_opt(&mut row, "playerName", name);
            insert_opt(&mut row, "teamName", comp.name.clone());
            row.insert("isHomeTeam".to_string(), Value::from(is_home));
            insert_opt(&mut row, "positionName", member.position_name.clone());
            row.insert(
                "isStarter".to_string(),
                Value::from(member.status_text.as_deref() == Some("Starter")),
            );
            insert_opt(&mut row, "formationName", member.formation_name.clone());
            insert_opt(&mut row, "jerseyNumber", member.jersey_number);
            insert_opt(&mut row, "ranking", member.ranking);
            insert_opt(&mut row, "popularityRank", member.popularity_rank);
            insert_opt(&mut row, "hasStats", member.has_stats);
            insert_opt(&mut row, "nationalId", member.national_id);
            append_stat_columns(&mut row, &member.stats, &mut tables.stat_keys);
            tables.players.push(row);
        }
    }
}

/// Wide stat expansion shared by players and top performers: one column per
/// stat entry, keyed `stat_<name|type_N|unknown>`.
fn append_stat_columns(row: &mut FlatRow, stats: &[PlayerStat], seen: &mut BTreeSet<String>) {
    for stat in stats {
        let key = format!("stat_{}", stat.column_key());
        row.insert(key.clone(), stat.value.clone().unwrap_or(Value::Null));
        seen.insert(key);
    }
}

fn project_events(
    detail: &MatchDetail,
    ids: &ResolvedIdentities,
    match_id: &Value,
    tables: &mut MatchTables,
) {
    for event in &detail.events {
        let mut row = FlatRow::new();
        row.insert("matchId".to_string(), match_id.clone());
        insert_opt(&mut row, "order", event.order);
        insert_opt(
            &mut row,
            "gameTimeDisplay",
            event.game_time_display.clone(),
        );
        insert_opt(&mut row, "gameTime", event.game_time);
        insert_opt(&mut row, "addedTime", event.added_time);
        insert_opt(&mut row, "isMajor", event.is_major);
        insert_opt(&mut row, "eventTypeId", event.event_type_id);
        insert_opt(&mut row, "eventTypeName", event.event_type_name.clone());
        insert_opt(&mut row, "subTypeId", event.sub_type_id);
        insert_opt(&mut row, "subTypeName", event.sub_type_name.clone());
        insert_opt(&mut row, "playerId", event.player_id);
        insert_opt(&mut row, "competitorId", event.competitor_id);
        insert_opt(&mut row, "statusId", event.status_id);
        insert_opt(&mut row, "stageId", event.stage_id);
        insert_opt(&mut row, "num", event.num);
        insert_opt(
            &mut row,
            "gameTimeAndStatusDisplayType",
            event.game_time_and_status_display_type,
        );
        if !event.extra_players.is_empty() {
            row.insert(
                "extraPlayers".to_string(),
                Value::from(event.extra_players.clone()),
            );
        }
        // Unresolvable players/teams leave the field absent; the row is
        // still emitted.
        insert_opt(&mut row, "playerName", ids.player_name(event.player_id));
        insert_opt(&mut row, "teamName", ids.team_name(event.competitor_id));
        tables.events.push(row);
    }
}

fn project_shot_events(
    detail: &MatchDetail,
    ids: &ResolvedIdentities,
    match_id: &Value,
    tables: &mut MatchTables,
) {
    let Some(chart) = detail.chart_events.as_ref() else {
        return;
    };
    let home_team = detail
        .home_competitor
        .as_ref()
        .and_then(|c| c.name.clone());
    let away_team = detail
        .away_competitor
        .as_ref()
        .and_then(|c| c.name.clone());

    for (category, shots) in &chart.categories {
        for shot in shots {
            let mut row = FlatRow::new();
            row.insert("matchId".to_string(), match_id.clone());
            row.insert("category".to_string(), Value::from(category.clone()));
            insert_opt(&mut row, "key", shot.key);
            insert_opt(&mut row, "time", shot.time);
            insert_opt(&mut row, "minute", shot.minute);
            insert_opt(&mut row, "type", shot.event_type);
            insert_opt(
                &mut row,
                "eventTypeName",
                shot.event_type
                    .and_then(|t| chart.event_type_names.get(&t).cloned()),
            );
            insert_opt(&mut row, "subType", shot.sub_type);
            insert_opt(
                &mut row,
                "subTypeName",
                shot.sub_type
                    .and_then(|t| chart.sub_type_names.get(&t).cloned()),
            );
            insert_opt(&mut row, "status", shot.status);
            insert_opt(
                &mut row,
                "statusName",
                shot.status.and_then(|s| chart.status_names.get(&s).cloned()),
            );
            insert_opt(&mut row, "playerId", shot.player_id);
            let player = shot.player_id.and_then(|id| ids.player(id));
            insert_opt(
                &mut row,
                "playerName",
                player.and_then(|p| p.name.clone()),
            );
            insert_opt(
                &mut row,
                "jerseyNumber",
                player.and_then(|p| p.jersey_number),
            );
            row.insert("xg".to_string(), Value::from(shot.xg));
            row.insert("xgot".to_string(), Value::from(shot.xgot));
            insert_opt(&mut row, "bodyPart", shot.body_part);
            insert_opt(
                &mut row,
                "goalDescription",
                shot.goal_description.clone(),
            );
            insert_opt(&mut row, "competitorNum", shot.competitor_num);
            let involved = match shot.competitor_num {
                Some(1) => home_team.clone(),
                Some(2) => away_team.clone(),
                _ => None,
            };
            insert_opt(&mut row, "involvedTeam", involved);
            insert_opt(&mut row, "x", shot.x);
            insert_opt(&mut row, "y", shot.y);
            if let Some(outcome) = shot.outcome.as_ref() {
                insert_opt(&mut row, "shotOutcome", outcome.name.clone());
                insert_opt(&mut row, "outcomeId", outcome.id);
                insert_opt(&mut row, "outcomeX", outcome.x);
                insert_opt(&mut row, "outcomeY", outcome.y);
                insert_opt(&mut row, "outcomeZ", outcome.z);
            }
            tables.shot_events.push(row);
        }
    }
}

fn project_top_performers(
    detail: &MatchDetail,
    ids: &ResolvedIdentities,
    match_id: &Value,
    tables: &mut MatchTables,
) {
    let home_team = detail
        .home_competitor
        .as_ref()
        .and_then(|c| c.name.clone());
    let away_team = detail
        .away_competitor
        .as_ref()
        .and_then(|c| c.name.clone());

    for category in &detail.top_performers {
        for (player, is_home) in [
            (category.home_player.as_ref(), true),
            (category.away_player.as_ref(), false),
        ] {
            let Some(player) = player else {
                continue;
            };
            let mut row = FlatRow::new();
            row.insert("matchId".to_string(), match_id.clone());
            insert_opt(&mut row, "categoryName", category.name.clone());
            insert_opt(&mut row, "playerId", player.id);
            insert_opt(&mut row, "athleteId", player.athlete_id);
            // Match-player id first; athlete id when the id key does not
            // resolve; the block's own name as a last resort.
            let name = player
                .id
                .and_then(|id| ids.player_name(Some(id)))
                .or_else(|| player.athlete_id.and_then(|id| ids.player_name(Some(id))))
                .or_else(|| player.name.clone());
            insert_opt(&mut row, "playerName", name);
            insert_opt(
                &mut row,
                "teamName",
                if is_home {
                    home_team.clone()
                } else {
                    away_team.clone()
                },
            );
            row.insert("isHomeTeam".to_string(), Value::from(is_home));
            insert_opt(&mut row, "positionName", player.position_name.clone());
            insert_opt(
                &mut row,
                "positionShortName",
                player.position_short_name.clone(),
            );
            insert_opt(&mut row, "imageVersion", player.image_version);
            insert_opt(&mut row, "nameForURL", player.name_for_url.clone());
            append_stat_columns(&mut row, &player.stats, &mut tables.stat_keys);
            tables.top_performers.push(row);
        }
    }
}

fn project_passthrough(
    detail: &MatchDetail,
    opts: &ProjectOptions,
    match_id: &Value,
    tables: &mut MatchTables,
) {
    for widget in &detail.widgets {
        let Some(map) = widget.as_object() else {
            continue;
        };
        let mut row = map.clone();
        row.insert("matchId".to_string(), match_id.clone());
        tables.widgets.push(row);
    }

    for official in &detail.officials {
        if let Some(wanted) = opts.officials_role.as_deref() {
            let matches = official
                .role
                .as_deref()
                .is_some_and(|role| role.eq_ignore_ascii_case(wanted));
            if !matches {
                continue;
            }
        }
        let mut row = FlatRow::new();
        row.insert("matchId".to_string(), match_id.clone());
        insert_opt(&mut row, "officialId", official.id);
        insert_opt(&mut row, "role", official.role.clone());
        insert_opt(&mut row, "countryId", official.country_id);
        insert_opt(&mut row, "name", official.name.clone());
        insert_opt(&mut row, "nameForURL", official.name_for_url.clone());
        insert_opt(&mut row, "imageVersion", official.image_version);
        tables.officials.push(row);
    }

    for stage in &detail.stages {
        let mut row = FlatRow::new();
        row.insert("matchId".to_string(), match_id.clone());
        insert_opt(&mut row, "stageId", stage.id);
        insert_opt(&mut row, "name", stage.name.clone());
        insert_opt(&mut row, "shortName", stage.short_name.clone());
        insert_opt(
            &mut row,
            "homeCompetitorScore",
            stage.home_competitor_score,
        );
        insert_opt(
            &mut row,
            "awayCompetitorScore",
            stage.away_competitor_score,
        );
        insert_opt(&mut row, "isEnded", stage.is_ended);
        insert_opt(&mut row, "isCurrent", stage.is_current);
        tables.stages.push(row);
    }
}
