//! Canonical player/team identity maps for one match.
//!
//! Player attributes are scattered across up to four payload regions of
//! uneven quality. The resolver merges them in trust order; a later source
//! only fills fields the earlier sources left empty, so a lineup-sourced
//! name is never displaced by an incidental mention on an event.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::schema::{LineupMember, MatchDetail, TopPerformerPlayer};
use crate::util::{pick_i64, pick_string};

#[derive(Debug, Clone, Default)]
pub struct PlayerIdentity {
    pub id: Option<i64>,
    pub athlete_id: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub position_name: Option<String>,
    pub jersey_number: Option<i64>,
    pub team_id: Option<i64>,
}

impl PlayerIdentity {
    fn fill_from(&mut self, other: &PlayerIdentity) {
        if self.id.is_none() {
            self.id = other.id;
        }
        if self.athlete_id.is_none() {
            self.athlete_id = other.athlete_id;
        }
        if self.name.is_none() {
            self.name = other.name.clone();
        }
        if self.short_name.is_none() {
            self.short_name = other.short_name.clone();
        }
        if self.position_name.is_none() {
            self.position_name = other.position_name.clone();
        }
        if self.jersey_number.is_none() {
            self.jersey_number = other.jersey_number;
        }
        if self.team_id.is_none() {
            self.team_id = other.team_id;
        }
    }
}

/// Identity maps for one match. Players are reachable under both their
/// match-player id and their athlete id; teams under their competitor id.
///
/// Note: an id of numeric zero is a real key. Absence means the field was
/// missing from the payload, nothing else.
#[derive(Debug, Default)]
pub struct ResolvedIdentities {
    players: HashMap<i64, PlayerIdentity>,
    teams: HashMap<i64, String>,
}

impl ResolvedIdentities {
    pub fn player(&self, id: i64) -> Option<&PlayerIdentity> {
        self.players.get(&id)
    }

    pub fn player_name(&self, id: Option<i64>) -> Option<String> {
        self.players.get(&id?).and_then(|p| p.name.clone())
    }

    pub fn team_name(&self, competitor_id: Option<i64>) -> Option<String> {
        self.teams.get(&competitor_id?).cloned()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Merge a partial sighting under every id it carries. Existing fields
    /// win; only gaps are filled.
    fn absorb(&mut self, partial: PlayerIdentity) {
        let keys: Vec<i64> = [partial.id, partial.athlete_id]
            .into_iter()
            .flatten()
            .collect();
        for key in keys {
            self.players
                .entry(key)
                .or_default()
                .fill_from(&partial);
        }
    }
}

/// Build the canonical identity maps from one match payload.
pub fn resolve(detail: &MatchDetail) -> ResolvedIdentities {
    let mut out = ResolvedIdentities::default();

    // Team identity never needs cross-source reconciliation; populate it
    // straight from the competitors before any player merging.
    let home_id = detail.home_competitor.as_ref().and_then(|c| c.id);
    let away_id = detail.away_competitor.as_ref().and_then(|c| c.id);
    for comp in [&detail.home_competitor, &detail.away_competitor]
        .into_iter()
        .flatten()
    {
        if let (Some(id), Some(name)) = (comp.id, comp.name.clone()) {
            out.teams.insert(id, name);
        }
    }

    // 1. Lineup members: the authoritative source.
    for comp in [&detail.home_competitor, &detail.away_competitor]
        .into_iter()
        .flatten()
    {
        if let Some(lineup) = comp.lineup.as_ref() {
            for member in &lineup.members {
                out.absorb(identity_from_member(member, comp.id));
            }
        }
    }

    // 2. The root members block, in whichever shape it arrived.
    match detail.members.as_ref() {
        Some(Value::Object(map)) => {
            for (key, team_id) in [("homeTeamMembers", home_id), ("awayTeamMembers", away_id)] {
                if let Some(list) = map.get(key).and_then(Value::as_array) {
                    for entry in list {
                        out.absorb(identity_from_value(entry, team_id));
                    }
                }
            }
        }
        Some(Value::Array(list)) => {
            // Flat list: side membership comes from each entry's own
            // competitorId, and only counts when it matches a known side.
            for entry in list {
                let mut identity = identity_from_value(entry, None);
                if identity.team_id != home_id && identity.team_id != away_id {
                    identity.team_id = None;
                }
                out.absorb(identity);
            }
        }
        Some(Value::Null) | None => {
            warn!(
                "match {}: members block absent",
                detail.id.unwrap_or_default()
            );
        }
        Some(other) => {
            warn!(
                "match {}: members block has unexpected shape ({})",
                detail.id.unwrap_or_default(),
                type_name(other)
            );
        }
    }

    // 3. Top-performer blocks. These sometimes key players by athlete id
    // instead of match-player id; absorb() indexes under both.
    for category in &detail.top_performers {
        for (player, team_id) in [
            (category.home_player.as_ref(), home_id),
            (category.away_player.as_ref(), away_id),
        ] {
            if let Some(player) = player {
                out.absorb(identity_from_performer(player, team_id));
            }
        }
    }

    // 4. Incidental names carried on events and shot-chart entries; lowest
    // trust, only useful for otherwise-unknown ids.
    for event in &detail.events {
        if event.player_name.is_some() {
            out.absorb(PlayerIdentity {
                id: event.player_id,
                name: event.player_name.clone(),
                team_id: event.competitor_id,
                ..PlayerIdentity::default()
            });
        }
    }
    if let Some(chart) = detail.chart_events.as_ref() {
        for shots in chart.categories.values() {
            for shot in shots {
                if shot.player_name.is_some() {
                    out.absorb(PlayerIdentity {
                        id: shot.player_id,
                        name: shot.player_name.clone(),
                        ..PlayerIdentity::default()
                    });
                }
            }
        }
    }

    out
}

fn identity_from_member(member: &LineupMember, team_id: Option<i64>) -> PlayerIdentity {
    PlayerIdentity {
        id: member.id,
        athlete_id: member.athlete_id,
        name: member.name.clone(),
        short_name: member.short_name.clone(),
        position_name: member.position_name.clone(),
        jersey_number: member.jersey_number,
        team_id: member.competitor_id.or(team_id),
    }
}

fn identity_from_performer(player: &TopPerformerPlayer, team_id: Option<i64>) -> PlayerIdentity {
    PlayerIdentity {
        id: player.id,
        athlete_id: player.athlete_id,
        name: player.name.clone(),
        short_name: player.short_name.clone(),
        position_name: player.position_name.clone(),
        jersey_number: None,
        team_id,
    }
}

fn identity_from_value(entry: &Value, team_id: Option<i64>) -> PlayerIdentity {
    PlayerIdentity {
        id: pick_i64(entry, &["id"]),
        athlete_id: pick_i64(entry, &["athleteId"]),
        name: pick_string(entry, &["name"]),
        short_name: pick_string(entry, &["shortName"]),
        position_name: entry
            .get("position")
            .and_then(|p| pick_string(p, &["name"])),
        jersey_number: pick_i64(entry, &["jerseyNumber", "jerseyNum"]),
        team_id: pick_i64(entry, &["competitorId"]).or(team_id),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
