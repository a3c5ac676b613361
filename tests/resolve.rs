use std::fs;
use std::path::PathBuf;

use scores365::detail_fetch::parse_match_detail;
use scores365::resolve::resolve;
use scores365::schema::MatchDetail;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn detail_from(json: serde_json::Value) -> MatchDetail {
    let body = serde_json::json!({ "game": json }).to_string();
    parse_match_detail(&body)
        .expect("payload should parse")
        .expect("payload should carry a game")
}

#[test]
fn resolves_fixture_identities_from_all_sources() {
    let raw = read_fixture("match_detail.json");
    let detail = parse_match_detail(&raw)
        .expect("fixture should parse")
        .expect("fixture should carry a game");
    let ids = resolve(&detail);

    assert_eq!(ids.team_count(), 2);
    assert_eq!(ids.team_name(Some(131)).as_deref(), Some("Liverpool"));
    assert_eq!(ids.team_name(Some(105)).as_deref(), Some("Arsenal"));
    assert_eq!(ids.team_name(Some(999)), None);

    // Lineup members, under both their ids.
    assert_eq!(
        ids.player_name(Some(9001)).as_deref(),
        Some("Mohamed Salah")
    );
    assert_eq!(
        ids.player_name(Some(70001)).as_deref(),
        Some("Mohamed Salah")
    );
    let salah = ids.player(9001).expect("salah should resolve");
    assert_eq!(salah.position_name.as_deref(), Some("Forward"));
    assert_eq!(salah.jersey_number, Some(11));
    assert_eq!(salah.team_id, Some(131));

    // Known only from the root members block.
    assert_eq!(ids.player_name(Some(9003)).as_deref(), Some("Darwin Nunez"));

    // Known only from an event's incidental playerName.
    assert_eq!(ids.player_name(Some(9999)).as_deref(), Some("Curtis Jones"));

    assert_eq!(ids.player_name(Some(123456)), None);
    assert_eq!(ids.player_name(None), None);
}

#[test]
fn lineup_name_wins_over_incidental_event_name() {
    let detail = detail_from(serde_json::json!({
        "id": 1,
        "homeCompetitor": {
            "id": 50,
            "name": "Home FC",
            "lineups": {"members": [{"id": 7, "name": "A"}]}
        },
        "events": [{"playerId": 7, "playerName": "B", "competitorId": 50}]
    }));
    let ids = resolve(&detail);

    assert_eq!(ids.player_name(Some(7)).as_deref(), Some("A"));
}

#[test]
fn members_as_flat_list_infers_sides_from_competitor_ids() {
    let detail = detail_from(serde_json::json!({
        "id": 2,
        "homeCompetitor": {"id": 50, "name": "Home FC"},
        "awayCompetitor": {"id": 60, "name": "Away FC"},
        "members": [
            {"id": 1, "name": "Home Player", "competitorId": 50},
            {"id": 2, "name": "Away Player", "competitorId": 60},
            {"id": 3, "name": "Stray Player", "competitorId": 70}
        ]
    }));
    let ids = resolve(&detail);

    assert_eq!(ids.player(1).and_then(|p| p.team_id), Some(50));
    assert_eq!(ids.player(2).and_then(|p| p.team_id), Some(60));
    // An unknown competitorId still yields the player, just without a side.
    assert_eq!(ids.player_name(Some(3)).as_deref(), Some("Stray Player"));
    assert_eq!(ids.player(3).and_then(|p| p.team_id), None);
}

#[test]
fn members_as_keyed_object_assigns_sides() {
    let detail = detail_from(serde_json::json!({
        "id": 3,
        "homeCompetitor": {"id": 50, "name": "Home FC"},
        "awayCompetitor": {"id": 60, "name": "Away FC"},
        "members": {
            "homeTeamMembers": [{"id": 1, "name": "Home Player"}],
            "awayTeamMembers": [{"id": 2, "name": "Away Player"}]
        }
    }));
    let ids = resolve(&detail);

    assert_eq!(ids.player(1).and_then(|p| p.team_id), Some(50));
    assert_eq!(ids.player(2).and_then(|p| p.team_id), Some(60));
}

#[test]
fn null_or_absent_members_resolve_without_error() {
    for members in [serde_json::Value::Null, serde_json::json!("bogus")] {
        let detail = detail_from(serde_json::json!({
            "id": 4,
            "homeCompetitor": {
                "id": 50,
                "name": "Home FC",
                "lineups": {"members": [{"id": 7, "name": "A"}]}
            },
            "members": members
        }));
        let ids = resolve(&detail);
        assert_eq!(ids.player_name(Some(7)).as_deref(), Some("A"));
    }

    let detail = detail_from(serde_json::json!({
        "id": 5,
        "homeCompetitor": {"id": 50, "name": "Home FC"}
    }));
    let ids = resolve(&detail);
    assert_eq!(ids.player_count(), 0);
}

#[test]
fn top_performer_fills_gaps_by_athlete_id() {
    let detail = detail_from(serde_json::json!({
        "id": 6,
        "homeCompetitor": {"id": 50, "name": "Home FC"},
        "topPerformers": {"categories": [{
            "name": "Top Scorer",
            "homePlayer": {
                "athleteId": 800,
                "name": "Athlete Only",
                "positionName": "Forward"
            }
        }]}
    }));
    let ids = resolve(&detail);

    assert_eq!(ids.player_name(Some(800)).as_deref(), Some("Athlete Only"));
    assert_eq!(
        ids.player(800).and_then(|p| p.position_name.clone()).as_deref(),
        Some("Forward")
    );
}

#[test]
fn zero_is_a_real_player_id() {
    let detail = detail_from(serde_json::json!({
        "id": 7,
        "homeCompetitor": {
            "id": 50,
            "name": "Home FC",
            "lineups": {"members": [{"id": 0, "name": "Zero Id"}]}
        }
    }));
    let ids = resolve(&detail);

    assert_eq!(ids.player_name(Some(0)).as_deref(), Some("Zero Id"));
}

#[test]
fn later_sources_fill_missing_fields_without_overwriting() {
    let detail = detail_from(serde_json::json!({
        "id": 8,
        "homeCompetitor": {
            "id": 50,
            "name": "Home FC",
            // Lineup knows the name but not the jersey number.
            "lineups": {"members": [{"id": 7, "name": "A"}]}
        },
        "members": {
            "homeTeamMembers": [{"id": 7, "name": "Stale Name", "jerseyNumber": 10}],
            "awayTeamMembers": []
        }
    }));
    let ids = resolve(&detail);

    let player = ids.player(7).expect("player should resolve");
    assert_eq!(player.name.as_deref(), Some("A"));
    assert_eq!(player.jersey_number, Some(10));
}
