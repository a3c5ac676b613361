use std::fs;
use std::path::PathBuf;

use scores365::detail_fetch::parse_match_detail;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_match_detail_fixture() {
    let detail = parse_match_detail(&read_fixture("match_detail.json"))
        .expect("fixture should parse")
        .expect("fixture should carry a game");

    assert_eq!(detail.id, Some(4141001));
    assert_eq!(
        detail.competition_display_name.as_deref(),
        Some("Premier League")
    );

    let home = detail.home_competitor.as_ref().expect("home competitor");
    assert_eq!(home.name.as_deref(), Some("Liverpool"));
    assert_eq!(home.score, 2);
    let lineup = home.lineup.as_ref().expect("home lineup");
    assert_eq!(lineup.formation.as_deref(), Some("4-3-3"));
    assert_eq!(lineup.members.len(), 2);
    assert_eq!(lineup.members[0].stats.len(), 3);
    assert_eq!(home.recent_matches.len(), 1);
    assert_eq!(home.stat_categories.len(), 2);

    assert_eq!(detail.events.len(), 3);
    assert_eq!(detail.officials.len(), 2);
    assert_eq!(detail.stages.len(), 2);
    assert_eq!(detail.top_performers.len(), 1);

    let chart = detail.chart_events.as_ref().expect("chart events");
    assert_eq!(chart.categories.len(), 1);
    assert_eq!(chart.categories["events"].len(), 3);
    // Lookup tables ride alongside the shot categories.
    assert_eq!(chart.event_type_names.get(&1).map(String::as_str), Some("Shot on Target"));
    assert_eq!(chart.status_names.get(&2).map(String::as_str), Some("2nd Half"));
    assert_eq!(chart.sub_type_names.get(&10).map(String::as_str), Some("Header"));
}

#[test]
fn empty_and_envelope_less_bodies_parse_to_none() {
    assert!(parse_match_detail("").expect("empty should parse").is_none());
    assert!(parse_match_detail("null").expect("null should parse").is_none());
    assert!(
        parse_match_detail("{\"lastUpdateId\": 1}")
            .expect("missing game should parse")
            .is_none()
    );
    assert!(
        parse_match_detail("{\"game\": 7}")
            .expect("scalar game should parse")
            .is_none()
    );
}

#[test]
fn garbage_body_is_an_error() {
    assert!(parse_match_detail("<html>nope</html>").is_err());
}

#[test]
fn misshapen_nested_blocks_degrade_to_defaults() {
    let body = serde_json::json!({
        "game": {
            "id": 5,
            "homeCompetitor": {"id": 1, "name": "Home FC", "score": "n/a", "lineups": "postponed"},
            "awayCompetitor": "tbd",
            "events": {"not": "a list"},
            "chartEvents": {"events": []},
            "officials": null
        }
    })
    .to_string();
    let detail = parse_match_detail(&body)
        .expect("payload should parse")
        .expect("payload should carry a game");

    let home = detail.home_competitor.as_ref().expect("home competitor");
    assert_eq!(home.score, 0);
    assert!(home.lineup.is_none());
    assert!(detail.away_competitor.is_none());
    assert!(detail.events.is_empty());
    assert!(detail.chart_events.is_none());
    assert!(detail.officials.is_empty());
}
