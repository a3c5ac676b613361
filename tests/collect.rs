use std::collections::HashMap;
use std::sync::Mutex;

use scores365::collect::{
    CollectOptions, PageSource, collect_competition, collect_competition_parallel,
};
use scores365::listing::{Direction, MatchSummary, ResultsPage, StatusFilter, parse_start_time};

struct ScriptedSource {
    pages: HashMap<(Option<u64>, Direction), ResultsPage>,
    calls: Mutex<Vec<(Option<u64>, Direction)>>,
}

impl ScriptedSource {
    fn new(pages: Vec<((Option<u64>, Direction), ResultsPage)>) -> Self {
        ScriptedSource {
            pages: pages.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self, after: Option<u64>, direction: Direction) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|&&key| key == (after, direction))
            .count()
    }
}

impl PageSource for ScriptedSource {
    fn fetch_page(
        &self,
        _competition_id: u32,
        after: Option<u64>,
        direction: Direction,
        _page_size: u32,
    ) -> ResultsPage {
        self.calls.lock().expect("calls lock").push((after, direction));
        self.pages
            .get(&(after, direction))
            .cloned()
            .unwrap_or_else(ResultsPage::empty)
    }
}

fn summary(id: i64, time: &str) -> MatchSummary {
    MatchSummary {
        match_id: id,
        season: Some(25),
        round: None,
        status: Some("FT".to_string()),
        start_time_raw: Some(time.to_string()),
        start_time: parse_start_time(time),
        start_date: None,
        start_clock: None,
        home_team: None,
        home_score: 0,
        away_team: None,
        away_score: 0,
        competition_id: Some(7),
        sport_id: Some(1),
    }
}

fn page(
    rows: Vec<MatchSummary>,
    prev_token: Option<u64>,
    next_token: Option<u64>,
    total_games: u64,
) -> ResultsPage {
    ResultsPage {
        rows,
        next_token,
        prev_token,
        total_games,
    }
}

fn overlapping_walk() -> ScriptedSource {
    ScriptedSource::new(vec![
        (
            (None, Direction::Newer),
            page(
                vec![
                    summary(20, "2025-05-03T10:00:00"),
                    summary(21, "2025-05-03T12:00:00"),
                ],
                Some(100),
                Some(200),
                6,
            ),
        ),
        (
            (Some(100), Direction::Older),
            page(
                vec![
                    // Overlaps the initial page; must not reappear.
                    summary(21, "2025-05-03T12:00:00"),
                    summary(10, "2025-05-01T10:00:00"),
                ],
                Some(101),
                None,
                6,
            ),
        ),
        (
            (Some(101), Direction::Older),
            page(vec![summary(11, "2025-05-02T10:00:00")], None, None, 6),
        ),
        (
            (Some(200), Direction::Newer),
            page(vec![summary(30, "2025-05-04T10:00:00")], None, None, 6),
        ),
    ])
}

fn collected_ids(matches: &[MatchSummary]) -> Vec<i64> {
    matches.iter().map(|m| m.match_id).collect()
}

#[test]
fn walks_both_directions_and_dedups_overlap() {
    let source = overlapping_walk();
    let outcome = collect_competition(&source, 7, &CollectOptions::default());

    assert_eq!(collected_ids(&outcome.matches), vec![10, 11, 20, 21, 30]);
    assert_eq!(outcome.total_reported, 6);
    assert_eq!(outcome.pages_fetched, 4);
    assert!(outcome.errors.is_empty());
}

#[test]
fn parallel_and_sequential_orders_are_identical() {
    let sequential = collect_competition(&overlapping_walk(), 7, &CollectOptions::default());
    let parallel =
        collect_competition_parallel(&overlapping_walk(), 7, &CollectOptions::default());

    assert_eq!(
        collected_ids(&sequential.matches),
        collected_ids(&parallel.matches)
    );
}

#[test]
fn repeated_token_terminates_the_direction() {
    let source = ScriptedSource::new(vec![
        (
            (None, Direction::Newer),
            page(vec![summary(1, "2025-05-01T10:00:00")], Some(100), None, 9),
        ),
        (
            (Some(100), Direction::Older),
            // Continuation points back at itself.
            page(vec![summary(2, "2025-04-30T10:00:00")], Some(100), None, 9),
        ),
    ]);
    let outcome = collect_competition(&source, 7, &CollectOptions::default());

    assert_eq!(source.call_count(Some(100), Direction::Older), 1);
    assert_eq!(collected_ids(&outcome.matches), vec![2, 1]);
    assert!(
        outcome
            .errors
            .iter()
            .any(|err| err.contains("repeated cursor token"))
    );
}

#[test]
fn repeated_token_terminates_the_parallel_walk() {
    let source = ScriptedSource::new(vec![
        (
            (None, Direction::Newer),
            page(vec![summary(1, "2025-05-01T10:00:00")], Some(100), None, 9),
        ),
        (
            (Some(100), Direction::Older),
            page(vec![summary(2, "2025-04-30T10:00:00")], Some(100), None, 9),
        ),
    ]);
    let outcome = collect_competition_parallel(&source, 7, &CollectOptions::default());

    assert_eq!(source.call_count(Some(100), Direction::Older), 1);
    assert_eq!(collected_ids(&outcome.matches), vec![2, 1]);
}

#[test]
fn page_ceiling_stops_the_walk() {
    let mut opts = CollectOptions::default();
    opts.max_pages_per_direction = 2;
    let source = ScriptedSource::new(vec![
        (
            (None, Direction::Newer),
            page(vec![summary(1, "2025-05-04T10:00:00")], Some(100), None, 9),
        ),
        (
            (Some(100), Direction::Older),
            page(vec![summary(2, "2025-05-03T10:00:00")], Some(101), None, 9),
        ),
        (
            (Some(101), Direction::Older),
            page(vec![summary(3, "2025-05-02T10:00:00")], Some(102), None, 9),
        ),
        (
            (Some(102), Direction::Older),
            page(vec![summary(4, "2025-05-01T10:00:00")], None, None, 9),
        ),
    ]);
    let outcome = collect_competition(&source, 7, &opts);

    assert_eq!(source.call_count(Some(102), Direction::Older), 0);
    assert_eq!(collected_ids(&outcome.matches), vec![3, 2, 1]);
    assert!(outcome.errors.iter().any(|err| err.contains("page ceiling")));
}

#[test]
fn record_ceiling_stops_the_walk() {
    let mut opts = CollectOptions::default();
    opts.max_records = Some(3);
    let source = ScriptedSource::new(vec![
        (
            (None, Direction::Newer),
            page(
                vec![
                    summary(1, "2025-05-04T10:00:00"),
                    summary(2, "2025-05-04T12:00:00"),
                ],
                Some(100),
                None,
                20,
            ),
        ),
        (
            (Some(100), Direction::Older),
            page(
                vec![
                    summary(3, "2025-05-03T10:00:00"),
                    summary(4, "2025-05-03T12:00:00"),
                ],
                Some(101),
                None,
                20,
            ),
        ),
        (
            (Some(101), Direction::Older),
            page(vec![summary(5, "2025-05-02T10:00:00")], None, None, 20),
        ),
    ]);
    let outcome = collect_competition(&source, 7, &opts);

    assert_eq!(source.call_count(Some(101), Direction::Older), 0);
    assert_eq!(outcome.matches.len(), 3);
    assert!(
        outcome
            .errors
            .iter()
            .any(|err| err.contains("record ceiling"))
    );
}

#[test]
fn empty_first_page_yields_empty_outcome() {
    let source = ScriptedSource::new(Vec::new());
    let outcome = collect_competition(&source, 7, &CollectOptions::default());

    assert!(outcome.matches.is_empty());
    assert_eq!(outcome.pages_fetched, 1);
    assert!(outcome.errors.is_empty());
}

#[test]
fn unparseable_times_fall_back_to_id_order() {
    let source = ScriptedSource::new(vec![(
        (None, Direction::Newer),
        page(
            vec![
                summary(31, "nope"),
                summary(12, "also nope"),
                summary(25, ""),
            ],
            None,
            None,
            3,
        ),
    )]);
    let outcome = collect_competition(&source, 7, &CollectOptions::default());

    assert_eq!(collected_ids(&outcome.matches), vec![12, 25, 31]);
}

#[test]
fn status_filter_applies_to_the_final_rows() {
    let mut upcoming = summary(2, "2025-05-05T10:00:00");
    upcoming.status = Some("NS".to_string());
    let source = ScriptedSource::new(vec![(
        (None, Direction::Newer),
        page(
            vec![summary(1, "2025-05-04T10:00:00"), upcoming],
            None,
            None,
            2,
        ),
    )]);

    let mut opts = CollectOptions::default();
    opts.status_filter = Some(StatusFilter::Finished);
    let outcome = collect_competition(&source, 7, &opts);

    assert_eq!(collected_ids(&outcome.matches), vec![1]);
}
