//! Bidirectional cursor walk over one competition's listing.
//!
//! The initial page anchors the walk; the engine then follows `prevPage`
//! cursors toward older matches and `nextPage` cursors toward newer ones
//! until a direction runs out of tokens, repeats one, or hits a ceiling.
//! Every guard is a cooperative stop: whatever was collected so far is
//! always returned.

use std::collections::HashSet;
use std::env;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::warn;

use crate::http_client::http_client;
use crate::listing::{
    Direction, MatchSummary, ResultsPage, StatusFilter, apply_status_filter, fetch_results_page,
};

/// Seam between the engine and the pager; tests drive the engine with
/// scripted sources.
pub trait PageSource {
    fn fetch_page(
        &self,
        competition_id: u32,
        after: Option<u64>,
        direction: Direction,
        page_size: u32,
    ) -> ResultsPage;
}

/// Live pager backed by the shared retrying client.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpPageSource;

impl PageSource for HttpPageSource {
    fn fetch_page(
        &self,
        competition_id: u32,
        after: Option<u64>,
        direction: Direction,
        page_size: u32,
    ) -> ResultsPage {
        match http_client() {
            Ok(client) => fetch_results_page(client, competition_id, after, direction, page_size),
            Err(err) => {
                warn!("http client unavailable: {err:#}");
                ResultsPage::empty()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub page_size: u32,
    pub max_pages_per_direction: u32,
    pub max_records: Option<usize>,
    pub status_filter: Option<StatusFilter>,
    pub workers: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        CollectOptions {
            page_size: 50,
            max_pages_per_direction: 1000,
            max_records: None,
            status_filter: None,
            workers: fetch_parallelism(),
        }
    }
}

impl CollectOptions {
    /// Defaults with environment overrides, clamped to sane ranges.
    pub fn from_env() -> Self {
        let mut opts = CollectOptions::default();
        opts.page_size = env::var("RESULTS_PAGE_SIZE")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(opts.page_size)
            .clamp(1, 200);
        opts.max_pages_per_direction = env::var("RESULTS_MAX_PAGES")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(opts.max_pages_per_direction)
            .max(1);
        opts.max_records = env::var("RESULTS_MAX_GAMES")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .or(opts.max_records);
        opts.status_filter = env::var("RESULTS_STATUS_FILTER")
            .ok()
            .as_deref()
            .and_then(StatusFilter::from_name)
            .or(opts.status_filter);
        opts
    }
}

pub fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(2, 32)
}

/// A finished collection run. `errors` reports degraded units (ceilings
/// hit, cycles broken) — a run never fails outright.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    pub matches: Vec<MatchSummary>,
    pub total_reported: u64,
    pub pages_fetched: u32,
    pub errors: Vec<String>,
}

/// Sequential bidirectional walk. Output is deduplicated by match id
/// (first occurrence wins) and sorted chronologically.
pub fn collect_competition<P: PageSource>(
    source: &P,
    competition_id: u32,
    opts: &CollectOptions,
) -> CollectOutcome {
    let mut outcome = CollectOutcome::default();
    let mut seen_ids = HashSet::new();
    let mut rows = Vec::new();

    let first = source.fetch_page(competition_id, None, Direction::Newer, opts.page_size);
    outcome.pages_fetched += 1;
    outcome.total_reported = first.total_games;
    if first.rows.is_empty() {
        return outcome;
    }

    let prev_token = first.prev_token;
    let next_token = first.next_token;
    absorb(&mut rows, &mut seen_ids, first.rows);

    for (direction, start) in [
        (Direction::Older, prev_token),
        (Direction::Newer, next_token),
    ] {
        walk_direction(
            source,
            competition_id,
            opts,
            direction,
            start,
            &mut rows,
            &mut seen_ids,
            &mut outcome,
        );
    }

    outcome.matches = finalize(rows, opts);
    outcome
}

#[allow(clippy::too_many_arguments)]
fn walk_direction<P: PageSource>(
    source: &P,
    competition_id: u32,
    opts: &CollectOptions,
    direction: Direction,
    start: Option<u64>,
    rows: &mut Vec<MatchSummary>,
    seen_ids: &mut HashSet<i64>,
    outcome: &mut CollectOutcome,
) {
    let mut token = start;
    let mut seen_tokens: HashSet<u64> = HashSet::new();
    let mut pages = 0u32;

    while let Some(after) = token {
        if pages >= opts.max_pages_per_direction {
            outcome.errors.push(format!(
                "{direction:?} walk stopped at the page ceiling ({})",
                opts.max_pages_per_direction
            ));
            break;
        }
        if !seen_tokens.insert(after) {
            outcome
                .errors
                .push(format!("{direction:?} walk stopped on a repeated cursor token"));
            break;
        }
        pages += 1;

        let page = source.fetch_page(competition_id, Some(after), direction, opts.page_size);
        outcome.pages_fetched += 1;
        if page.rows.is_empty() {
            // Failed fetch and end-of-stream look identical here; either
            // way this direction is done.
            break;
        }
        let next = continuation(&page, direction);
        absorb(rows, seen_ids, page.rows);
        if let Some(max) = opts.max_records {
            if seen_ids.len() >= max {
                outcome
                    .errors
                    .push(format!("record ceiling reached ({max})"));
                break;
            }
        }
        token = next;
    }
}

/// Parallel variant: each wave fetches the frontier of unseen tokens on a
/// bounded pool; only the coordinator touches the dedup set and the token
/// queue, so no shared mutable state crosses worker boundaries. The final
/// sort restores the ordering the fetch phase relaxed.
pub fn collect_competition_parallel<P: PageSource + Sync>(
    source: &P,
    competition_id: u32,
    opts: &CollectOptions,
) -> CollectOutcome {
    let mut outcome = CollectOutcome::default();
    let mut seen_ids = HashSet::new();
    let mut rows = Vec::new();

    let first = source.fetch_page(competition_id, None, Direction::Newer, opts.page_size);
    outcome.pages_fetched += 1;
    outcome.total_reported = first.total_games;
    if first.rows.is_empty() {
        return outcome;
    }

    let mut frontier: Vec<(Direction, u64)> = Vec::new();
    if let Some(token) = first.prev_token {
        frontier.push((Direction::Older, token));
    }
    if let Some(token) = first.next_token {
        frontier.push((Direction::Newer, token));
    }
    absorb(&mut rows, &mut seen_ids, first.rows);

    let mut seen_tokens: HashSet<(Direction, u64)> = HashSet::new();
    let mut pages_older = 0u32;
    let mut pages_newer = 0u32;

    'waves: while !frontier.is_empty() {
        let mut batch: Vec<(Direction, u64)> = Vec::new();
        for (direction, token) in frontier.drain(..) {
            let pages = match direction {
                Direction::Older => &mut pages_older,
                Direction::Newer => &mut pages_newer,
            };
            if *pages >= opts.max_pages_per_direction {
                outcome.errors.push(format!(
                    "{direction:?} walk stopped at the page ceiling ({})",
                    opts.max_pages_per_direction
                ));
                continue;
            }
            if !seen_tokens.insert((direction, token)) {
                outcome
                    .errors
                    .push(format!("{direction:?} walk stopped on a repeated cursor token"));
                continue;
            }
            *pages += 1;
            batch.push((direction, token));
        }
        if batch.is_empty() {
            break;
        }

        let fetched: Vec<(Direction, ResultsPage)> = with_fetch_pool(opts.workers, || {
            batch
                .par_iter()
                .map(|&(direction, token)| {
                    (
                        direction,
                        source.fetch_page(competition_id, Some(token), direction, opts.page_size),
                    )
                })
                .collect()
        });
        outcome.pages_fetched += fetched.len() as u32;

        // Merge in dispatch order so first-occurrence dedup is
        // deterministic regardless of completion order.
        for (direction, page) in fetched {
            if page.rows.is_empty() {
                continue;
            }
            let follow_up = continuation(&page, direction);
            absorb(&mut rows, &mut seen_ids, page.rows);
            if let Some(max) = opts.max_records {
                if seen_ids.len() >= max {
                    outcome
                        .errors
                        .push(format!("record ceiling reached ({max})"));
                    break 'waves;
                }
            }
            if let Some(token) = follow_up {
                frontier.push((direction, token));
            }
        }
    }

    outcome.matches = finalize(rows, opts);
    outcome
}

fn continuation(page: &ResultsPage, direction: Direction) -> Option<u64> {
    match direction {
        Direction::Older => page.prev_token,
        Direction::Newer => page.next_token,
    }
}

fn absorb(rows: &mut Vec<MatchSummary>, seen: &mut HashSet<i64>, new: Vec<MatchSummary>) {
    for row in new {
        if seen.insert(row.match_id) {
            rows.push(row);
        }
    }
}

/// Chronological output order: parsed start time ascending with match id
/// as tiebreaker; match id alone when no row carries a parsed time.
fn finalize(mut rows: Vec<MatchSummary>, opts: &CollectOptions) -> Vec<MatchSummary> {
    if rows.iter().all(|row| row.start_time.is_none()) {
        rows.sort_by_key(|row| row.match_id);
    } else {
        rows.sort_by_key(|row| (row.start_time.unwrap_or(NaiveDateTime::MAX), row.match_id));
    }
    if let Some(filter) = opts.status_filter {
        apply_status_filter(&mut rows, filter);
    }
    if let Some(max) = opts.max_records {
        rows.truncate(max);
    }
    rows
}

/// Run a fetch batch on its own bounded pool; falls back to the calling
/// thread if the pool cannot be built.
pub fn with_fetch_pool<T>(workers: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
