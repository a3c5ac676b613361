//! Per-match enrichment: fetch each collected match's nested payload,
//! resolve identities, project to flat tables and merge the results.
//! One bad match degrades to a skip, never to a failed batch.

use rayon::prelude::*;
use reqwest::blocking::Client;

use crate::collect::with_fetch_pool;
use crate::detail_fetch::fetch_match_detail;
use crate::listing::MatchSummary;
use crate::project::{MatchTables, ProjectOptions, project};
use crate::resolve;

pub struct EnrichOutcome {
    pub tables: MatchTables,
    pub fetched: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Fetch and flatten the detail payload for every summary row, fanning the
/// fetches out over a bounded pool. Workers only return data; the merge
/// into run-level tables happens on the coordinating thread.
pub fn enrich_matches(
    client: &Client,
    matches: &[MatchSummary],
    opts: &ProjectOptions,
    workers: usize,
) -> EnrichOutcome {
    let per_match: Vec<(i64, Option<MatchTables>)> = with_fetch_pool(workers, || {
        matches
            .par_iter()
            .map(|summary| {
                let detail =
                    fetch_match_detail(client, summary.match_id, summary.competition_id, None);
                let tables = detail.map(|detail| {
                    let ids = resolve::resolve(&detail);
                    project(&detail, &ids, opts)
                });
                (summary.match_id, tables)
            })
            .collect()
    });

    let mut outcome = EnrichOutcome {
        tables: MatchTables::default(),
        fetched: 0,
        skipped: 0,
        errors: Vec::new(),
    };
    for (match_id, tables) in per_match {
        match tables {
            Some(tables) => {
                outcome.fetched += 1;
                outcome.tables.merge(tables);
            }
            None => {
                outcome.skipped += 1;
                outcome.errors.push(format!("match {match_id} skipped"));
            }
        }
    }
    outcome
}
