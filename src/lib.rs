//! Collector and flattener for 365Scores-style football match data.
//!
//! Two pipelines share one retrying transport: the collection engine walks
//! a competition's paginated listing in both directions and returns
//! deduplicated, chronologically ordered match summaries; the flattening
//! pipeline turns one match's nested payload into independent flat tables
//! after resolving player and team identities across its redundant sources.

pub mod collect;
pub mod detail_fetch;
pub mod enrich;
pub mod http_cache;
pub mod http_client;
pub mod listing;
pub mod match_url;
pub mod persist;
pub mod project;
pub mod resolve;
pub mod schema;
pub mod team_stats;
pub mod util;
