use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::listing::MatchSummary;
use crate::project::MatchTables;

/// Write every flat table as a JSON records file into `dir`, plus the
/// dynamic stat-column report.
pub fn write_tables(dir: &Path, tables: &MatchTables) -> Result<()> {
    fs::create_dir_all(dir).context("create output directory")?;
    write_records(&dir.join("matches.json"), &tables.matches)?;
    write_records(&dir.join("players.json"), &tables.players)?;
    write_records(&dir.join("events.json"), &tables.events)?;
    write_records(&dir.join("shot_events.json"), &tables.shot_events)?;
    write_records(&dir.join("top_performers.json"), &tables.top_performers)?;
    write_records(&dir.join("widgets.json"), &tables.widgets)?;
    write_records(&dir.join("officials.json"), &tables.officials)?;
    write_records(&dir.join("stages.json"), &tables.stages)?;
    let stat_keys: Vec<&String> = tables.stat_keys.iter().collect();
    write_records(&dir.join("stat_columns.json"), &stat_keys)?;
    Ok(())
}

/// Write the deduplicated listing rows.
pub fn write_summaries(dir: &Path, rows: &[MatchSummary]) -> Result<()> {
    fs::create_dir_all(dir).context("create output directory")?;
    write_records(&dir.join("match_index.json"), rows)
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)
        .with_context(|| format!("serialize {}", path.display()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}
