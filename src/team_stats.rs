//! Per-team aggregate statistics.
//!
//! The upstream reports team totals in three inconsistent places. Each
//! tier is a pure strategy; they are tried in priority order and the first
//! non-empty result wins:
//!
//! 1. the competitor's explicit `statistics` block,
//! 2. the competitor's `status` block,
//! 3. numeric player-level stats summed across the lineup.

use serde_json::{Number, Value};

use crate::schema::Competitor;
use crate::util::as_f64;

/// Ordered (name, value) pairs for one team, from the first tier that
/// produced anything.
pub fn team_aggregate_stats(comp: &Competitor) -> Vec<(String, Value)> {
    if let Some(stats) = stats_from_block(comp.statistics.as_ref()) {
        return stats;
    }
    if let Some(stats) = stats_from_block(comp.status_block.as_ref()) {
        return stats;
    }
    aggregate_lineup_stats(comp)
}

/// An explicit block is either a name→value object or a list of
/// `{name, value}` entries; anything else (or an empty block) yields None
/// so the next tier gets a chance.
fn stats_from_block(block: Option<&Value>) -> Option<Vec<(String, Value)>> {
    let block = block?;
    let stats: Vec<(String, Value)> = match block {
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        Value::Array(list) => list
            .iter()
            .filter_map(|entry| {
                let name = entry.get("name").and_then(Value::as_str)?;
                Some((name.to_string(), entry.get("value").cloned().unwrap_or(Value::Null)))
            })
            .collect(),
        _ => return None,
    };
    if stats.is_empty() { None } else { Some(stats) }
}

/// Sum numeric player stats by name across the lineup; for non-numeric
/// stat names, the first value seen is kept.
fn aggregate_lineup_stats(comp: &Competitor) -> Vec<(String, Value)> {
    let mut names: Vec<String> = Vec::new();
    let mut sums: Vec<Option<f64>> = Vec::new();
    let mut firsts: Vec<Value> = Vec::new();

    let Some(lineup) = comp.lineup.as_ref() else {
        return Vec::new();
    };
    for member in &lineup.members {
        for stat in &member.stats {
            let Some(name) = stat.name.as_deref() else {
                continue;
            };
            let value = stat.value.clone().unwrap_or(Value::Null);
            let numeric = as_f64(&value);
            match names.iter().position(|n| n.as_str() == name) {
                Some(idx) => {
                    if let (Some(total), Some(num)) = (sums[idx], numeric) {
                        sums[idx] = Some(total + num);
                    }
                }
                None => {
                    names.push(name.to_string());
                    sums.push(numeric);
                    firsts.push(value);
                }
            }
        }
    }

    names
        .into_iter()
        .zip(sums)
        .zip(firsts)
        .map(|((name, sum), first)| match sum {
            Some(total) => (name, number_value(total)),
            None => (name, first),
        })
        .collect()
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

/// Resolve one statistic by trying candidate names case-insensitively.
/// A structured stat value is unwrapped to its nested `value`, `home` or
/// `total` field when one is present.
pub fn lookup_stat(stats: &[(String, Value)], candidates: &[&str]) -> Option<Value> {
    for candidate in candidates {
        for (name, value) in stats {
            if name.eq_ignore_ascii_case(candidate) {
                return Some(unwrap_stat_value(value));
            }
        }
    }
    None
}

fn unwrap_stat_value(value: &Value) -> Value {
    if let Some(map) = value.as_object() {
        for key in ["value", "home", "total"] {
            if let Some(inner) = map.get(key) {
                return inner.clone();
            }
        }
    }
    value.clone()
}
