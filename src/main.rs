use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use scores365::collect::{
    CollectOptions, HttpPageSource, collect_competition, collect_competition_parallel,
};
use scores365::enrich::enrich_matches;
use scores365::http_client::http_client;
use scores365::listing::StatusFilter;
use scores365::persist;
use scores365::project::ProjectOptions;

struct CliArgs {
    competition_id: u32,
    fast: bool,
    details: bool,
    referee_only: bool,
    out_dir: PathBuf,
    opts: CollectOptions,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = parse_args()?;
    let source = HttpPageSource;

    let outcome = if args.fast {
        collect_competition_parallel(&source, args.competition_id, &args.opts)
    } else {
        collect_competition(&source, args.competition_id, &args.opts)
    };

    println!("Collection complete for competition {}", args.competition_id);
    println!(
        "Matches: {} (upstream reports {})",
        outcome.matches.len(),
        outcome.total_reported
    );
    println!("Pages fetched: {}", outcome.pages_fetched);
    if !outcome.errors.is_empty() {
        println!("Degraded: {}", outcome.errors.len());
        for err in outcome.errors.iter().take(6) {
            println!("  - {err}");
        }
    }

    persist::write_summaries(&args.out_dir, &outcome.matches)?;
    println!("Wrote match index to {}", args.out_dir.display());

    if args.details {
        let client = http_client()?;
        let project_opts = ProjectOptions {
            officials_role: args.referee_only.then(|| "referee".to_string()),
        };
        let enriched = enrich_matches(client, &outcome.matches, &project_opts, args.opts.workers);
        println!(
            "Flattened {} matches ({} skipped), {} rows across {} stat columns",
            enriched.fetched,
            enriched.skipped,
            enriched.tables.row_count(),
            enriched.tables.stat_keys.len()
        );
        persist::write_tables(&args.out_dir, &enriched.tables)?;
        println!("Wrote flat tables to {}", args.out_dir.display());
    }

    Ok(())
}

fn parse_args() -> Result<CliArgs> {
    let mut competition_id = None;
    let mut fast = false;
    let mut details = false;
    let mut referee_only = false;
    let mut out_dir = PathBuf::from("tables");
    let mut opts = CollectOptions::from_env();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--fast" => fast = true,
            "--details" => details = true,
            "--referee-only" => referee_only = true,
            "--out" => {
                out_dir = PathBuf::from(required_value(&mut args, "--out")?);
            }
            "--status" => {
                let name = required_value(&mut args, "--status")?;
                opts.status_filter = Some(
                    StatusFilter::from_name(&name)
                        .ok_or_else(|| anyhow!("unknown status filter: {name}"))?,
                );
            }
            "--page-size" => {
                opts.page_size = parse_number(&mut args, "--page-size")?;
            }
            "--max-pages" => {
                opts.max_pages_per_direction = parse_number(&mut args, "--max-pages")?;
            }
            "--max-games" => {
                opts.max_records = Some(parse_number(&mut args, "--max-games")?);
            }
            "--workers" => {
                opts.workers = parse_number(&mut args, "--workers")?;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if competition_id.is_none() => {
                competition_id = Some(
                    other
                        .parse::<u32>()
                        .with_context(|| format!("invalid competition id: {other}"))?,
                );
            }
            other => return Err(anyhow!("unexpected argument: {other}")),
        }
    }

    let Some(competition_id) = competition_id else {
        print_usage();
        return Err(anyhow!("missing competition id"));
    };

    Ok(CliArgs {
        competition_id,
        fast,
        details,
        referee_only,
        out_dir,
        opts,
    })
}

fn required_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().ok_or_else(|| anyhow!("{flag} needs a value"))
}

fn parse_number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<T> {
    let raw = required_value(args, flag)?;
    raw.parse::<T>()
        .map_err(|_| anyhow!("{flag} needs a numeric value, got {raw}"))
}

fn print_usage() {
    println!("usage: scores365 <competition-id> [options]");
    println!();
    println!("  --fast             fetch listing pages on a worker pool");
    println!("  --details          also fetch and flatten every match payload");
    println!("  --status NAME      keep only finished | upcoming | live matches");
    println!("  --referee-only     project only referee rows into the officials table");
    println!("  --out DIR          output directory (default: tables)");
    println!("  --page-size N      listing page size");
    println!("  --max-pages N      page ceiling per walk direction");
    println!("  --max-games N      total record ceiling");
    println!("  --workers N        worker pool size for --fast/--details");
}
