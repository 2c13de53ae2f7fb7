use std::fs;
use std::path::Path;
use std::process;

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};

use mapback::{ErrorReport, ResolveQuery, SourceMap, SourceMapResolver};

fn main() {
    let matches = Command::new("mapback")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve generated positions back to original sources")
        .subcommand_required(true)
        .subcommand(
            Command::new("resolve")
                .about("Resolve a generated position against a source map")
                .arg(
                    Arg::new("map")
                        .short('m')
                        .long("map")
                        .value_name("FILE")
                        .help("A .map file, or generated .js with an inline map")
                        .required(true),
                )
                .arg(
                    Arg::new("line")
                        .short('l')
                        .long("line")
                        .value_name("LINE")
                        .help("Generated line, 1-based"),
                )
                .arg(
                    Arg::new("column")
                        .short('c')
                        .long("column")
                        .value_name("COLUMN")
                        .help("Generated column, 0-based"),
                )
                .arg(
                    Arg::new("report")
                        .short('r')
                        .long("report")
                        .value_name("FILE")
                        .help("Error report JSON captured by the page"),
                ),
        )
        .subcommand(
            Command::new("dump")
                .about("Print every mapping record in a source map")
                .arg(
                    Arg::new("map")
                        .short('m')
                        .long("map")
                        .value_name("FILE")
                        .help("A .map file, or generated .js with an inline map")
                        .required(true),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("resolve", sub)) => run_resolve(sub),
        Some(("dump", sub)) => run_dump(sub),
        _ => Err(anyhow!("a subcommand is required")),
    };

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

fn run_resolve(matches: &ArgMatches) -> Result<()> {
    let map_path = matches.get_one::<String>("map").context("--map is required")?;

    let query = if let Some(report_path) = matches.get_one::<String>("report") {
        let text = fs::read_to_string(report_path)
            .with_context(|| format!("failed to read report {}", report_path))?;
        let report: ErrorReport = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse report {}", report_path))?;
        println!("{} report: {}", report.kind.as_str(), report.message);
        ResolveQuery::from(&report)
    } else {
        ResolveQuery {
            line: required_number(matches, "line")?,
            column: required_number(matches, "column")?,
        }
    };

    let map = load_map(map_path)?;
    let resolver = SourceMapResolver::parse(&map)?;

    match resolver.resolve(query)? {
        Some(hit) => {
            println!(
                "{}:{}:{}",
                hit.position.source, hit.position.line, hit.position.column
            );
            if let Some(name) = &hit.position.name {
                println!("name: {}", name);
            }
            if !hit.content.is_empty() {
                println!("--- embedded source ---");
                println!("{}", hit.content);
            }
        }
        None => println!("no mapping at {}:{}", query.line, query.column),
    }

    Ok(())
}

fn run_dump(matches: &ArgMatches) -> Result<()> {
    let map_path = matches.get_one::<String>("map").context("--map is required")?;

    let map = load_map(map_path)?;
    let resolver = SourceMapResolver::parse(&map)?;

    println!(
        "{} sources, {} names, {} records",
        map.sources.len(),
        map.names.len(),
        resolver.records().len()
    );

    for record in resolver.records() {
        match record.original {
            Some(original) => {
                let name = original
                    .name
                    .map(|index| format!(" ({})", map.names[index as usize]))
                    .unwrap_or_default();
                println!(
                    "{}:{} -> {} {}:{}{}",
                    record.generated_line + 1,
                    record.generated_column,
                    map.sources[original.source as usize],
                    original.line + 1,
                    original.column + 1,
                    name
                );
            }
            None => println!(
                "{}:{} -> generated only",
                record.generated_line + 1,
                record.generated_column
            ),
        }
    }

    Ok(())
}

/// Loads a map from a .map JSON file, or digs the inline data-URL map out
/// of a generated .js file.
fn load_map(path: &str) -> Result<SourceMap> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;

    let looks_like_json = Path::new(path).extension().is_some_and(|ext| ext == "map")
        || text.trim_start().starts_with('{');
    if looks_like_json {
        return SourceMap::from_json(&text)
            .with_context(|| format!("{} is not a valid source map", path));
    }

    let url = mapback::locate_reference(&text)
        .ok_or_else(|| anyhow!("{} carries no sourceMappingURL comment", path))?;
    SourceMap::from_data_url(url)
        .with_context(|| format!("{} has an unusable inline source map", path))
}

fn required_number(matches: &ArgMatches, name: &str) -> Result<i64> {
    let raw = matches
        .get_one::<String>(name)
        .with_context(|| format!("--{} is required unless --report is given", name))?;
    raw.parse::<i64>()
        .with_context(|| format!("--{} expects an integer, got {:?}", name, raw))
}
