//! Command-line check of the loader: loads a file the way the app does and
//! prints what came out.
//!
//! Usage: `inspect <file> [--json] [--whole] [--delimiter <char>]`

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::env;

use sensorgrid::config::{AppConfig, CHUNK_ROWS_ENV};
use sensorgrid::loader::{LoadEvent, LoadMode, Loader};
use sensorgrid::parsers::{ColumnKind, DataSet, DelimitedParser, Value};

#[derive(Serialize)]
struct ColumnSummary<'a> {
    name: &'a str,
    kind: ColumnKind,
    present: usize,
}

#[derive(Serialize)]
struct Summary<'a> {
    path: String,
    rows: usize,
    batches: usize,
    columns: Vec<ColumnSummary<'a>>,
    preview: Vec<Vec<&'a Value>>,
}

struct Args {
    path: String,
    json: bool,
    whole: bool,
    delimiter: Option<u8>,
}

fn parse_args() -> Result<Args> {
    let mut path = None;
    let mut json = false;
    let mut whole = false;
    let mut delimiter = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--whole" => whole = true,
            "--delimiter" => {
                let value = args.next().context("--delimiter needs a value")?;
                let byte = match value.as_str() {
                    "\\t" | "tab" => b'\t',
                    v if v.len() == 1 => v.as_bytes()[0],
                    v => bail!("Delimiter must be a single character, got {:?}", v),
                };
                delimiter = Some(byte);
            }
            other if path.is_none() => path = Some(other.to_string()),
            other => bail!("Unexpected argument: {}", other),
        }
    }

    Ok(Args {
        path: path.context("Usage: inspect <file> [--json] [--whole] [--delimiter <char>]")?,
        json,
        whole,
        delimiter,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = parse_args()?;
    let mode = if args.whole {
        LoadMode::WholeFile
    } else {
        AppConfig::from_sources(std::iter::empty(), env::var(CHUNK_ROWS_ENV).ok()).load_mode
    };

    let parser = match args.delimiter {
        Some(d) => DelimitedParser::with_delimiter(d),
        None => DelimitedParser::default(),
    };

    let loader = Loader::new(&args.path, mode).with_parser(parser);
    let path = loader.path().display().to_string();
    let events = loader.spawn().wait();

    let mut data = DataSet::default();
    let mut batches = 0;
    for event in events {
        match event {
            LoadEvent::Batch(batch) => {
                batches += 1;
                data.append(batch);
            }
            LoadEvent::Progress(progress) if !args.json => {
                eprintln!(
                    "  batch {} ({:.0}%)",
                    progress.batches,
                    progress.fraction() * 100.0
                );
            }
            LoadEvent::Error(error) => {
                bail!("{} [{}]", error.message, error.kind);
            }
            _ => {}
        }
    }

    let summary = Summary {
        path,
        rows: data.row_count(),
        batches,
        columns: data
            .columns
            .iter()
            .map(|c| ColumnSummary {
                name: &c.name,
                kind: c.kind(),
                present: c.present_count(),
            })
            .collect(),
        preview: (0..data.row_count().min(5))
            .map(|row| data.columns.iter().map(|c| &c.values[row]).collect())
            .collect(),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serializing summary")?
        );
        return Ok(());
    }

    println!("File: {}", summary.path);
    println!("Rows: {} in {} batches", summary.rows, summary.batches);
    println!("\n=== Columns ===");
    for (i, column) in summary.columns.iter().enumerate() {
        println!(
            "  {:2}. {} ({}, {} values)",
            i + 1,
            column.name,
            column.kind,
            column.present
        );
    }

    println!("\n=== First rows ===");
    let header: Vec<String> = summary
        .columns
        .iter()
        .map(|c| format!("{:>12}", c.name))
        .collect();
    println!("  {}", header.join(" | "));
    for row in &summary.preview {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>12}", v.to_string())).collect();
        println!("  {}", cells.join(" | "));
    }

    Ok(())
}
