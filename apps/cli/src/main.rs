// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footing CLI - trims foundation beam edges against each other.
//!
//! Reads beam centerlines from a JSON job file into an in-memory document,
//! registers them, rebuilds their edges in one batch, prints a report with
//! the integrity scan summary and optionally writes the reference tree.
//!
//! Usage:
//!   footing-cli <beams.json> [options]

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use footing_core::MemoryDocument;
use footing_processing::{BeamRecordManager, ContextRegistry, DetailingConfig, DocumentId};
use footing_references::{Category, HandleStatus};

mod input;

use input::{load_beams, JobFile};

#[derive(Debug, Default)]
struct Options {
    input: PathBuf,
    half_width: Option<f64>,
    tolerance: Option<f64>,
    category: Option<Category>,
    no_join: bool,
    output: Option<PathBuf>,
    threads: Option<usize>,
}

fn main() -> Result<()> {
    let Some(options) = parse_args(env::args().skip(1).collect())? else {
        print_usage();
        return Ok(());
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,footing_processing=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let threads = options.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("failed to build the worker pool")?;

    run(&options)
}

fn run(options: &Options) -> Result<()> {
    let json = fs::read_to_string(&options.input)
        .with_context(|| format!("cannot read {}", options.input.display()))?;
    let job = JobFile::parse(&json)?;

    let mut config = job.config().cloned().unwrap_or_else(DetailingConfig::from_env);
    if let Some(half_width) = options.half_width {
        config.synthesis.half_width = half_width;
    }
    if let Some(tolerance) = options.tolerance {
        config.synthesis.tolerance = tolerance;
    }
    if let Some(category) = options.category {
        config.category = category;
    }
    if options.no_join {
        config.synthesis.join_segments = false;
    }

    tracing::info!(
        input = %options.input.display(),
        beams = job.beams().len(),
        half_width = config.synthesis.half_width,
        tolerance = config.synthesis.tolerance,
        join = config.synthesis.join_segments,
        category = %config.category,
        "Starting edge rebuild"
    );

    let mut doc = MemoryDocument::new();
    let beams = load_beams(&mut doc, job.beams())?;

    let mut registry = ContextRegistry::new();
    let id = DocumentId(1);
    let context = registry.attach(id);
    let mut manager = BeamRecordManager::new(context, &mut doc, config);

    for &beam in &beams {
        manager
            .register_centerline(beam)
            .with_context(|| format!("cannot register beam {}", beam))?;
    }
    let report = manager.rebuild_edges(&beams)?;
    let scan = manager.scan();

    println!("=== Foundation Beam Edges ===");
    println!();
    println!("  Beams:             {}", report.beams);
    println!("  Edges purged:      {}", report.purged);
    println!("  Edges created:     {}", report.created);
    println!("  Pieces kept:       {}", report.kept_pieces);
    println!("  Pieces discarded:  {}", report.discarded_pieces);
    if !report.stale.is_empty() {
        println!("  Stale beams:       {}", join_handles(&report.stale));
    }
    if !report.degenerate.is_empty() {
        println!("  Degenerate beams:  {}", join_handles(&report.degenerate));
    }
    println!();
    for record in manager.records() {
        println!(
            "  {:>8}  left {:>2}  right {:>2}",
            record.centerline.to_string(),
            record.left.len(),
            record.right.len()
        );
    }
    println!();
    println!(
        "  Scan: {} valid, {} missing, {} invalid, {} errors",
        scan.count(HandleStatus::Valid),
        scan.count(HandleStatus::Missing),
        scan.count(HandleStatus::Invalid),
        scan.count(HandleStatus::Error)
    );

    if let Some(path) = &options.output {
        let tree = manager.tree().to_json()?;
        fs::write(path, tree).with_context(|| format!("cannot write {}", path.display()))?;
        println!("  Reference tree written to {}", path.display());
    }
    Ok(())
}

/// Parses command-line arguments. `None` means help was requested.
fn parse_args(args: Vec<String>) -> Result<Option<Options>> {
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        return Ok(None);
    }

    let mut options = Options {
        input: PathBuf::from(&args[0]),
        ..Options::default()
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--half-width" => {
                i += 1;
                options.half_width =
                    Some(value(&args, i)?.parse::<f64>().context("invalid half-width")?);
            }
            "--tolerance" => {
                i += 1;
                options.tolerance =
                    Some(value(&args, i)?.parse::<f64>().context("invalid tolerance")?);
            }
            "--category" => {
                i += 1;
                let text = value(&args, i)?;
                options.category = Some(
                    text.parse::<Category>()
                        .map_err(anyhow::Error::msg)
                        .context("invalid category")?,
                );
            }
            "--threads" => {
                i += 1;
                options.threads =
                    Some(value(&args, i)?.parse::<usize>().context("invalid thread count")?);
            }
            "--output" | "-o" => {
                i += 1;
                options.output = Some(PathBuf::from(value(&args, i)?));
            }
            "--no-join" => {
                options.no_join = true;
            }
            other => bail!("unknown option: {}", other),
        }
        i += 1;
    }
    Ok(Some(options))
}

fn value(args: &[String], i: usize) -> Result<&str> {
    match args.get(i) {
        Some(v) => Ok(v.as_str()),
        None => bail!("{} needs a value", args[i - 1]),
    }
}

fn join_handles(handles: &[footing_core::Handle]) -> String {
    handles
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_usage() {
    println!("Footing CLI - trims foundation beam edges against each other");
    println!();
    println!("Usage: footing-cli <beams.json> [options]");
    println!();
    println!("Options:");
    println!("  --half-width <W>    Beam half-width (default: FOOTING_HALF_WIDTH or 6.0)");
    println!("  --tolerance <T>     Point tolerance (default: FOOTING_TOLERANCE or 1e-6)");
    println!("  --category <C>      boundary, grade-beam, beam-strand, slab-strand, rebar");
    println!("  --no-join           Keep trimmed pieces as separate edges");
    println!("  --threads <N>       Worker threads (default: CPU count)");
    println!("  -o, --output <F>    Write the reference tree as JSON");
    println!("  -h, --help          Show this help");
}
