//! Run JSON suggestion scenarios against the ranking engine
//!
//! Run with: cargo run --bin omnibox-scenarios -- tests/fixtures
//!
//! Each path is a scenario file or a directory of them. Files ending in
//! `schema.json` are skipped. Exits non-zero when any scenario fails.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use omnibox::config::RankingLimits;
use omnibox::scenario::Scenario;
use omnibox::Platform;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario files or directories
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Only run scenarios written for this platform
    #[arg(short, long, value_enum)]
    platform: Option<PlatformArg>,

    /// JSON file overriding the ranking limits
    #[arg(short, long)]
    limits: Option<PathBuf>,

    /// Print actual results for failing scenarios
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlatformArg {
    Mobile,
    Desktop,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Mobile => Platform::Mobile,
            PlatformArg::Desktop => Platform::Desktop,
        }
    }
}

fn collect_scenarios(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("Failed to list {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_scenario_file(p))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn is_scenario_file(path: &Path) -> bool {
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let is_schema = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with("schema"));
    is_json && !is_schema
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let limits = match &args.limits {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            RankingLimits::from_json(&json).with_context(|| format!("Invalid limits in {}", path.display()))?
        }
        None => RankingLimits::default(),
    };
    let only_platform = args.platform.map(Platform::from);

    let files = collect_scenarios(&args.paths)?;
    let (mut passed, mut failed, mut skipped) = (0usize, 0usize, 0usize);

    for file in &files {
        let scenario = Scenario::from_path(file).with_context(|| format!("Failed to load {}", file.display()))?;
        if only_platform.is_some_and(|p| p != scenario.platform) {
            skipped += 1;
            continue;
        }

        let actual = scenario.run_with(scenario.processing(scenario.platform).with_limits(limits));
        if actual == scenario.expectations {
            passed += 1;
            println!("ok    {}", file.display());
        } else {
            failed += 1;
            println!("FAIL  {} ({})", file.display(), scenario.description);
            if args.verbose {
                println!("expected:\n{}", serde_json::to_string_pretty(&scenario.expectations)?);
                println!("actual:\n{}", serde_json::to_string_pretty(&actual)?);
            }
        }
    }

    println!();
    println!("{} passed, {} failed, {} skipped", passed, failed, skipped);

    if failed > 0 {
        bail!("{} scenario(s) failed", failed);
    }
    Ok(())
}
