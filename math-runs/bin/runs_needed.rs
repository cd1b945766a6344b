//! Runs needed per class
//!
//! Usage:
//!     runs-needed --profile player.json
//!     runs-needed --xp mage=120000000 --xp tank=3500000 --json

use anyhow::{Context, bail};
use clap::Parser;
use math_runs::{
    ClassExperience, RunsConfig, RunsEstimator, RunsResult, SolverStrategy, parse_profile,
    resolve_class,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "runs-needed",
    about = "Estimate the dungeon runs needed to bring every class to the experience cap"
)]
struct Cli {
    /// Player profile JSON document, as served by the dungeon stats API
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Current experience of a class as CLASS=XP (repeatable, overrides the profile)
    #[arg(long = "xp", value_parser = parse_class_xp)]
    xp: Vec<(String, f64)>,

    /// JSON configuration file (cap, rates, class order)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Solve with partial pivoting instead of plain Doolittle LU
    #[arg(long)]
    pivoting: bool,

    /// Report negative per-class estimates as zero
    #[arg(long)]
    clamp_negative: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn parse_class_xp(s: &str) -> Result<(String, f64), String> {
    let (class, xp) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CLASS=XP, got '{s}'"))?;
    let class = class.trim();
    if class.is_empty() {
        return Err(format!("missing class name in '{s}'"));
    }
    let xp: f64 = xp
        .trim()
        .parse()
        .map_err(|e| format!("invalid experience in '{s}': {e}"))?;
    if !xp.is_finite() || xp < 0.0 {
        return Err(format!("experience must be finite and >= 0, got {xp}"));
    }
    Ok((class.to_string(), xp))
}

/// Set experience from `--xp` pairs, resolving names against the configured classes
fn apply_xp_overrides(
    experience: &mut ClassExperience,
    overrides: &[(String, f64)],
    classes: &[String],
) -> anyhow::Result<()> {
    for (key, xp) in overrides {
        let Some(class) = resolve_class(key, classes) else {
            bail!("unknown class '{}' (expected one of: {})", key, classes.join(", "));
        };
        experience.insert(class, *xp);
    }
    Ok(())
}

#[derive(Serialize)]
struct Report<'a> {
    runs: &'a RunsResult,
    total: i64,
}

fn print_text(runs: &RunsResult, total: i64) {
    println!("Minimum runs needed per class:");
    for (class, count) in runs.iter() {
        println!("  {}: {} runs", class, count);
    }
    println!("Total runs needed: {} runs", total);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunsConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => RunsConfig::default(),
    };
    if cli.pivoting {
        config.strategy = SolverStrategy::PartialPivoting;
    }
    if cli.clamp_negative {
        config.clamp_negative_runs = true;
    }

    let mut experience = match &cli.profile {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            parse_profile(&contents, &config.classes)
                .with_context(|| format!("parsing profile {}", path.display()))?
        }
        None => ClassExperience::new(),
    };
    apply_xp_overrides(&mut experience, &cli.xp, &config.classes)?;

    if experience.is_empty() {
        bail!("no class experience available: pass --profile FILE or --xp CLASS=XP");
    }

    let estimator = RunsEstimator::new(config)?;
    let runs = estimator.estimate_from_experience(&experience)?;
    let total = runs.total().context("total runs do not fit in a 64-bit integer")?;

    if cli.json {
        let report = Report { runs: &runs, total };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&runs, total);
    }

    Ok(())
}
