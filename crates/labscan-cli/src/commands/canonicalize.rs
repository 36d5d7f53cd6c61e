//! Canonicalize command - look up canonical test names.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;

use labscan_core::canonical::{CanonicalMatch, Canonicalizer};

use super::load_config;

/// Arguments for the canonicalize command.
#[derive(Args)]
pub struct CanonicalizeArgs {
    /// Test names as printed on a report
    #[arg(required = true)]
    names: Vec<String>,

    /// Canonical name dictionary (JSON)
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Minimum similarity for fuzzy name matches
    #[arg(long)]
    threshold: Option<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Lookup<'a> {
    input: &'a str,
    #[serde(flatten)]
    resolved: Option<CanonicalMatch>,
}

pub async fn run(args: CanonicalizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(dictionary) = args.dictionary {
        config.canonicalizer.dictionary_path = Some(dictionary);
    }
    if let Some(threshold) = args.threshold {
        config.canonicalizer.threshold = threshold;
    }
    config.validate()?;

    let canonicalizer = Canonicalizer::from_config(&config.canonicalizer)?;

    let lookups: Vec<Lookup<'_>> = args
        .names
        .iter()
        .map(|name| Lookup {
            input: name,
            resolved: canonicalizer.resolve(name),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lookups)?);
        return Ok(());
    }

    for lookup in &lookups {
        match &lookup.resolved {
            Some(m) => println!(
                "{} {} -> {} ({:.3}, {:?}{})",
                style("✓").green(),
                lookup.input,
                style(&m.canonical).bold(),
                m.score,
                m.slice,
                if m.exact { ", exact" } else { "" }
            ),
            None => println!(
                "{} {} -> no match, kept as is",
                style("✗").yellow(),
                lookup.input
            ),
        }
    }

    Ok(())
}
