//! Extract command - extract lab results from one report.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use labscan_core::models::config::LabscanConfig;
use labscan_core::{split_pages, ExtractionResult, LabReportParser};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// OCR text files, one per page. A single file may hold every page
    /// separated by "=== Strana N ===" headers.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Structured JSON produced upstream for this report
    #[arg(long)]
    candidate: Option<PathBuf>,

    /// Run the parsing strategies page by page
    #[arg(long)]
    per_page: bool,

    /// Maximum pages to process (0 = unlimited)
    #[arg(long)]
    max_pages: Option<usize>,

    /// Canonical name dictionary (JSON)
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Minimum similarity for fuzzy name matches
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full extraction result as JSON
    Json,
    /// Nested Patient/Doctor/Document/LabResults JSON
    Structured,
    /// One CSV row per lab result
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::Structured => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, &args);
    let parser = LabReportParser::from_config(&config)?;

    let mut texts = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }
        info!("Reading {}", input.display());
        texts.push(fs::read_to_string(input)?);
    }

    let pages = if texts.len() == 1 {
        split_pages(&texts[0])
    } else {
        texts
    };
    let pages: Vec<&str> = pages.iter().map(String::as_str).collect();

    let candidate = match &args.candidate {
        Some(path) => Some(fs::read_to_string(path)?),
        None => None,
    };

    let result = parser.extract_with_candidate(&pages, candidate.as_deref());

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn apply_overrides(config: &mut LabscanConfig, args: &ExtractArgs) {
    if args.per_page {
        config.extraction.per_page = true;
    }
    if let Some(max_pages) = args.max_pages {
        config.extraction.max_pages = max_pages;
    }
    if let Some(dictionary) = &args.dictionary {
        config.canonicalizer.dictionary_path = Some(dictionary.clone());
    }
    if let Some(threshold) = args.threshold {
        config.canonicalizer.threshold = threshold;
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Structured => Ok(serde_json::to_string_pretty(&result.to_structured())?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    for row in result.table_rows() {
        wtr.serialize(row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let metadata = &result.metadata;
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut output = String::new();

    output.push_str(&format!("Patient:   {}\n", field(&metadata.patient_name)));
    output.push_str(&format!("Address:   {}\n", field(&metadata.address)));
    output.push_str(&format!("Doctor:    {}\n", field(&metadata.doctor_name)));
    output.push_str(&format!("Date:      {}\n", field(&metadata.document_date)));
    output.push_str(&format!("Diagnosis: {}\n", field(&metadata.diagnosis)));
    output.push('\n');

    output.push_str(&format!(
        "{:<8} {:<28} {:>10} {:<10} {}\n",
        "Code", "Name", "Result", "Unit", "Range"
    ));
    for row in result.table_rows() {
        let range = match (row.min, row.max) {
            (Some(min), Some(max)) => format!("{} - {}", min, max),
            (Some(min), None) => format!(">= {}", min),
            (None, Some(max)) => format!("<= {}", max),
            (None, None) => String::new(),
        };
        let flag = if row.out_of_range { " !" } else { "" };

        output.push_str(&format!(
            "{:<8} {:<28} {:>10} {:<10} {}{}\n",
            row.code,
            row.name,
            row.result,
            row.unit.unwrap_or_default(),
            range,
            flag
        ));
    }

    output.push_str(&format!(
        "\n{} results, {} out of range\n",
        result.records.len(),
        result.out_of_range_count()
    ));

    output
}
