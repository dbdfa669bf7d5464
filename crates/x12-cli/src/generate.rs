//! # Generate Subcommand
//!
//! Builds a complete envelope around the transaction-set bodies listed in a
//! YAML composition file.
//!
//! ```yaml
//! transaction_set_type: "837"
//! functional_id: HC
//! sender_id: SUBMITTER01        # optional, falls back to --config
//! receiver_id: PAYER01          # optional, falls back to --config
//! transaction_sets:
//!   - segments:
//!       - { tag: BHT, fields: ["0019", "00", "0123", "20230701", "1200", "CH"] }
//!       - { tag: CLM, fields: ["PATIENT1", "100.00", "", "", "11:B:1"] }
//! ```
//!
//! ```bash
//! x12 generate --spec claim.yaml --output claim.x12
//! x12 --config x12.yaml generate --spec claim.yaml --test --timestamp 2023-07-01T12:00:00
//! ```
//!
//! Identifier and version precedence: flag, then composition file, then
//! `--config`, then the built-in default.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::Args;
use serde::{Deserialize, Serialize};
use x12_envelope::{EnvelopeBuilder, UsageIndicator};
use x12_validate::EnvelopeValidator;

use crate::config::CliConfig;

/// Format accepted by `--timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Arguments for the generate subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the composition YAML file.
    #[arg(long)]
    pub spec: PathBuf,

    /// Write the document here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Protocol version, e.g. 005010X222A1.
    #[arg(long)]
    pub x12_version: Option<String>,

    /// Interchange sender identifier (ISA06, GS02).
    #[arg(long)]
    pub sender: Option<String>,

    /// Interchange receiver identifier (ISA08, GS03).
    #[arg(long)]
    pub receiver: Option<String>,

    /// Mark the interchange as test data (ISA15 = T).
    #[arg(long)]
    pub test: bool,

    /// Fixed header timestamp (YYYY-MM-DDTHH:MM:SS) for reproducible output.
    #[arg(long)]
    pub timestamp: Option<String>,
}

/// Composition file as parsed from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositionSpec {
    pub transaction_set_type: String,
    pub functional_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<String>,
    pub transaction_sets: Vec<TransactionSetSpec>,
}

/// Body of one transaction set. The `ST`/`SE` pair is added around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSetSpec {
    pub segments: Vec<SegmentSpec>,
}

/// One body segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub tag: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Execute the generate subcommand. A document that fails its own validation
/// is reported and never written.
pub fn run_generate(args: &GenerateArgs, config: &CliConfig) -> Result<u8> {
    let content = std::fs::read_to_string(&args.spec)
        .with_context(|| format!("reading composition spec: {}", args.spec.display()))?;
    let spec: CompositionSpec = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing composition spec YAML: {}", args.spec.display()))?;

    let document = compose(&spec, args, config)?;

    // Self-check the output with the same delimiters it was written with.
    let mut validator = EnvelopeValidator::new();
    if let Some(delimiters) = config.delimiters()? {
        validator = validator.with_delimiters(delimiters);
    }
    let report = validator.validate(&document);
    if !report.passed {
        for e in &report.errors {
            tracing::error!("generated document: {e}");
        }
        bail!(
            "generated document failed validation with {} error(s); nothing written",
            report.errors.len()
        );
    }

    match &args.output {
        Some(path) => write_output(path, &document)?,
        None => print!("{document}"),
    }
    tracing::info!(
        sets = spec.transaction_sets.len(),
        warnings = report.warnings.len(),
        "generated envelope"
    );
    Ok(0)
}

/// Assemble the envelope described by `spec`.
pub fn compose(spec: &CompositionSpec, args: &GenerateArgs, config: &CliConfig) -> Result<String> {
    if spec.transaction_sets.is_empty() {
        bail!("composition spec lists no transaction sets");
    }

    let version = args
        .x12_version
        .as_deref()
        .or(spec.version.as_deref())
        .unwrap_or_else(|| config.version_or_default());
    let sender = pick(args.sender.as_deref(), spec.sender_id.as_deref(), config.sender_id.as_deref())
        .context("no sender id: pass --sender, set sender_id in the spec, or configure one")?;
    let receiver = pick(args.receiver.as_deref(), spec.receiver_id.as_deref(), config.receiver_id.as_deref())
        .context("no receiver id: pass --receiver, set receiver_id in the spec, or configure one")?;
    let usage = if args.test {
        UsageIndicator::Test
    } else {
        config.usage_indicator.unwrap_or_default()
    };

    let mut builder = EnvelopeBuilder::new(version).with_usage_indicator(usage);
    if let Some(delimiters) = config.delimiters()? {
        builder = builder.with_delimiters(delimiters);
    }
    if let Some(raw) = &args.timestamp {
        let timestamp = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
            .with_context(|| format!("--timestamp must look like 2023-07-01T12:00:00, got {raw:?}"))?;
        builder = builder.with_timestamp(timestamp);
    }

    builder.set_transaction_set_type(spec.transaction_set_type.as_str());
    builder.open_interchange(sender, receiver)?;
    builder.open_functional_group(&spec.functional_id, sender, receiver)?;
    for set in &spec.transaction_sets {
        builder.open_transaction_set()?;
        for segment in &set.segments {
            builder.add_segment(segment.tag.as_str(), segment.fields.iter().map(String::as_str));
        }
        builder.close_transaction_set()?;
    }
    builder.close_functional_group()?;
    builder.close_interchange()?;
    Ok(builder.build()?)
}

fn pick<'a>(flag: Option<&'a str>, spec: Option<&'a str>, config: Option<&'a str>) -> Option<&'a str> {
    flag.or(spec).or(config)
}

fn write_output(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory: {}", parent.display()))?;
    }
    std::fs::write(path, document).with_context(|| format!("writing document: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote document");
    Ok(())
}
