//! # Inspect Subcommand
//!
//! Tokenizes a document and prints its envelope outline: every interchange,
//! group and transaction set with positions and control numbers, followed by
//! any nesting issues.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use x12_core::{Delimiters, Document, EnvelopeOutline, FunctionalGroupSpan, Tokenizer, TransactionSetSpan};

use crate::config::CliConfig;

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Document to inspect.
    pub file: PathBuf,

    /// Print the segments and outline as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Everything `inspect --json` prints.
#[derive(Debug, Serialize)]
pub struct Inspection {
    pub delimiters: Delimiters,
    pub segments: Document,
    pub outline: EnvelopeOutline,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs, config: &CliConfig) -> Result<u8> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading document: {}", args.file.display()))?;
    let inspection = inspect(&raw, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        print!("{}", render_outline(&inspection));
    }
    Ok(if inspection.outline.is_well_nested() { 0 } else { 1 })
}

/// Tokenize `raw` and reconstruct its outline.
pub fn inspect(raw: &str, config: &CliConfig) -> Result<Inspection> {
    let tokenizer = match config.delimiters()? {
        Some(delimiters) => Tokenizer::new(delimiters),
        None => Tokenizer::sniffing(raw),
    };
    let segments = tokenizer.parse(raw)?;
    let outline = EnvelopeOutline::of(&segments);
    Ok(Inspection {
        delimiters: tokenizer.delimiters(),
        segments,
        outline,
    })
}

/// Human-readable outline tree. Groups and sets found outside their parent
/// are listed unindented after the interchanges.
pub fn render_outline(inspection: &Inspection) -> String {
    let doc = &inspection.segments;
    let outline = &inspection.outline;
    let mut out = format!("{} segments\n", doc.len());
    for interchange in &outline.interchanges {
        out.push_str(&format!(
            "ISA @{} control={} version={}\n",
            interchange.header,
            interchange.control_number(doc).unwrap_or("-"),
            interchange.version(doc).unwrap_or("-"),
        ));
        for group in &interchange.groups {
            out.push_str(&render_group(doc, group, 1));
        }
    }
    for group in &outline.orphan_groups {
        out.push_str(&render_group(doc, group, 0));
    }
    for set in &outline.orphan_sets {
        out.push_str(&render_set(doc, set, 0));
    }
    for issue in &outline.issues {
        out.push_str(&format!("issue: {issue}\n"));
    }
    out
}

fn render_group(doc: &Document, group: &FunctionalGroupSpan, depth: usize) -> String {
    let mut out = format!(
        "{}GS @{} control={} version={}\n",
        "  ".repeat(depth),
        group.header,
        group.control_number(doc).unwrap_or("-"),
        group.version(doc).unwrap_or("-"),
    );
    for set in &group.sets {
        out.push_str(&render_set(doc, set, depth + 1));
    }
    out
}

fn render_set(doc: &Document, set: &TransactionSetSpan, depth: usize) -> String {
    format!(
        "{}ST @{} type={} control={} segments={}\n",
        "  ".repeat(depth),
        set.header,
        set.type_code(doc).unwrap_or("-"),
        set.control_number(doc).unwrap_or("-"),
        set.segment_count(),
    )
}
