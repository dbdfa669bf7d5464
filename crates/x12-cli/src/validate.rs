//! # Validate Subcommand
//!
//! Validates one or more documents and prints each report.
//!
//! ```bash
//! x12 validate claim.x12
//! x12 validate --claim-rules --json batch/*.x12
//! ```
//!
//! Exit status is `0` when every file passed and `1` otherwise. Errors are
//! printed verbatim, one per line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use x12_validate::{EnvelopeValidator, ValidationReport};

use crate::config::CliConfig;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Documents to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Apply the bundled professional-claim (837) content rules.
    #[arg(long)]
    pub claim_rules: bool,

    /// Print reports as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One file's report, as printed with `--json`.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: &CliConfig) -> Result<u8> {
    let validator = build_validator(args, config)?;
    let reports = args
        .files
        .iter()
        .map(|path| validate_file(&validator, path))
        .collect::<Result<Vec<_>>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for r in &reports {
            print_report(r);
        }
    }

    let failed = reports.iter().filter(|r| !r.report.passed).count();
    tracing::info!(files = reports.len(), failed, "validation complete");
    Ok(if failed == 0 { 0 } else { 1 })
}

fn build_validator(args: &ValidateArgs, config: &CliConfig) -> Result<EnvelopeValidator> {
    let mut validator = if args.claim_rules {
        EnvelopeValidator::with_bundled_rules()
    } else {
        EnvelopeValidator::new()
    };
    if let Some(delimiters) = config.delimiters()? {
        validator = validator.with_delimiters(delimiters);
    }
    Ok(validator)
}

/// Read and validate a single file.
pub fn validate_file(validator: &EnvelopeValidator, path: &Path) -> Result<FileReport> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading document: {}", path.display()))?;
    let report = validator.validate(&raw);
    tracing::debug!(
        file = %path.display(),
        passed = report.passed,
        errors = report.errors.len(),
        "validated"
    );
    Ok(FileReport {
        file: path.display().to_string(),
        report,
    })
}

fn print_report(r: &FileReport) {
    let status = if r.report.passed { "PASS" } else { "FAIL" };
    println!("{status}  {}", r.file);
    for e in &r.report.errors {
        println!("  error:   {e}");
    }
    for w in &r.report.warnings {
        println!("  warning: {w}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230701*1200*^*00501*000000001*0*P*:~\
        GS*HC*S*R*20230701*1200*1*X*005010~ST*837*0001~BHT*0019~SE*3*0001~GE*1*1~IEA*1*000000001~";

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn args(files: Vec<PathBuf>, claim_rules: bool) -> ValidateArgs {
        ValidateArgs {
            files,
            claim_rules,
            json: true,
        }
    }

    #[test]
    fn passing_file_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(&dir, "good.x12", GOOD);
        let code = run_validate(&args(vec![good], false), &CliConfig::default()).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn any_failure_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(&dir, "good.x12", GOOD);
        let bad = write(&dir, "bad.x12", &GOOD.replace("SE*3", "SE*2"));
        let code = run_validate(&args(vec![good, bad], false), &CliConfig::default()).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn claim_rules_are_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(&dir, "claim.x12", GOOD);
        let code = run_validate(&args(vec![good], true), &CliConfig::default()).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn file_report_flattens_into_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.x12", "~");
        let r = validate_file(&EnvelopeValidator::new(), &path).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["passed"], false);
        assert_eq!(json["errors"][0], "Malformed Input: document contains no segments");
        assert!(json["file"].as_str().unwrap().ends_with("empty.x12"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = run_validate(
            &args(vec![PathBuf::from("/nonexistent/claim.x12")], false),
            &CliConfig::default(),
        );
        assert!(result.is_err());
    }
}
