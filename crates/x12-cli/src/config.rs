//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every key is optional:
//!
//! ```yaml
//! delimiters:
//!   segment: "~"
//!   element: "*"
//!   sub_element: ":"
//! version: 005010X222A1
//! sender_id: SUBMITTER01
//! receiver_id: PAYER01
//! usage_indicator: test
//! ```
//!
//! Precedence is command-line flag, then this file, then built-in defaults.
//! When no delimiters are configured, input files have theirs read from the
//! `ISA` header.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use x12_core::Delimiters;
use x12_envelope::UsageIndicator;

/// Version written when neither a flag nor the config names one.
pub const DEFAULT_VERSION: &str = "005010X222A1";

/// Delimiter characters as written in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterConfig {
    pub segment: char,
    pub element: char,
    pub sub_element: char,
}

impl TryFrom<DelimiterConfig> for Delimiters {
    type Error = anyhow::Error;

    fn try_from(c: DelimiterConfig) -> Result<Self> {
        Delimiters::new(c.segment, c.element, c.sub_element).context("invalid delimiters in config")
    }
}

/// Parsed `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub delimiters: Option<DelimiterConfig>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub usage_indicator: Option<UsageIndicator>,
}

impl CliConfig {
    /// Load the config at `path`, or the empty config when no path was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config YAML: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Explicitly configured delimiters, if any.
    pub fn delimiters(&self) -> Result<Option<Delimiters>> {
        self.delimiters.map(Delimiters::try_from).transpose()
    }

    /// The configured version, or the built-in default.
    pub fn version_or_default(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }
}
