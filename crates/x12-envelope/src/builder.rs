//! # Envelope Builder
//!
//! Assembles a document segment by segment and serializes it. Callers may
//! append raw segments directly or use the open/close helpers, which format
//! the fixed-width headers and derive every trailer count from what was
//! actually appended.
//!
//! ## Counting
//!
//! - `SE01` is the number of segments from the matching `ST` through the `SE`
//!   itself, both inclusive.
//! - `GE01` is the number of transaction sets opened since the matching `GS`.
//! - `IEA01` is the number of functional groups opened since the matching
//!   `ISA`.
//!
//! Control numbers advance per level and are owned by the builder value, so
//! two builders never share counters.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use x12_core::{Delimiters, EnvelopeLevel, Segment, REQUIRED_CONTROL_TAGS};

use crate::control::{format_control_number, ControlNumbers};
use crate::error::BuildError;

/// Width of the `ISA06` / `ISA08` identifier fields.
pub const ISA_ID_WIDTH: usize = 15;

/// Width of the `ISA02` / `ISA04` information fields.
const ISA_INFO_WIDTH: usize = 10;

/// Repetition separator written to `ISA11`.
const REPETITION_SEPARATOR: &str = "^";

/// `ISA16` holds the sub-element separator itself.
const ISA_SUB_ELEMENT_INDEX: usize = 15;

/// Interchange usage indicator (`ISA15`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageIndicator {
    /// `P`.
    #[default]
    Production,
    /// `T`.
    Test,
}

impl UsageIndicator {
    /// The single-character wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Production => "P",
            Self::Test => "T",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenSpan {
    /// Position of the header segment.
    header: usize,
    /// Child units opened since the header.
    children: usize,
}

/// Incremental document assembler.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    version: String,
    delimiters: Delimiters,
    usage: UsageIndicator,
    timestamp: Option<NaiveDateTime>,
    transaction_set_type: Option<String>,
    segments: Vec<Segment>,
    control: ControlNumbers,
    interchange: Option<OpenSpan>,
    group: Option<OpenSpan>,
    set: Option<OpenSpan>,
}

impl EnvelopeBuilder {
    /// Start an empty builder for the given protocol version, e.g.
    /// `005010X222A1`.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            delimiters: Delimiters::default(),
            usage: UsageIndicator::default(),
            timestamp: None,
            transaction_set_type: None,
            segments: Vec::new(),
            control: ControlNumbers::default(),
            interchange: None,
            group: None,
            set: None,
        }
    }

    /// Serialize with non-default delimiters. The sub-element separator is
    /// written to `ISA16`.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Stamp every header with a fixed date and time instead of the clock.
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set `ISA15`.
    pub fn with_usage_indicator(mut self, usage: UsageIndicator) -> Self {
        self.usage = usage;
        self
    }

    /// The protocol version this builder writes.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The declared transaction-set type, if any.
    pub fn transaction_set_type(&self) -> Option<&str> {
        self.transaction_set_type.as_deref()
    }

    /// The delimiters used by [`EnvelopeBuilder::build`].
    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// Segments appended so far, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Latest control number issued for `level` (zero before its first header).
    pub fn control_number(&self, level: EnvelopeLevel) -> u32 {
        self.control.current(level)
    }

    /// Declare the transaction-set type used by
    /// [`EnvelopeBuilder::open_transaction_set`].
    pub fn set_transaction_set_type(&mut self, code: impl Into<String>) -> &mut Self {
        self.transaction_set_type = Some(code.into());
        self
    }

    /// Append a segment verbatim. An `ST` segment records its `ST01` as the
    /// declared transaction-set type. Delimiters inside the tag or fields are
    /// rejected by [`EnvelopeBuilder::build`].
    pub fn add_segment<T, I, F>(&mut self, tag: T, fields: I) -> &mut Self
    where
        T: Into<String>,
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        let segment = Segment::new(tag, fields);
        if segment.is(EnvelopeLevel::TransactionSet.header_tag()) {
            if let Some(code) = segment.field(0).filter(|c| !c.trim().is_empty()) {
                self.transaction_set_type = Some(code.to_string());
            }
        }
        self.segments.push(segment);
        self
    }

    // -----------------------------------------------------------------------
    // Interchange
    // -----------------------------------------------------------------------

    /// Append a fixed-width `ISA` header.
    pub fn open_interchange(&mut self, sender_id: &str, receiver_id: &str) -> Result<&mut Self, BuildError> {
        if self.interchange.is_some() {
            return Err(BuildError::LevelAlreadyOpen {
                level: EnvelopeLevel::Interchange,
            });
        }
        reject_delimiters(&self.delimiters, "ISA06", sender_id)?;
        reject_delimiters(&self.delimiters, "ISA08", receiver_id)?;
        let sender = pad_fixed("ISA06", sender_id, ISA_ID_WIDTH)?;
        let receiver = pad_fixed("ISA08", receiver_id, ISA_ID_WIDTH)?;
        let control = self.control.advance(EnvelopeLevel::Interchange)?;
        let now = self.now();
        let blank_info = " ".repeat(ISA_INFO_WIDTH);

        let fields = vec![
            "00".to_string(),
            blank_info.clone(),
            "00".to_string(),
            blank_info,
            "ZZ".to_string(),
            sender,
            "ZZ".to_string(),
            receiver,
            now.format("%y%m%d").to_string(),
            now.format("%H%M").to_string(),
            REPETITION_SEPARATOR.to_string(),
            self.version.clone(),
            format_control_number(EnvelopeLevel::Interchange, control),
            "0".to_string(),
            self.usage.code().to_string(),
            self.delimiters.sub_element.to_string(),
        ];
        let header = self.segments.len();
        self.add_segment("ISA", fields);
        self.interchange = Some(OpenSpan { header, children: 0 });
        tracing::debug!(control, "opened interchange");
        Ok(self)
    }

    /// Append `IEA` with the number of groups opened since the `ISA`.
    pub fn close_interchange(&mut self) -> Result<&mut Self, BuildError> {
        let open = self.interchange.ok_or(BuildError::LevelNotOpen {
            level: EnvelopeLevel::Interchange,
        })?;
        if self.group.is_some() {
            return Err(BuildError::UnclosedLevel {
                level: EnvelopeLevel::FunctionalGroup,
            });
        }
        let control = self.control.formatted(EnvelopeLevel::Interchange);
        self.add_segment("IEA", [open.children.to_string(), control]);
        self.interchange = None;
        tracing::debug!(groups = open.children, "closed interchange");
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Functional group
    // -----------------------------------------------------------------------

    /// Append a `GS` header inside the open interchange.
    pub fn open_functional_group(
        &mut self,
        functional_id: &str,
        sender_id: &str,
        receiver_id: &str,
    ) -> Result<&mut Self, BuildError> {
        let Some(interchange) = self.interchange.as_mut() else {
            return Err(BuildError::ParentNotOpen {
                level: EnvelopeLevel::FunctionalGroup,
                parent: EnvelopeLevel::Interchange,
            });
        };
        if self.group.is_some() {
            return Err(BuildError::LevelAlreadyOpen {
                level: EnvelopeLevel::FunctionalGroup,
            });
        }
        reject_delimiters(&self.delimiters, "GS01", functional_id)?;
        reject_delimiters(&self.delimiters, "GS02", sender_id)?;
        reject_delimiters(&self.delimiters, "GS03", receiver_id)?;
        let control = self.control.advance(EnvelopeLevel::FunctionalGroup)?;
        interchange.children += 1;
        let now = self.now();
        // GS08 carries only the version prefix before the implementation guide.
        let version_prefix = self.version.split('X').next().unwrap_or_default().to_string();

        let header = self.segments.len();
        self.add_segment(
            "GS",
            [
                functional_id.to_string(),
                sender_id.to_string(),
                receiver_id.to_string(),
                now.format("%Y%m%d").to_string(),
                now.format("%H%M").to_string(),
                format_control_number(EnvelopeLevel::FunctionalGroup, control),
                "X".to_string(),
                version_prefix,
            ],
        );
        self.group = Some(OpenSpan { header, children: 0 });
        tracing::debug!(control, functional_id, "opened functional group");
        Ok(self)
    }

    /// Append `GE` with the number of sets opened since the `GS`.
    pub fn close_functional_group(&mut self) -> Result<&mut Self, BuildError> {
        let open = self.group.ok_or(BuildError::LevelNotOpen {
            level: EnvelopeLevel::FunctionalGroup,
        })?;
        if self.set.is_some() {
            return Err(BuildError::UnclosedLevel {
                level: EnvelopeLevel::TransactionSet,
            });
        }
        let control = self.control.formatted(EnvelopeLevel::FunctionalGroup);
        self.add_segment("GE", [open.children.to_string(), control]);
        self.group = None;
        tracing::debug!(sets = open.children, "closed functional group");
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Transaction set
    // -----------------------------------------------------------------------

    /// Append an `ST` header of the declared type inside the open group.
    pub fn open_transaction_set(&mut self) -> Result<&mut Self, BuildError> {
        let Some(group) = self.group.as_mut() else {
            return Err(BuildError::ParentNotOpen {
                level: EnvelopeLevel::TransactionSet,
                parent: EnvelopeLevel::FunctionalGroup,
            });
        };
        if self.set.is_some() {
            return Err(BuildError::LevelAlreadyOpen {
                level: EnvelopeLevel::TransactionSet,
            });
        }
        let code = self
            .transaction_set_type
            .clone()
            .ok_or(BuildError::MissingTransactionType)?;
        let control = self.control.advance(EnvelopeLevel::TransactionSet)?;
        group.children += 1;

        let header = self.segments.len();
        self.add_segment(
            "ST",
            [
                code.clone(),
                format_control_number(EnvelopeLevel::TransactionSet, control),
            ],
        );
        self.set = Some(OpenSpan { header, children: 0 });
        tracing::debug!(control, code = %code, "opened transaction set");
        Ok(self)
    }

    /// Append `SE` counting every segment from the `ST` through itself.
    pub fn close_transaction_set(&mut self) -> Result<&mut Self, BuildError> {
        let open = self.set.ok_or(BuildError::LevelNotOpen {
            level: EnvelopeLevel::TransactionSet,
        })?;
        let count = self.segments.len() - open.header + 1;
        let control = self.control.formatted(EnvelopeLevel::TransactionSet);
        self.add_segment("SE", [count.to_string(), control]);
        self.set = None;
        tracing::debug!(count, "closed transaction set");
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize every appended segment in order.
    ///
    /// Fails when a required control tag is absent, when no transaction-set
    /// type was declared, when a helper-opened level is still open, or when a
    /// tag or field holds a delimiter. The builder is left untouched either
    /// way.
    pub fn build(&self) -> Result<String, BuildError> {
        let missing: Vec<&'static str> = REQUIRED_CONTROL_TAGS
            .into_iter()
            .filter(|tag| !self.segments.iter().any(|s| s.is(tag)))
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::IncompleteEnvelope { missing });
        }
        if self.transaction_set_type.is_none() {
            return Err(BuildError::MissingTransactionType);
        }
        let still_open = [
            (self.set.is_some(), EnvelopeLevel::TransactionSet),
            (self.group.is_some(), EnvelopeLevel::FunctionalGroup),
            (self.interchange.is_some(), EnvelopeLevel::Interchange),
        ];
        if let Some((_, level)) = still_open.into_iter().find(|(open, _)| *open) {
            return Err(BuildError::UnclosedLevel { level });
        }
        self.check_delimiters()?;

        let out: String = self.segments.iter().map(|s| s.to_wire(&self.delimiters)).collect();
        tracing::debug!(segments = self.segments.len(), bytes = out.len(), "built envelope");
        Ok(out)
    }

    /// Tags and fields must not contain the segment terminator or element
    /// separator. The sub-element separator joins composites such as
    /// `11:B:1`, so it is allowed in fields, except in `ISA` where only
    /// `ISA16` may carry it.
    fn check_delimiters(&self) -> Result<(), BuildError> {
        let d = self.delimiters;
        for (position, segment) in self.segments.iter().enumerate() {
            let tag = segment.tag();
            if let Some(delimiter) = tag.chars().find(|&c| d.is_delimiter(c)) {
                return Err(BuildError::DelimiterInContent {
                    field: format!("segment tag {tag:?} at position {position}"),
                    delimiter,
                });
            }
            let is_isa = segment.is(EnvelopeLevel::Interchange.header_tag());
            for (index, value) in segment.fields().iter().enumerate() {
                let composite = !is_isa || index == ISA_SUB_ELEMENT_INDEX;
                let hit = value
                    .chars()
                    .find(|&c| c == d.segment || c == d.element || (c == d.sub_element && !composite));
                if let Some(delimiter) = hit {
                    return Err(BuildError::DelimiterInContent {
                        field: format!("{tag}{:02} at position {position}", index + 1),
                        delimiter,
                    });
                }
            }
        }
        Ok(())
    }

    fn now(&self) -> NaiveDateTime {
        self.timestamp.unwrap_or_else(|| Utc::now().naive_utc())
    }
}

fn reject_delimiters(delimiters: &Delimiters, field: &str, value: &str) -> Result<(), BuildError> {
    match value.chars().find(|&c| delimiters.is_delimiter(c)) {
        Some(delimiter) => Err(BuildError::DelimiterInContent {
            field: field.to_string(),
            delimiter,
        }),
        None => Ok(()),
    }
}

fn pad_fixed(field: &'static str, value: &str, width: usize) -> Result<String, BuildError> {
    if value.chars().count() > width {
        return Err(BuildError::FieldTooWide {
            field,
            width,
            value: value.to_string(),
        });
    }
    Ok(format!("{value:<width$}"))
}
