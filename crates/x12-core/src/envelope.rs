//! # Envelope Levels & Outline
//!
//! The three nested scopes of a document and the position-based
//! reconstruction of that nesting from a flat segment stream.
//!
//! ```text
//! ISA ─┬─ GS ─┬─ ST … SE
//!      │      └─ ST … SE
//!      └─ GE
//! IEA
//! ```
//!
//! [`EnvelopeOutline::of`] walks the document once as a small state machine
//! (open interchange, open group, open set). Each header opens a span, each
//! trailer closes the innermost matching one. Anything that does not fit is
//! recorded as a [`NestingIssue`] and the walk continues, so a single
//! misplaced trailer never hides the rest of the structure.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::document::Document;
use crate::segment::Segment;

/// The six control tags every complete document carries.
pub const REQUIRED_CONTROL_TAGS: [&str; 6] = ["ISA", "GS", "ST", "SE", "GE", "IEA"];

/// One of the three nested envelope scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeLevel {
    /// `ISA` … `IEA`.
    Interchange,
    /// `GS` … `GE`.
    FunctionalGroup,
    /// `ST` … `SE`.
    TransactionSet,
}

impl EnvelopeLevel {
    /// All levels, outermost first.
    pub const ALL: [EnvelopeLevel; 3] = [
        EnvelopeLevel::Interchange,
        EnvelopeLevel::FunctionalGroup,
        EnvelopeLevel::TransactionSet,
    ];

    /// Tag of the segment that opens this level.
    pub fn header_tag(self) -> &'static str {
        match self {
            Self::Interchange => "ISA",
            Self::FunctionalGroup => "GS",
            Self::TransactionSet => "ST",
        }
    }

    /// Tag of the segment that closes this level.
    pub fn trailer_tag(self) -> &'static str {
        match self {
            Self::Interchange => "IEA",
            Self::FunctionalGroup => "GE",
            Self::TransactionSet => "SE",
        }
    }

    /// Level opened by `tag`, if it is a header tag.
    pub fn from_header(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.header_tag() == tag)
    }

    /// Level closed by `tag`, if it is a trailer tag.
    pub fn from_trailer(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.trailer_tag() == tag)
    }

    /// The enclosing level, `None` for an interchange.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Interchange => None,
            Self::FunctionalGroup => Some(Self::Interchange),
            Self::TransactionSet => Some(Self::FunctionalGroup),
        }
    }
}

impl fmt::Display for EnvelopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interchange => f.write_str("interchange"),
            Self::FunctionalGroup => f.write_str("functional group"),
            Self::TransactionSet => f.write_str("transaction set"),
        }
    }
}

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// Positions of one `ST` … `SE` transaction set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSetSpan {
    /// Position of the `ST` header.
    pub header: usize,
    /// Position of the `SE` trailer, if the set was closed.
    pub trailer: Option<usize>,
    /// Last position belonging to the set (the trailer when closed).
    pub last: usize,
}

impl TransactionSetSpan {
    /// Positions covered by the set, header through `last`.
    pub fn range(&self) -> Range<usize> {
        self.header..self.last + 1
    }

    /// Segments from header through `last`, both inclusive.
    pub fn segment_count(&self) -> usize {
        self.last + 1 - self.header
    }

    /// Transaction-set type code (`ST01`), if present and non-blank.
    pub fn type_code<'d>(&self, doc: &'d Document) -> Option<&'d str> {
        header_field(doc, self.header, 0)
    }

    /// Control number (`ST02`), if present and non-blank.
    pub fn control_number<'d>(&self, doc: &'d Document) -> Option<&'d str> {
        header_field(doc, self.header, 1)
    }
}

/// Positions of one `GS` … `GE` functional group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionalGroupSpan {
    /// Position of the `GS` header.
    pub header: usize,
    /// Position of the `GE` trailer, if the group was closed.
    pub trailer: Option<usize>,
    /// Last position belonging to the group.
    pub last: usize,
    /// Transaction sets opened inside this group, in order.
    pub sets: Vec<TransactionSetSpan>,
}

impl FunctionalGroupSpan {
    /// Version / release code (`GS08`), if present and non-blank.
    pub fn version<'d>(&self, doc: &'d Document) -> Option<&'d str> {
        header_field(doc, self.header, 7)
    }

    /// Group control number (`GS06`), if present and non-blank.
    pub fn control_number<'d>(&self, doc: &'d Document) -> Option<&'d str> {
        header_field(doc, self.header, 5)
    }
}

/// Positions of one `ISA` … `IEA` interchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterchangeSpan {
    /// Position of the `ISA` header.
    pub header: usize,
    /// Position of the `IEA` trailer, if the interchange was closed.
    pub trailer: Option<usize>,
    /// Last position belonging to the interchange.
    pub last: usize,
    /// Functional groups opened inside this interchange, in order.
    pub groups: Vec<FunctionalGroupSpan>,
}

impl InterchangeSpan {
    /// Declared protocol version (`ISA12`), if present and non-blank.
    pub fn version<'d>(&self, doc: &'d Document) -> Option<&'d str> {
        header_field(doc, self.header, 11)
    }

    /// Interchange control number (`ISA13`), if present and non-blank.
    pub fn control_number<'d>(&self, doc: &'d Document) -> Option<&'d str> {
        header_field(doc, self.header, 12)
    }
}

fn header_field(doc: &Document, position: usize, index: usize) -> Option<&str> {
    doc.segment_at(position)
        .ok()
        .and_then(|s| s.field(index))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Nesting issues
// ---------------------------------------------------------------------------

/// A place where the segment stream does not nest cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NestingIssue {
    /// A header was never matched by its trailer.
    Unclosed {
        /// Level left open.
        level: EnvelopeLevel,
        /// Position of the header.
        position: usize,
    },
    /// A trailer arrived with no open span of its level.
    UnmatchedTrailer {
        /// Level the trailer belongs to.
        level: EnvelopeLevel,
        /// Position of the trailer.
        position: usize,
    },
    /// A header arrived while its parent level was not open.
    OrphanHeader {
        /// Level of the header.
        level: EnvelopeLevel,
        /// Position of the header.
        position: usize,
    },
    /// A non-control segment outside every transaction set.
    StrayContent {
        /// Tag of the stray segment.
        tag: String,
        /// Its position.
        position: usize,
    },
}

impl NestingIssue {
    /// The control tag whose complete absence from a document explains this
    /// issue. A set outside a group is explained by a document without `GS`,
    /// an unclosed group by one without `GE`, body segments outside every set
    /// by one without `ST`.
    pub fn explained_by(&self) -> Option<&'static str> {
        match self {
            Self::Unclosed { level, .. } => Some(level.trailer_tag()),
            Self::UnmatchedTrailer { level, .. } => Some(level.header_tag()),
            Self::OrphanHeader { level, .. } => Some(level.parent().unwrap_or(*level).header_tag()),
            Self::StrayContent { .. } => Some(EnvelopeLevel::TransactionSet.header_tag()),
        }
    }
}

impl fmt::Display for NestingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unclosed { level, position } => write!(
                f,
                "{} opened at position {position} is never closed by {}",
                level.header_tag(),
                level.trailer_tag()
            ),
            Self::UnmatchedTrailer { level, position } => write!(
                f,
                "{} at position {position} has no open {level} to close",
                level.trailer_tag()
            ),
            Self::OrphanHeader { level, position } => write!(
                f,
                "{} at position {position} appears outside an open {}",
                level.header_tag(),
                level.parent().unwrap_or(*level)
            ),
            Self::StrayContent { tag, position } => write!(
                f,
                "segment {tag} at position {position} lies outside any transaction set"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

/// The reconstructed nesting of a document.
///
/// Groups and sets whose parent header never appeared are kept as orphans,
/// so checks that only concern their own span still reach them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvelopeOutline {
    /// Interchanges in document order.
    pub interchanges: Vec<InterchangeSpan>,
    /// Functional groups found while no interchange was open.
    pub orphan_groups: Vec<FunctionalGroupSpan>,
    /// Transaction sets found while no functional group was open.
    pub orphan_sets: Vec<TransactionSetSpan>,
    /// Everything that did not nest cleanly, in the order it was found.
    pub issues: Vec<NestingIssue>,
}

impl EnvelopeOutline {
    /// Reconstruct the nesting of `doc` in one pass.
    pub fn of(doc: &Document) -> Self {
        let mut walk = Walk::default();
        for (position, segment) in doc.iter().enumerate() {
            walk.step(position, segment);
        }
        walk.finish_interchange(None, doc.len().saturating_sub(1));
        Self {
            interchanges: walk.interchanges,
            orphan_groups: walk.orphan_groups,
            orphan_sets: walk.orphan_sets,
            issues: walk.issues,
        }
    }

    /// Every functional group, orphans included, in document order.
    pub fn groups(&self) -> impl Iterator<Item = &FunctionalGroupSpan> {
        let mut groups: Vec<_> = self
            .interchanges
            .iter()
            .flat_map(|i| i.groups.iter())
            .chain(&self.orphan_groups)
            .collect();
        groups.sort_by_key(|g| g.header);
        groups.into_iter()
    }

    /// Every transaction set, orphans included, in document order.
    pub fn transaction_sets(&self) -> impl Iterator<Item = &TransactionSetSpan> {
        let mut sets: Vec<_> = self
            .groups()
            .flat_map(|g| g.sets.iter())
            .chain(&self.orphan_sets)
            .collect();
        sets.sort_by_key(|s| s.header);
        sets.into_iter()
    }

    /// Whether the walk found no nesting issues.
    pub fn is_well_nested(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Default)]
struct Walk {
    interchanges: Vec<InterchangeSpan>,
    orphan_groups: Vec<FunctionalGroupSpan>,
    orphan_sets: Vec<TransactionSetSpan>,
    issues: Vec<NestingIssue>,
    interchange: Option<InterchangeSpan>,
    group: Option<FunctionalGroupSpan>,
    set: Option<TransactionSetSpan>,
}

impl Walk {
    fn step(&mut self, position: usize, segment: &Segment) {
        // Implicit closes end the previous span just before the new header.
        let before = position.saturating_sub(1);
        match segment.tag() {
            "ISA" => {
                self.finish_interchange(None, before);
                self.interchange = Some(InterchangeSpan {
                    header: position,
                    trailer: None,
                    last: position,
                    groups: Vec::new(),
                });
            }
            "GS" => {
                self.finish_group(None, before);
                if self.interchange.is_none() {
                    self.issues.push(NestingIssue::OrphanHeader {
                        level: EnvelopeLevel::FunctionalGroup,
                        position,
                    });
                }
                self.group = Some(FunctionalGroupSpan {
                    header: position,
                    trailer: None,
                    last: position,
                    sets: Vec::new(),
                });
            }
            "ST" => {
                self.finish_set(None, before);
                if self.group.is_none() {
                    self.issues.push(NestingIssue::OrphanHeader {
                        level: EnvelopeLevel::TransactionSet,
                        position,
                    });
                }
                self.set = Some(TransactionSetSpan {
                    header: position,
                    trailer: None,
                    last: position,
                });
            }
            "SE" => {
                if self.set.is_some() {
                    self.finish_set(Some(position), position);
                } else {
                    self.unmatched(EnvelopeLevel::TransactionSet, position);
                }
            }
            "GE" => {
                if self.group.is_some() {
                    self.finish_group(Some(position), position);
                } else {
                    self.unmatched(EnvelopeLevel::FunctionalGroup, position);
                }
            }
            "IEA" => {
                if self.interchange.is_some() {
                    self.finish_interchange(Some(position), position);
                } else {
                    self.unmatched(EnvelopeLevel::Interchange, position);
                }
            }
            tag => {
                if self.set.is_none() {
                    self.issues.push(NestingIssue::StrayContent {
                        tag: tag.to_string(),
                        position,
                    });
                }
            }
        }
    }

    fn unmatched(&mut self, level: EnvelopeLevel, position: usize) {
        self.issues
            .push(NestingIssue::UnmatchedTrailer { level, position });
    }

    fn finish_set(&mut self, trailer: Option<usize>, last: usize) {
        let Some(mut set) = self.set.take() else {
            return;
        };
        if trailer.is_none() {
            self.issues.push(NestingIssue::Unclosed {
                level: EnvelopeLevel::TransactionSet,
                position: set.header,
            });
        }
        set.trailer = trailer;
        set.last = last.max(set.header);
        match self.group.as_mut() {
            Some(group) => group.sets.push(set),
            None => self.orphan_sets.push(set),
        }
    }

    fn finish_group(&mut self, trailer: Option<usize>, last: usize) {
        let inner_last = if trailer.is_some() { last.saturating_sub(1) } else { last };
        self.finish_set(None, inner_last);
        let Some(mut group) = self.group.take() else {
            return;
        };
        if trailer.is_none() {
            self.issues.push(NestingIssue::Unclosed {
                level: EnvelopeLevel::FunctionalGroup,
                position: group.header,
            });
        }
        group.trailer = trailer;
        group.last = last.max(group.header);
        match self.interchange.as_mut() {
            Some(interchange) => interchange.groups.push(group),
            None => self.orphan_groups.push(group),
        }
    }

    fn finish_interchange(&mut self, trailer: Option<usize>, last: usize) {
        let inner_last = if trailer.is_some() { last.saturating_sub(1) } else { last };
        self.finish_group(None, inner_last);
        let Some(mut interchange) = self.interchange.take() else {
            return;
        };
        if trailer.is_none() {
            self.issues.push(NestingIssue::Unclosed {
                level: EnvelopeLevel::Interchange,
                position: interchange.header,
            });
        }
        interchange.trailer = trailer;
        interchange.last = last.max(interchange.header);
        self.interchanges.push(interchange);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    const TWO_SETS: &str = "ISA*00~GS*HC*S*R*20230701*1200*7*X*005010~\
        ST*837*0001~BHT*0019~SE*3*0001~\
        ST*837*0002~BHT*0019~CLM*A*10~SE*4*0002~\
        GE*2*7~IEA*1*000000001~";

    #[test]
    fn level_tags() {
        assert_eq!(EnvelopeLevel::FunctionalGroup.header_tag(), "GS");
        assert_eq!(EnvelopeLevel::TransactionSet.trailer_tag(), "SE");
        assert_eq!(EnvelopeLevel::from_header("ISA"), Some(EnvelopeLevel::Interchange));
        assert_eq!(EnvelopeLevel::from_trailer("GE"), Some(EnvelopeLevel::FunctionalGroup));
        assert_eq!(EnvelopeLevel::from_trailer("ST"), None);
    }

    #[test]
    fn outlines_two_sets_in_one_group() {
        let doc = tokenize(TWO_SETS);
        let outline = EnvelopeOutline::of(&doc);
        assert!(outline.is_well_nested(), "{:?}", outline.issues);
        assert_eq!(outline.interchanges.len(), 1);

        let interchange = &outline.interchanges[0];
        assert_eq!((interchange.header, interchange.trailer), (0, Some(10)));
        assert_eq!(interchange.groups.len(), 1);

        let group = &interchange.groups[0];
        assert_eq!(group.trailer, Some(9));
        assert_eq!(group.control_number(&doc), Some("7"));
        assert_eq!(group.version(&doc), Some("005010"));

        let sets: Vec<_> = outline.transaction_sets().collect();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].range(), 2..5);
        assert_eq!(sets[1].segment_count(), 4);
        assert_eq!(sets[1].control_number(&doc), Some("0002"));
        assert_eq!(sets[1].type_code(&doc), Some("837"));
    }

    #[test]
    fn missing_group_trailer_is_reported_once() {
        let doc = tokenize("ISA*00~GS*HC~ST*837*0001~BHT~SE*3*0001~IEA*1*1~");
        let outline = EnvelopeOutline::of(&doc);
        assert_eq!(
            outline.issues,
            vec![NestingIssue::Unclosed {
                level: EnvelopeLevel::FunctionalGroup,
                position: 1
            }]
        );
        assert_eq!(outline.issues[0].explained_by(), Some("GE"));
        let group = &outline.interchanges[0].groups[0];
        assert_eq!(group.trailer, None);
        assert_eq!(group.sets[0].trailer, Some(4));
    }

    #[test]
    fn set_left_open_by_group_trailer() {
        let doc = tokenize("ISA~GS~ST*837*1~BHT~GE*1*1~IEA*1*1~");
        let outline = EnvelopeOutline::of(&doc);
        let set = &outline.interchanges[0].groups[0].sets[0];
        assert_eq!(set.trailer, None);
        assert_eq!(set.last, 3);
        assert!(outline.issues.contains(&NestingIssue::Unclosed {
            level: EnvelopeLevel::TransactionSet,
            position: 2
        }));
    }

    #[test]
    fn stray_and_unmatched_segments() {
        let doc = tokenize("BHT~ISA~GS~SE*1*1~NM1~GE*0*1~IEA*1*1~GE*0*1~");
        let outline = EnvelopeOutline::of(&doc);
        assert_eq!(
            outline.issues,
            vec![
                NestingIssue::StrayContent { tag: "BHT".into(), position: 0 },
                NestingIssue::UnmatchedTrailer {
                    level: EnvelopeLevel::TransactionSet,
                    position: 3
                },
                NestingIssue::StrayContent { tag: "NM1".into(), position: 4 },
                NestingIssue::UnmatchedTrailer {
                    level: EnvelopeLevel::FunctionalGroup,
                    position: 7
                },
            ]
        );
    }

    #[test]
    fn orphan_header_is_reported() {
        let doc = tokenize("ST*837*1~SE*2*1~");
        let outline = EnvelopeOutline::of(&doc);
        assert_eq!(
            outline.issues,
            vec![NestingIssue::OrphanHeader {
                level: EnvelopeLevel::TransactionSet,
                position: 0
            }]
        );
        assert!(outline.interchanges.is_empty());
        assert_eq!(outline.issues[0].explained_by(), Some("GS"));
        assert_eq!(outline.orphan_sets.len(), 1);
        assert_eq!(outline.transaction_sets().count(), 1);
    }

    #[test]
    fn group_without_interchange_keeps_its_sets() {
        let doc = tokenize("GS*HC*S*R*20230701*1200*1*X*005010~ST*837*0001~BHT~SE*3*0001~GE*1*1~IEA*1*1~");
        let outline = EnvelopeOutline::of(&doc);
        assert!(outline.interchanges.is_empty());
        assert_eq!(outline.orphan_groups.len(), 1);
        assert_eq!(outline.orphan_groups[0].trailer, Some(4));
        let sets: Vec<_> = outline.transaction_sets().collect();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].range(), 1..4);
        assert_eq!(
            outline.issues.iter().map(NestingIssue::explained_by).collect::<Vec<_>>(),
            [Some("ISA"), Some("ISA")]
        );
    }

    #[test]
    fn orphan_and_nested_sets_come_back_in_document_order() {
        let doc = tokenize("ST*270*1~SE*2*1~ISA~GS~ST*837*2~SE*2*2~GE*1*1~IEA*1*1~");
        let outline = EnvelopeOutline::of(&doc);
        let headers: Vec<_> = outline.transaction_sets().map(|s| s.header).collect();
        assert_eq!(headers, [0, 4]);
    }

    #[test]
    fn second_interchange_closes_the_first() {
        let doc = tokenize("ISA~GS~ST*1*1~SE*2*1~GE*1*1~ISA~IEA*0*2~");
        let outline = EnvelopeOutline::of(&doc);
        assert_eq!(outline.interchanges.len(), 2);
        assert_eq!(outline.interchanges[0].trailer, None);
        assert_eq!(outline.interchanges[0].last, 4);
        assert_eq!(outline.interchanges[1].trailer, Some(6));
    }

    #[test]
    fn empty_document_has_empty_outline() {
        let outline = EnvelopeOutline::of(&tokenize("~"));
        assert_eq!(outline, EnvelopeOutline::default());
    }

    #[test]
    fn issue_display_names_positions() {
        let issue = NestingIssue::Unclosed {
            level: EnvelopeLevel::FunctionalGroup,
            position: 1,
        };
        assert_eq!(issue.to_string(), "GS opened at position 1 is never closed by GE");
        let orphan = NestingIssue::OrphanHeader {
            level: EnvelopeLevel::TransactionSet,
            position: 4,
        };
        assert_eq!(orphan.to_string(), "ST at position 4 appears outside an open functional group");
    }
}
