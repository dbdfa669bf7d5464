//! # Document Index
//!
//! An ordered segment sequence plus a derived tag → positions index.
//!
//! ## Invariant
//!
//! The index is a pure function of the segment sequence, built in one pass at
//! construction. Positions in every index entry are strictly increasing and
//! equal to the order the segments appeared in the source text. Nothing is
//! ever looked up by tag alone without a way back to its position, which is
//! what lets a caller tell two `NM1` segments in different transaction sets
//! apart.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Serialize, Serializer};

use crate::delimiters::Delimiters;
use crate::error::CoreError;
use crate::segment::Segment;

/// An ordered sequence of segments with a derived positional index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    segments: Vec<Segment>,
    index: HashMap<String, Vec<usize>>,
}

impl Document {
    /// Build a document, deriving the tag index in a single pass.
    pub fn new(segments: Vec<Segment>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, segment) in segments.iter().enumerate() {
            index
                .entry(segment.tag().to_string())
                .or_default()
                .push(position);
        }
        Self { segments, index }
    }

    /// All segments in source order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate segments in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the document holds no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Ascending positions of every segment carrying `tag`.
    pub fn occurrences(&self, tag: &str) -> &[usize] {
        self.index.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Positions of `tag` that fall inside `range`.
    pub fn occurrences_within(&self, tag: &str, range: Range<usize>) -> &[usize] {
        let all = self.occurrences(tag);
        let lo = all.partition_point(|&p| p < range.start);
        let hi = all.partition_point(|&p| p < range.end);
        &all[lo..hi.max(lo)]
    }

    /// The segment at `position`.
    pub fn segment_at(&self, position: usize) -> Result<&Segment, CoreError> {
        self.segments.get(position).ok_or(CoreError::OutOfRange {
            position,
            len: self.segments.len(),
        })
    }

    /// The first segment carrying `tag`.
    pub fn first(&self, tag: &str) -> Option<&Segment> {
        self.nth(tag, 0)
    }

    /// The `occurrence`-th (zero-based) segment carrying `tag`.
    pub fn nth(&self, tag: &str, occurrence: usize) -> Option<&Segment> {
        self.occurrences(tag)
            .get(occurrence)
            .and_then(|&p| self.segments.get(p))
    }

    /// How many segments carry `tag`.
    pub fn count(&self, tag: &str) -> usize {
        self.occurrences(tag).len()
    }

    /// Whether any segment carries `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    /// Render every segment in wire form, in order.
    pub fn to_wire(&self, delimiters: &Delimiters) -> String {
        self.segments.iter().map(|s| s.to_wire(delimiters)).collect()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.segments.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
