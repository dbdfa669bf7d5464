//! # Segment Model
//!
//! The elementary unit of a document: a tag followed by an ordered list of
//! fields. Segments are immutable once constructed.

use serde::Serialize;

use crate::delimiters::Delimiters;

/// One tag plus its ordered fields.
///
/// A present-but-blank field (`""`) is distinct from an absent one: absent
/// means the field list is shorter than the index requested, and
/// [`Segment::field`] returns `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    tag: String,
    fields: Vec<String>,
}

impl Segment {
    /// Build a segment from a tag and its fields.
    pub fn new<T, I, F>(tag: T, fields: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            tag: tag.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// The segment identifier, e.g. `ISA` or `CLM`.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// All fields in order, excluding the tag.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The field at a zero-based index, or `None` when absent.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Number of fields, excluding the tag.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether this segment carries the given tag.
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Render the segment in wire form, terminator included.
    pub fn to_wire(&self, delimiters: &Delimiters) -> String {
        let mut out = String::with_capacity(
            self.tag.len() + self.fields.iter().map(|f| f.len() + 1).sum::<usize>() + 1,
        );
        out.push_str(&self.tag);
        for field in &self.fields {
            out.push(delimiters.element);
            out.push_str(field);
        }
        out.push(delimiters.segment);
        out
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_wire(&Delimiters::default()))
    }
}
