//! # Tokenizer
//!
//! Splits raw text into an ordered [`Document`]. The tokenizer does not look
//! at tag names or field counts; a bare tag with no fields is a legal segment
//! at this layer.
//!
//! Fragments that are empty after trimming surrounding whitespace are dropped,
//! so a trailing terminator (or a newline after each terminator) never yields
//! a phantom segment.

use crate::delimiters::Delimiters;
use crate::document::Document;
use crate::error::CoreError;
use crate::segment::Segment;

/// Tokenizer bound to a delimiter set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    delimiters: Delimiters,
}

impl Tokenizer {
    /// Create a tokenizer for the given delimiters.
    pub fn new(delimiters: Delimiters) -> Self {
        Self { delimiters }
    }

    /// Create a tokenizer using the delimiters declared by the input's `ISA`
    /// header, or the defaults if none can be read.
    pub fn sniffing(raw: &str) -> Self {
        Self::new(Delimiters::sniff_or(raw, Delimiters::default()))
    }

    /// The delimiters this tokenizer splits on.
    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    /// Split `raw` into segments. Never fails; may return an empty document.
    pub fn tokenize(&self, raw: &str) -> Document {
        let segments = raw
            .split(self.delimiters.segment)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(|fragment| {
                let mut pieces = fragment.split(self.delimiters.element);
                // `split` always yields at least one piece for a non-empty fragment.
                let tag = pieces.next().unwrap_or_default();
                Segment::new(tag, pieces)
            })
            .collect::<Vec<_>>();
        Document::new(segments)
    }

    /// Split `raw` into segments, failing when nothing can be produced.
    pub fn parse(&self, raw: &str) -> Result<Document, CoreError> {
        let document = self.tokenize(raw);
        if document.is_empty() {
            return Err(CoreError::MalformedInput);
        }
        Ok(document)
    }
}

/// Tokenize with the default delimiters.
pub fn tokenize(raw: &str) -> Document {
    Tokenizer::default().tokenize(raw)
}

/// Tokenize with the default delimiters, rejecting input with no segments.
pub fn parse(raw: &str) -> Result<Document, CoreError> {
    Tokenizer::default().parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn splits_tags_and_fields() {
        let doc = tokenize("ST*837*0001~BHT*0019*00~SE*3*0001~");
        assert_eq!(doc.len(), 3);
        let st = doc.segment_at(0).unwrap();
        assert_eq!(st.tag(), "ST");
        assert_eq!(st.fields(), ["837", "0001"]);
    }

    #[test]
    fn trailing_terminator_produces_no_phantom_segment() {
        assert_eq!(tokenize("GE*1*1~").len(), 1);
        assert_eq!(tokenize("GE*1*1~~~").len(), 1);
    }

    #[test]
    fn missing_trailing_terminator_is_tolerated() {
        let doc = tokenize("GE*1*1~IEA*1*000000001");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.segment_at(1).unwrap().tag(), "IEA");
    }

    #[test]
    fn newlines_between_segments_are_insignificant() {
        let doc = tokenize("ST*837*0001~\r\nBHT*0019~\n  SE*3*0001~\n");
        let tags: Vec<_> = doc.iter().map(Segment::tag).collect();
        assert_eq!(tags, ["ST", "BHT", "SE"]);
    }

    #[test]
    fn bare_tag_and_blank_fields_survive() {
        let doc = tokenize("LX~NM1*IL**X~");
        assert_eq!(doc.segment_at(0).unwrap().field_count(), 0);
        assert_eq!(doc.segment_at(1).unwrap().fields(), ["IL", "", "X"]);
    }

    #[test]
    fn terminator_only_input_is_empty() {
        assert!(tokenize("~").is_empty());
        assert!(tokenize("").is_empty());
        assert_eq!(parse("~"), Err(CoreError::MalformedInput));
        assert_eq!(parse("  \n"), Err(CoreError::MalformedInput));
    }

    #[test]
    fn custom_delimiters() {
        let delims = Delimiters::new('\n', '|', '>').unwrap();
        let doc = Tokenizer::new(delims).tokenize("ST|270|0001\nSE|2|0001\n");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.segment_at(1).unwrap().field(0), Some("2"));
    }

    #[test]
    fn sniffing_tokenizer_reads_header_delimiters() {
        let raw = "ISA|00|          |00|          |ZZ|S              |ZZ|R              |230701|1200|^|00501|000000001|0|P|>\nGS|HC|S|R|20230701|1200|1|X|005010\n";
        let tokenizer = Tokenizer::sniffing(raw);
        assert_eq!(tokenizer.delimiters().element, '|');
        let doc = tokenizer.tokenize(raw);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.segment_at(0).unwrap().field_count(), 16);
    }

    proptest! {
        /// Same input, same document.
        #[test]
        fn tokenize_is_deterministic(raw in "[A-Z0-9*~ ]{0,80}") {
            prop_assert_eq!(tokenize(&raw), tokenize(&raw));
        }

        /// No segment ever comes out with an empty, whitespace-padded tag.
        #[test]
        fn no_phantom_segments(raw in "[A-Z*~\n ]{0,80}") {
            for seg in tokenize(&raw).iter() {
                prop_assert!(!seg.tag().is_empty() || seg.field_count() > 0);
                prop_assert_eq!(seg.tag(), seg.tag().trim_start());
            }
        }
    }
}
