//! # Delimiters
//!
//! The three single-character separators of the wire format. The defaults
//! (`~`, `*`, `:`) match the sample documents the bundled rule set was
//! written against; any other distinct characters are accepted.
//!
//! ## Sniffing
//!
//! An `ISA` header announces its own delimiters: the character right after
//! the tag is the element separator, and the sixteenth element (`ISA16`) is
//! the one-character sub-element separator, immediately followed by the
//! segment terminator. [`Delimiters::sniff`] reads them from that position
//! without assuming the header is fixed-width.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of elements in an interchange header.
const ISA_ELEMENT_COUNT: usize = 16;

/// Segment terminator, element separator and sub-element separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delimiters {
    /// Terminates each segment.
    pub segment: char,
    /// Separates fields within a segment.
    pub element: char,
    /// Separates components within a composite field.
    pub sub_element: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            segment: '~',
            element: '*',
            sub_element: ':',
        }
    }
}

impl Delimiters {
    /// Build a delimiter set, rejecting any two roles sharing a character.
    pub fn new(segment: char, element: char, sub_element: char) -> Result<Self, CoreError> {
        if segment == element || segment == sub_element || element == sub_element {
            return Err(CoreError::AmbiguousDelimiters {
                segment,
                element,
                sub_element,
            });
        }
        Ok(Self {
            segment,
            element,
            sub_element,
        })
    }

    /// Whether `c` plays any of the three delimiter roles.
    pub fn is_delimiter(&self, c: char) -> bool {
        c == self.segment || c == self.element || c == self.sub_element
    }

    /// Read the delimiters declared by a leading `ISA` header.
    ///
    /// Returns `None` if the text does not start with `ISA` or the header is
    /// truncated before its terminator.
    pub fn sniff(raw: &str) -> Option<Self> {
        let rest = raw.trim_start().strip_prefix("ISA")?;
        let mut chars = rest.chars();
        let element = chars.next()?;

        let mut seen = 1;
        while seen < ISA_ELEMENT_COUNT {
            if chars.next()? == element {
                seen += 1;
            }
        }

        let sub_element = chars.next()?;
        let segment = chars.next()?;
        match Self::new(segment, element, sub_element) {
            Ok(delims) => Some(delims),
            Err(e) => {
                tracing::warn!(error = %e, "ISA header declares unusable delimiters");
                None
            }
        }
    }

    /// Sniff from the header, falling back to `fallback` when that fails.
    pub fn sniff_or(raw: &str, fallback: Self) -> Self {
        Self::sniff(raw).unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISA: &str = "ISA*00*          *00*          *ZZ*SENDER         *ZZ*RECEIVER       *230701*1200*^*00501*000000001*0*P*:~GS*HC";

    #[test]
    fn recognizes_every_delimiter_role() {
        let d = Delimiters::default();
        assert!(['~', '*', ':'].into_iter().all(|c| d.is_delimiter(c)));
        assert!(!d.is_delimiter('^'));
    }

    #[test]
    fn default_matches_sample_documents() {
        let d = Delimiters::default();
        assert_eq!((d.segment, d.element, d.sub_element), ('~', '*', ':'));
    }

    #[test]
    fn rejects_duplicate_characters() {
        assert!(matches!(
            Delimiters::new('*', '*', ':'),
            Err(CoreError::AmbiguousDelimiters { .. })
        ));
        assert!(Delimiters::new('~', '*', '~').is_err());
    }

    #[test]
    fn sniffs_default_header() {
        assert_eq!(Delimiters::sniff(ISA), Some(Delimiters::default()));
    }

    #[test]
    fn sniffs_custom_header() {
        let raw = ISA.replace('*', "|").replace(":~", ">\n");
        let d = Delimiters::sniff(&raw).unwrap();
        assert_eq!(d, Delimiters::new('\n', '|', '>').unwrap());
    }

    #[test]
    fn sniff_tolerates_variable_width_version() {
        let raw = ISA.replace("*00501*", "*005010X222A1*");
        assert_eq!(Delimiters::sniff(&raw), Some(Delimiters::default()));
    }

    #[test]
    fn sniff_rejects_non_isa_and_truncated_input() {
        assert_eq!(Delimiters::sniff("GS*HC*S*R~"), None);
        assert_eq!(Delimiters::sniff("ISA*00*"), None);
        assert_eq!(Delimiters::sniff(""), None);
    }

    #[test]
    fn sniff_or_falls_back() {
        let fallback = Delimiters::new('\n', '|', '>').unwrap();
        assert_eq!(Delimiters::sniff_or("BHT|1\n", fallback), fallback);
    }
}
