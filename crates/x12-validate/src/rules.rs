//! # Content Rules
//!
//! Per-transaction-set checks are plugged in by registration, keyed by the
//! `ST01` type code. The validator never branches on a type code itself: a
//! new transaction type is supported by registering a [`ContentRules`]
//! implementation, not by editing the pipeline.
//!
//! ## Contract
//!
//! A rule set receives the whole [`Document`] and the position range of one
//! transaction set (header through trailer). It returns one message per
//! failed check; each message lands in the report verbatim. An empty vector
//! means the set passed.
//!
//! Rule sets are `Send + Sync` so a single validator can be shared across
//! threads.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use x12_core::Document;

/// A pluggable content validator for one transaction-set type.
pub trait ContentRules: Send + Sync {
    /// Check the segments of one transaction set.
    fn check(&self, doc: &Document, range: Range<usize>) -> Vec<String>;
}

impl<F> ContentRules for F
where
    F: Fn(&Document, Range<usize>) -> Vec<String> + Send + Sync,
{
    fn check(&self, doc: &Document, range: Range<usize>) -> Vec<String> {
        self(doc, range)
    }
}

/// Map from transaction-set type code to its rule set.
#[derive(Clone, Default)]
pub(crate) struct RuleRegistry {
    rules: BTreeMap<String, Arc<dyn ContentRules>>,
}

impl RuleRegistry {
    /// Register `rules` for `code`, replacing any earlier registration.
    pub(crate) fn register(&mut self, code: impl Into<String>, rules: impl ContentRules + 'static) {
        let code = code.into();
        if self.rules.insert(code.clone(), Arc::new(rules)).is_some() {
            tracing::debug!(code = %code, "replaced content rules");
        }
    }

    /// Rules registered for `code`, if any.
    pub(crate) fn get(&self, code: &str) -> Option<&dyn ContentRules> {
        self.rules.get(code).map(|r| r.as_ref())
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("codes", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x12_core::tokenize;

    fn requires_ref(doc: &Document, range: Range<usize>) -> Vec<String> {
        if doc.occurrences_within("REF", range).is_empty() {
            vec!["REF required".to_string()]
        } else {
            Vec::new()
        }
    }

    #[test]
    fn closures_and_functions_are_rule_sets() {
        let mut registry = RuleRegistry::default();
        registry.register("270", requires_ref);
        registry.register("271", |_: &Document, _: Range<usize>| Vec::new());
        assert_eq!(format!("{registry:?}"), r#"RuleRegistry { codes: ["270", "271"] }"#);

        let doc = tokenize("ST*270*0001~BHT~SE*3*0001~");
        let rules = registry.get("270").unwrap();
        assert_eq!(rules.check(&doc, 0..3), ["REF required"]);
        assert!(registry.get("271").unwrap().check(&doc, 0..3).is_empty());
        assert!(registry.get("837").is_none());
    }

    #[test]
    fn re_registration_replaces() {
        let mut registry = RuleRegistry::default();
        registry.register("270", requires_ref);
        registry.register("270", |_: &Document, _: Range<usize>| Vec::new());
        let doc = tokenize("ST*270*0001~SE*2*0001~");
        assert!(registry.get("270").unwrap().check(&doc, 0..2).is_empty());
    }
}
