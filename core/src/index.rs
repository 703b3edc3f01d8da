use crate::tokenizer::normalize;
use crate::vector::TermVector;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of one decoded subtitle: the store row it came from plus the
/// file name (the row's own name, or the member name inside a ZIP blob).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocKey {
    pub row_id: i64,
    pub file_name: String,
}

impl DocKey {
    pub fn new(row_id: i64, file_name: impl Into<String>) -> Self {
        Self { row_id, file_name: file_name.into() }
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subtitle_{}_{}", self.row_id, self.file_name)
    }
}

/// Decoded subtitle text keyed by identity. Ordered so iteration (and
/// therefore ranking tie-breaks) does not depend on hashing.
pub type Corpus = BTreeMap<DocKey, String>;

/// A corpus entry prepared for search: normalized display text and its
/// term vector, computed once when the session is built.
#[derive(Debug, Clone)]
pub struct IndexedDoc {
    pub key: DocKey,
    /// Normalized tokens joined with single spaces.
    pub text: String,
    pub vector: TermVector,
}

impl IndexedDoc {
    pub fn from_raw(key: DocKey, raw: &str) -> Self {
        let tokens = normalize(raw);
        let text = tokens.join(" ");
        let vector = TermVector::from_tokens(tokens);
        Self { key, text, vector }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub key: DocKey,
    pub score: f64, // cosine over raw counts, in [0, 1]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_and_order() {
        let a = DocKey::new(2, "b.srt");
        let b = DocKey::new(10, "a.srt");
        assert_eq!(a.to_string(), "subtitle_2_b.srt");
        assert!(a < b);
        assert!(DocKey::new(2, "a.srt") < a);
    }

    #[test]
    fn indexed_doc_materializes_normalized_text() {
        let d = IndexedDoc::from_raw(DocKey::new(1, "x.srt"), "1\n00:00:01,000 --> 00:00:02,000\nHi THERE hi\n");
        assert_eq!(d.text, "hi there hi");
        assert_eq!(d.vector.get("hi"), 2);
    }
}
