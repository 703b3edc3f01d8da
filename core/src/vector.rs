use std::collections::HashMap;

/// Sparse term-frequency vector: token -> raw occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermVector {
    counts: HashMap<String, u32>,
}

impl TermVector {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for tok in tokens {
            *counts.entry(tok.into()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Count for `term`, zero when absent.
    pub fn get(&self, term: &str) -> u32 { self.counts.get(term).copied().unwrap_or(0) }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.counts.len() }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    /// Sum of all counts, i.e. the token count the vector was built from.
    pub fn total(&self) -> u64 { self.counts.values().map(|&c| c as u64).sum() }

    /// Squared L2 norm, exact in integer arithmetic.
    pub fn squared_norm(&self) -> u64 { self.counts.values().map(|&c| (c as u64) * (c as u64)).sum() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(t, &c)| (t.as_str(), c))
    }
}
