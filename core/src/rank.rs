use crate::index::{IndexedDoc, SearchHit};
use crate::vector::TermVector;
use std::cmp::Ordering;

/// Cosine similarity over raw term counts.
///
/// Dot product and squared norms are summed as integers, so the score is
/// exactly symmetric and a non-empty vector scores exactly 1.0 against itself.
/// Vectors with no shared term, or an empty side, score 0.0.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: u64 = small
        .iter()
        .map(|(term, c)| (c as u64) * (large.get(term) as u64))
        .sum();
    if dot == 0 {
        return 0.0;
    }
    let denom = ((a.squared_norm() as f64) * (b.squared_norm() as f64)).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot as f64 / denom).clamp(0.0, 1.0)
}

fn by_score_then_key(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.key.cmp(&b.key))
}

/// Score every document against `query` and keep the best `k`.
///
/// Full linear scan, no pruning. Ties on score are ordered by document key
/// ascending.
pub fn rank<'a, I>(query: &TermVector, docs: I, k: usize) -> Vec<SearchHit>
where
    I: IntoIterator<Item = &'a IndexedDoc>,
{
    let mut scored: Vec<SearchHit> = docs
        .into_iter()
        .map(|doc| SearchHit {
            key: doc.key.clone(),
            score: cosine_similarity(query, &doc.vector),
            text: doc.text.clone(),
        })
        .collect();
    scored.sort_by(by_score_then_key);
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocKey;

    fn tv(s: &str) -> TermVector { TermVector::from_tokens(s.split_whitespace()) }

    #[test]
    fn disjoint_is_zero() {
        assert_eq!(cosine_similarity(&tv("a b"), &tv("c d")), 0.0);
        assert_eq!(cosine_similarity(&tv(""), &tv("c d")), 0.0);
    }

    #[test]
    fn self_similarity_is_one() {
        let v = tv("to be or not to be");
        assert_eq!(cosine_similarity(&v, &v), 1.0);
    }

    #[test]
    fn known_value() {
        // dot = 1, norms sqrt(2) * sqrt(2)
        let s = cosine_similarity(&tv("hello world"), &tv("goodbye world"));
        assert!((s - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ties_break_on_key() {
        let docs = vec![
            IndexedDoc::from_raw(DocKey::new(9, "b.srt"), "same words"),
            IndexedDoc::from_raw(DocKey::new(3, "a.srt"), "same words"),
            IndexedDoc::from_raw(DocKey::new(5, "c.srt"), "other"),
        ];
        let hits = rank(&tv("same"), &docs, 3);
        assert_eq!(hits[0].key, DocKey::new(3, "a.srt"));
        assert_eq!(hits[1].key, DocKey::new(9, "b.srt"));
        assert_eq!(hits[2].score, 0.0);
    }
}
