use crate::index::Corpus;
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Number of entries kept when sampling `n` entries at `fraction`.
///
/// Never zero for non-empty input, never more than `n`.
pub fn retained_len(n: usize, fraction: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let k = (fraction * n as f64).floor();
    if k.is_nan() || k < 1.0 {
        1
    } else {
        (k as usize).min(n)
    }
}

/// Seeded generator when `seed` is set, thread-local entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed_value) => Box::new(StdRng::seed_from_u64(seed_value)),
        None => Box::new(rand::rng()),
    }
}

/// Keep a uniform random subset of `corpus` without replacement.
pub fn sample_corpus<R: Rng + ?Sized>(corpus: Corpus, fraction: f64, rng: &mut R) -> Corpus {
    let k = retained_len(corpus.len(), fraction);
    if k == corpus.len() {
        return corpus;
    }
    let mut entries: Vec<_> = corpus.into_iter().collect();
    entries.shuffle(rng);
    entries.truncate(k);
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocKey;

    fn corpus(n: usize) -> Corpus {
        (0..n).map(|i| (DocKey::new(i as i64, format!("{i}.srt")), format!("text {i}"))).collect()
    }

    #[test]
    fn retained_len_floors_and_keeps_one() {
        assert_eq!(retained_len(0, 0.3), 0);
        assert_eq!(retained_len(1, 0.3), 1);
        assert_eq!(retained_len(3, 0.3), 1);
        assert_eq!(retained_len(10, 0.3), 3);
        assert_eq!(retained_len(1000, 0.3), 300);
        assert_eq!(retained_len(7, 1.0), 7);
    }

    #[test]
    fn sample_is_subset_of_expected_size() {
        for n in [1usize, 2, 5, 10, 37, 100] {
            let input = corpus(n);
            let mut rng = make_rng(Some(7));
            let out = sample_corpus(input.clone(), 0.3, &mut *rng);
            assert_eq!(out.len(), retained_len(n, 0.3));
            assert!(out.keys().all(|k| input.contains_key(k)));
        }
    }

    #[test]
    fn same_seed_same_selection() {
        let a = sample_corpus(corpus(50), 0.3, &mut StdRng::seed_from_u64(42));
        let b = sample_corpus(corpus(50), 0.3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>());
    }

    #[test]
    fn empty_stays_empty() {
        let mut rng = make_rng(None);
        assert!(sample_corpus(Corpus::new(), 0.3, &mut *rng).is_empty());
    }
}
