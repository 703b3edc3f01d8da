use crate::archive::{load_store, Diagnostic, ExtractReport, Progress};
use crate::config::SearchConfig;
use crate::error::LoadError;
use crate::index::{Corpus, IndexedDoc, SearchHit};
use crate::rank::rank;
use crate::sample::{make_rng, sample_corpus};
use crate::tokenizer::normalize;
use crate::vector::TermVector;
use std::time::Instant;
use tracing::{debug, info};

/// How a query was answered.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The query was blank; nothing was searched.
    EmptyQuery,
    /// No documents are loaded.
    EmptyCorpus,
    /// Every document scored 0.0 against the query.
    NoMatches,
    Hits(Vec<SearchHit>),
}

/// Where the documents came from and what was lost along the way.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub table: String,
    pub used_fallback: bool,
    pub rows_total: usize,
    /// Subtitles extracted before sampling.
    pub extracted: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// An in-memory, read-only search session over a sampled corpus.
#[derive(Debug, Clone, Default)]
pub struct Session {
    docs: Vec<IndexedDoc>,
    summary: LoadSummary,
}

impl Session {
    /// Load the store named by `config`, sample it and prepare every
    /// document for search.
    pub fn load(config: &SearchConfig, progress: &mut dyn FnMut(Progress)) -> Result<Self, LoadError> {
        config.validate()?;
        let report = load_store(&config.store_path, &config.table, progress)?;
        Ok(Self::from_report(report, config))
    }

    pub fn from_report(report: ExtractReport, config: &SearchConfig) -> Self {
        let ExtractReport { table, used_fallback, rows_total, corpus, diagnostics } = report;
        let extracted = corpus.len();
        let mut session = Self::from_corpus(corpus, config);
        info!(before = extracted, after = session.len(), fraction = config.retention_fraction, "sampled corpus");
        session.summary = LoadSummary { table, used_fallback, rows_total, extracted, diagnostics };
        session
    }

    /// Sample `corpus` at the configured fraction and index the survivors.
    pub fn from_corpus(corpus: Corpus, config: &SearchConfig) -> Self {
        let extracted = corpus.len();
        let mut rng = make_rng(config.seed);
        let sampled = sample_corpus(corpus, config.retention_fraction, &mut *rng);
        let mut session = Self::from_documents(sampled);
        session.summary.extracted = extracted;
        session
    }

    /// Index `corpus` as-is, without sampling.
    pub fn from_documents(corpus: Corpus) -> Self {
        let docs = corpus.into_iter().map(|(key, raw)| IndexedDoc::from_raw(key, &raw)).collect();
        Self { docs, summary: LoadSummary::default() }
    }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn summary(&self) -> &LoadSummary { &self.summary }

    pub fn get(&self, row_id: i64, file_name: &str) -> Option<&IndexedDoc> {
        self.docs.iter().find(|d| d.key.row_id == row_id && d.key.file_name == file_name)
    }

    /// Run `query` against every document and return the best `k`
    /// (at least one).
    pub fn search(&self, query: &str, k: usize) -> QueryOutcome {
        if query.trim().is_empty() {
            return QueryOutcome::EmptyQuery;
        }
        if self.docs.is_empty() {
            return QueryOutcome::EmptyCorpus;
        }
        let start = Instant::now();
        let query_vec = TermVector::from_tokens(normalize(query));
        let hits = rank(&query_vec, &self.docs, k.max(1));
        debug!(query, docs = self.docs.len(), took_s = start.elapsed().as_secs_f64(), "ranked corpus");
        match hits.first() {
            Some(best) if best.score > 0.0 => QueryOutcome::Hits(hits),
            _ => QueryOutcome::NoMatches,
        }
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
