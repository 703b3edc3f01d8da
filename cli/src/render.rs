use serde::Serialize;
use std::io::{self, Write};
use subsearch_core::session::LoadSummary;
use subsearch_core::{preview, QueryOutcome};

pub fn render_outcome<W: Write>(out: &mut W, query: &str, outcome: &QueryOutcome, preview_chars: usize) -> io::Result<()> {
    match outcome {
        QueryOutcome::EmptyQuery => writeln!(out, "warning: please enter a search query"),
        QueryOutcome::EmptyCorpus => writeln!(out, "error: no subtitles loaded, nothing to search"),
        QueryOutcome::NoMatches => writeln!(
            out,
            "No matches found for '{query}'. Try a different query or check if the subtitle is in the sampled data."
        ),
        QueryOutcome::Hits(hits) => {
            writeln!(out, "Query: '{query}'")?;
            for hit in hits {
                writeln!(out, "Document: {}", hit.key)?;
                writeln!(out, "Similarity: {:.4}", hit.score)?;
                writeln!(out, "Text: {}", preview(&hit.text, preview_chars))?;
                writeln!(out, "---")?;
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
pub struct ExtractSummary<'a> {
    pub table: &'a str,
    pub used_fallback: bool,
    pub rows_total: usize,
    pub extracted: usize,
    pub sampled: usize,
    pub skipped: Vec<String>,
}

impl<'a> ExtractSummary<'a> {
    pub fn new(summary: &'a LoadSummary, sampled: usize) -> Self {
        Self {
            table: &summary.table,
            used_fallback: summary.used_fallback,
            rows_total: summary.rows_total,
            extracted: summary.extracted,
            sampled,
            skipped: summary.diagnostics.iter().map(|d| d.to_string()).collect(),
        }
    }
}

pub fn render_summary<W: Write>(out: &mut W, s: &ExtractSummary<'_>) -> io::Result<()> {
    if s.used_fallback {
        writeln!(out, "table: {} (fallback, preferred table not found)", s.table)?;
    } else {
        writeln!(out, "table: {}", s.table)?;
    }
    writeln!(out, "rows: {}", s.rows_total)?;
    writeln!(out, "subtitles extracted: {}", s.extracted)?;
    writeln!(out, "subtitles after sampling: {}", s.sampled)?;
    if !s.skipped.is_empty() {
        writeln!(out, "skipped rows: {}", s.skipped.len())?;
        for line in &s.skipped {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use subsearch_core::{DocKey, SearchHit};

    fn render(query: &str, outcome: &QueryOutcome) -> String {
        let mut buf = Vec::new();
        render_outcome(&mut buf, query, outcome, 10).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn hits_show_identity_score_and_preview() {
        let hits = vec![SearchHit { key: DocKey::new(3, "ep1.srt"), score: 0.70710678, text: "hello world and more words".into() }];
        let s = render("hello", &QueryOutcome::Hits(hits));
        assert!(s.contains("Document: subtitle_3_ep1.srt"));
        assert!(s.contains("Similarity: 0.7071"));
        assert!(s.contains("Text: hello worl..."));
    }

    #[test]
    fn no_match_and_empty_query_messages() {
        assert!(render("zzz", &QueryOutcome::NoMatches).starts_with("No matches found for 'zzz'"));
        assert!(render("", &QueryOutcome::EmptyQuery).starts_with("warning:"));
    }

    #[test]
    fn summary_lists_skipped_rows() {
        let summary = ExtractSummary {
            table: "subs",
            used_fallback: true,
            rows_total: 4,
            extracted: 3,
            sampled: 1,
            skipped: vec!["row 4 (broken.zip): bad".into()],
        };
        let mut buf = Vec::new();
        render_summary(&mut buf, &summary).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains("fallback"));
        assert!(s.contains("  row 4 (broken.zip): bad"));
    }
}
