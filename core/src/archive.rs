//! Reads subtitle rows out of a SQLite store.
//!
//! Each row is `(num, name, content)`. A row named `*.srt` is a raw subtitle,
//! a row named `*.nfo` is release info and ignored, anything else is expected
//! to be a ZIP archive whose `*.srt` members are extracted one by one.
//! Row-level failures are collected as [`Diagnostic`]s; only store-level
//! failures abort the load.

use crate::error::LoadError;
use crate::index::{Corpus, DocKey};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use zip::ZipArchive;

pub const SUBTITLE_SUFFIX: &str = ".srt";
pub const INFO_SUFFIX: &str = ".nfo";

const PROGRESS_LOG_EVERY: usize = 100;

/// Largest decompressed size accepted for a single archive member.
pub const MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

/// One row as read from the store, before interpretation.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub content: Option<Vec<u8>>,
}

impl RawRow {
    pub fn new(id: i64, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self { id: Some(id), name: Some(name.into()), content: Some(content.into()) }
    }

    fn from_values(id: Value, name: Value, content: Value) -> Self {
        let id = match id {
            Value::Integer(i) => Some(i),
            Value::Real(f) if f.fract() == 0.0 => Some(f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        };
        let name = match name {
            Value::Text(s) => Some(s),
            Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
            _ => None,
        };
        let content = match content {
            Value::Blob(b) => Some(b),
            Value::Text(s) => Some(s.into_bytes()),
            _ => None,
        };
        Self { id, name, content }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("not a readable ZIP archive: {0}")]
    BadArchive(String),
    #[error("failed to read archive entry '{entry}': {message}")]
    ArchiveEntry { entry: String, message: String },
    #[error("row has no content")]
    MissingContent,
    #[error("row has no file name")]
    MissingName,
    #[error("row id is not an integer")]
    InvalidId,
}

/// Result of interpreting a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Extracted(Vec<(DocKey, String)>),
    Ignored,
    Skipped(SkipReason),
}

/// A row that contributed nothing, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub row_id: Option<i64>,
    pub file_name: Option<String>,
    pub reason: SkipReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row_id {
            Some(id) => write!(f, "row {id}")?,
            None => write!(f, "row ?")?,
        }
        if let Some(name) = &self.file_name {
            write!(f, " ({name})")?;
        }
        write!(f, ": {}", self.reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 { 1.0 } else { self.processed as f64 / self.total as f64 }
    }
}

/// Everything a load produced, before sampling.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    pub table: String,
    pub used_fallback: bool,
    pub rows_total: usize,
    pub corpus: Corpus,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableChoice {
    pub name: String,
    pub fallback: bool,
}

fn has_suffix(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Decode UTF-8, dropping invalid byte sequences instead of failing.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

fn extract_archive(row_id: i64, blob: &[u8]) -> Result<Vec<(DocKey, String)>, SkipReason> {
    let mut archive = ZipArchive::new(Cursor::new(blob)).map_err(|e| SkipReason::BadArchive(e.to_string()))?;
    let members: Vec<String> = archive
        .file_names()
        .filter(|n| has_suffix(n, SUBTITLE_SUFFIX))
        .map(str::to_string)
        .collect();

    let mut entries = Vec::with_capacity(members.len());
    for member in members {
        let entry_err = |message: String| SkipReason::ArchiveEntry { entry: member.clone(), message };
        let mut file = archive.by_name(&member).map_err(|e| entry_err(e.to_string()))?;
        if file.is_dir() {
            continue;
        }
        // declared sizes come from the archive itself and cannot be trusted
        if file.size() > MAX_ENTRY_BYTES {
            return Err(entry_err(format!("declared size {} exceeds limit of {MAX_ENTRY_BYTES} bytes", file.size())));
        }
        let mut buf = Vec::with_capacity(file.size().min(blob.len() as u64) as usize);
        let read = file
            .by_ref()
            .take(MAX_ENTRY_BYTES + 1)
            .read_to_end(&mut buf)
            .map_err(|e| entry_err(e.to_string()))?;
        if read as u64 > MAX_ENTRY_BYTES {
            return Err(entry_err(format!("decompressed size exceeds limit of {MAX_ENTRY_BYTES} bytes")));
        }
        drop(file);
        entries.push((DocKey::new(row_id, member), decode_lossy(&buf)));
    }
    Ok(entries)
}

/// Interpret one row. A failing row yields no entries at all.
pub fn extract_row(row: &RawRow) -> RowOutcome {
    let Some(id) = row.id else { return RowOutcome::Skipped(SkipReason::InvalidId) };
    let Some(name) = row.name.as_deref() else { return RowOutcome::Skipped(SkipReason::MissingName) };
    if has_suffix(name, INFO_SUFFIX) {
        return RowOutcome::Ignored;
    }
    let Some(content) = row.content.as_deref() else { return RowOutcome::Skipped(SkipReason::MissingContent) };

    if has_suffix(name, SUBTITLE_SUFFIX) {
        RowOutcome::Extracted(vec![(DocKey::new(id, name), decode_lossy(content))])
    } else {
        match extract_archive(id, content) {
            Ok(entries) => RowOutcome::Extracted(entries),
            Err(reason) => RowOutcome::Skipped(reason),
        }
    }
}

/// Accumulates row outcomes into a corpus plus diagnostics.
#[derive(Default)]
struct Extractor {
    corpus: Corpus,
    diagnostics: Vec<Diagnostic>,
    processed: usize,
}

impl Extractor {
    fn push(&mut self, row: &RawRow, total: usize, progress: &mut dyn FnMut(Progress)) {
        match extract_row(row) {
            RowOutcome::Extracted(entries) => self.corpus.extend(entries),
            RowOutcome::Ignored => {}
            RowOutcome::Skipped(reason) => self.diagnostics.push(Diagnostic {
                row_id: row.id,
                file_name: row.name.clone(),
                reason,
            }),
        }
        self.processed += 1;
        let p = Progress { processed: self.processed, total: total.max(self.processed) };
        progress(p);
        if self.processed % PROGRESS_LOG_EVERY == 0 {
            info!(processed = p.processed, total = p.total, "extracting subtitles");
        }
    }

    fn finish(self) -> (Corpus, Vec<Diagnostic>) {
        if !self.diagnostics.is_empty() {
            warn!(skipped = self.diagnostics.len(), processed = self.processed, "rows skipped during extraction");
            for d in &self.diagnostics {
                warn!("{d}");
            }
        }
        info!(entries = self.corpus.len(), rows = self.processed, "extraction complete");
        (self.corpus, self.diagnostics)
    }
}

/// Extract a batch of in-memory rows.
pub fn extract_rows<I>(rows: I, total: usize, progress: &mut dyn FnMut(Progress)) -> (Corpus, Vec<Diagnostic>)
where
    I: IntoIterator<Item = RawRow>,
{
    let mut ex = Extractor::default();
    for row in rows {
        ex.push(&row, total, progress);
    }
    ex.finish()
}

/// Open the store read-only; a missing file is an error rather than a new database.
pub fn open_store(path: &Path) -> Result<Connection, LoadError> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .map_err(|source| LoadError::Connection { path: path.to_path_buf(), source })
}

pub fn list_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Prefer `preferred`, else fall back to the first table.
pub fn resolve_table(tables: &[String], preferred: &str) -> Option<TableChoice> {
    if tables.iter().any(|t| t == preferred) {
        return Some(TableChoice { name: preferred.to_string(), fallback: false });
    }
    tables.first().map(|t| TableChoice { name: t.clone(), fallback: true })
}

fn quote_ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }

/// Load every subtitle in the store at `path`.
pub fn load_store(path: &Path, preferred_table: &str, progress: &mut dyn FnMut(Progress)) -> Result<ExtractReport, LoadError> {
    let path_buf: PathBuf = path.to_path_buf();
    info!(path = %path.display(), "connecting to subtitle store");
    let conn = open_store(path)?;
    let tables = list_tables(&conn).map_err(|source| LoadError::Connection { path: path_buf.clone(), source })?;
    info!(?tables, "available tables");

    let choice = resolve_table(&tables, preferred_table).ok_or_else(|| LoadError::NoTables(path_buf.clone()))?;
    if choice.fallback {
        warn!(preferred = preferred_table, using = %choice.name, "preferred table not found, using first available table");
    }

    let query_err = |source: rusqlite::Error| LoadError::Query { table: choice.name.clone(), source };
    let quoted = quote_ident(&choice.name);
    let total: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {quoted}"), [], |r| r.get(0))
        .map_err(query_err)?;
    let total = total.max(0) as usize;
    info!(rows = total, table = %choice.name, "reading rows");

    let mut stmt = conn
        .prepare(&format!("SELECT num, name, content FROM {quoted}"))
        .map_err(query_err)?;
    let rows = stmt
        .query_map([], |row| Ok(RawRow::from_values(row.get(0)?, row.get(1)?, row.get(2)?)))
        .map_err(query_err)?;

    let mut ex = Extractor::default();
    for row in rows {
        let row = row.map_err(query_err)?;
        ex.push(&row, total, progress);
    }
    let rows_total = ex.processed;
    let (corpus, diagnostics) = ex.finish();

    Ok(ExtractReport { table: choice.name.clone(), used_fallback: choice.fallback, rows_total, corpus, diagnostics })
}
