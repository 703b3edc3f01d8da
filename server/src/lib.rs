use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subsearch_core::{preview, QueryOutcome, SearchConfig, Session};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Ok,
    EmptyQuery,
    EmptyCorpus,
    NoMatches,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub status: SearchStatus,
    pub took_s: f64,
    pub corpus_size: usize,
    pub message: Option<String>,
    pub results: Vec<SearchResult>,
}

#[derive(Serialize)]
pub struct SearchResult {
    pub id: String,
    pub row_id: i64,
    pub file_name: String,
    pub score: f64,
    pub preview: String,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub store_path: String,
    pub table: String,
    pub used_fallback: bool,
    pub rows_total: usize,
    pub extracted: usize,
    pub corpus_size: usize,
    pub retention_fraction: f64,
    pub skipped: Vec<String>,
    pub load_error: Option<String>,
}

/// The current session plus the error that left it empty, if any.
pub struct Loaded {
    pub session: Arc<Session>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SearchConfig>,
    pub loaded: Arc<RwLock<Loaded>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(config: SearchConfig, loaded: Loaded, admin_token: Option<String>) -> Self {
        Self { config: Arc::new(config), loaded: Arc::new(RwLock::new(loaded)), admin_token }
    }

    fn session(&self) -> Arc<Session> { self.loaded.read().session.clone() }
}

/// Load a session off the async runtime. A failed load yields an empty
/// session and the error text instead of an `Err`, so the server can still
/// answer and report it.
pub async fn load_session(config: SearchConfig) -> Loaded {
    let store = config.store_path.display().to_string();
    let joined = tokio::task::spawn_blocking(move || Session::load(&config, &mut |_| {})).await;
    let result = match joined {
        Ok(res) => res.map_err(|e| e.to_string()),
        Err(e) => Err(format!("load task failed: {e}")),
    };
    match result {
        Ok(session) => {
            if session.is_empty() {
                tracing::error!(%store, "no subtitles loaded from store");
            } else {
                tracing::info!(%store, docs = session.len(), "subtitle session ready");
            }
            Loaded { session: Arc::new(session), error: None }
        }
        Err(error) => {
            tracing::error!(%store, %error, "failed to load subtitle store");
            Loaded { session: Arc::new(Session::default()), error: Some(error) }
        }
    }
}

pub async fn build_app(config: SearchConfig) -> Result<Router> {
    config.validate()?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let loaded = load_session(config.clone()).await;
    Ok(router(AppState::new(config, loaded, admin_token)))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/", get(index_page))
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:row_id/*file_name", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/reload", post(reload_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn index_page() -> Html<&'static str> { Html(INDEX_HTML) }

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let (session, load_error) = {
        let loaded = state.loaded.read();
        (loaded.session.clone(), loaded.error.clone())
    };
    let k = params.k.unwrap_or(state.config.top_k).max(1).min(MAX_K);
    let outcome = session.search(&params.q, k);

    let (status, message, results) = match outcome {
        QueryOutcome::EmptyQuery => (SearchStatus::EmptyQuery, Some("please enter a search query".to_string()), vec![]),
        QueryOutcome::EmptyCorpus => {
            let msg = load_error.unwrap_or_else(|| "no subtitles loaded".to_string());
            (SearchStatus::EmptyCorpus, Some(msg), vec![])
        }
        QueryOutcome::NoMatches => (
            SearchStatus::NoMatches,
            Some(format!(
                "no matches found for '{}'; try a different query or check if the subtitle is in the sampled data",
                params.q
            )),
            vec![],
        ),
        QueryOutcome::Hits(hits) => {
            let results = hits
                .into_iter()
                .map(|h| SearchResult {
                    id: h.key.to_string(),
                    row_id: h.key.row_id,
                    preview: preview(&h.text, state.config.preview_chars),
                    file_name: h.key.file_name,
                    score: h.score,
                })
                .collect();
            (SearchStatus::Ok, None, results)
        }
    };

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, ?status, took_s = elapsed.as_secs_f64(), "search");
    Json(SearchResponse {
        query: params.q,
        status,
        took_s: elapsed.as_secs_f64(),
        corpus_size: session.len(),
        message,
        results,
    })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path((row_id, file_name)): Path<(i64, String)>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let session = state.session();
    match session.get(row_id, &file_name) {
        Some(doc) => Ok(Json(serde_json::json!({
            "id": doc.key.to_string(),
            "row_id": doc.key.row_id,
            "file_name": doc.key.file_name,
            "tokens": doc.vector.total(),
            "text": doc.text,
        }))),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))),
    }
}

fn stats(state: &AppState) -> StatsResponse {
    let loaded = state.loaded.read();
    let summary = loaded.session.summary();
    StatsResponse {
        store_path: state.config.store_path.display().to_string(),
        table: summary.table.clone(),
        used_fallback: summary.used_fallback,
        rows_total: summary.rows_total,
        extracted: summary.extracted,
        corpus_size: loaded.session.len(),
        retention_fraction: state.config.retention_fraction,
        skipped: summary.diagnostics.iter().map(|d| d.to_string()).collect(),
        load_error: loaded.error.clone(),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> { Json(stats(&state)) }

// --- Admin endpoints ---
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let fresh = load_session((*state.config).clone()).await;
    *state.loaded.write() = fresh;
    Ok(Json(stats(&state)))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Subtitle Search</title></head>
<body>
<h1>Subtitle Search</h1>
<form id="search">
  <input id="q" name="q" size="60" value="What a funny day">
  <button type="submit">Search</button>
</form>
<div id="results"></div>
<script>
const form = document.getElementById('search');
const out = document.getElementById('results');
form.addEventListener('submit', async (ev) => {
  ev.preventDefault();
  const q = document.getElementById('q').value;
  const resp = await fetch('/search?q=' + encodeURIComponent(q));
  const data = await resp.json();
  out.replaceChildren();
  if (data.status !== 'ok') {
    const p = document.createElement('p');
    p.textContent = data.message;
    out.appendChild(p);
    return;
  }
  for (const r of data.results) {
    const div = document.createElement('div');
    const head = document.createElement('p');
    head.textContent = r.id + ' (similarity ' + r.score.toFixed(4) + ')';
    const body = document.createElement('p');
    body.textContent = r.preview;
    div.append(head, body, document.createElement('hr'));
    out.appendChild(div);
  }
});
</script>
</body>
</html>
"#;
