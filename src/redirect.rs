use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use anyhow::Context as _;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use regex::Regex;
use url::Url;

use crate::fetcher::Fetcher;

static URL_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!-- (.*?) -->").expect("url comment regex"));

/// Where previously rendered cards are read back from.
#[derive(Clone)]
pub enum DocumentSource {
    Dir(PathBuf),
    /// Public bucket or any static host serving `<base>/<name>`.
    Http { fetcher: Fetcher, base_url: Url },
}

impl DocumentSource {
    pub async fn get(&self, name: &str) -> anyhow::Result<Option<String>> {
        match self {
            DocumentSource::Dir(dir) => {
                let path = dir.join(name);
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => Ok(Some(text)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
                }
            }
            DocumentSource::Http { fetcher, base_url } => {
                let url = document_url(base_url, name)?;
                fetcher.get_text_if_ok(url).await
            }
        }
    }
}

fn document_url(base_url: &Url, name: &str) -> anyhow::Result<Url> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    base.join(name)
        .with_context(|| format!("join {} onto {}", name, base_url))
}

/// Pulls the discussion link out of a rendered card, undoing the `\` escapes
/// written by `card::url_comment`.
pub fn extract_discussion_url(svg: &str) -> Option<String> {
    let raw = URL_COMMENT.captures(svg)?.get(1)?.as_str();
    let mut url = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => url.extend(chars.next()),
            c => url.push(c),
        }
    }
    Some(url)
}

/// `discussion_3` -> `3`.
pub fn parse_document_id(segment: &str) -> Option<u32> {
    let digits = segment.strip_prefix("discussion_")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    MissingDocument,
    MissingLink,
}

pub struct RedirectState {
    pub source: DocumentSource,
    pub allowed_prefix: Option<String>,
}

impl RedirectState {
    pub async fn resolve(&self, id: u32) -> Resolution {
        let name = format!("discussion_{id}.svg");
        let svg = match self.source.get(&name).await {
            Ok(Some(svg)) => svg,
            Ok(None) => return Resolution::MissingDocument,
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(%name, %reason, "document fetch failed");
                return Resolution::MissingDocument;
            }
        };

        match extract_discussion_url(&svg) {
            Some(url) if self.is_allowed(&url) => Resolution::Found(url),
            Some(url) => {
                tracing::warn!(%name, %url, "embedded url outside allowed prefix");
                Resolution::MissingLink
            }
            None => Resolution::MissingLink,
        }
    }

    fn is_allowed(&self, url: &str) -> bool {
        self.allowed_prefix
            .as_deref()
            .is_none_or(|prefix| url.starts_with(prefix))
    }
}

impl IntoResponse for Resolution {
    fn into_response(self) -> Response {
        match self {
            Resolution::Found(url) => (StatusCode::FOUND, [(header::LOCATION, url)]).into_response(),
            Resolution::MissingDocument => (StatusCode::NOT_FOUND, "SVG not found.").into_response(),
            Resolution::MissingLink => {
                (StatusCode::NOT_FOUND, "Discussion link not found in SVG.").into_response()
            }
        }
    }
}

pub fn router(state: RedirectState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/{document}", get(redirect_to_discussion))
        .with_state(Arc::new(state))
}

async fn home() -> &'static str {
    "Hello! This is the discussion card redirect service."
}

async fn redirect_to_discussion(
    State(state): State<Arc<RedirectState>>,
    Path(document): Path<String>,
) -> Response {
    let Some(id) = parse_document_id(&document) else {
        return (StatusCode::NOT_FOUND, "Not found.").into_response();
    };
    let resolution = state.resolve(id).await;
    tracing::info!(id, ?resolution, "redirect lookup");
    resolution.into_response()
}

pub async fn serve(listen: &str, state: RedirectState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("bind {listen}"))?;
    tracing::info!(%listen, "redirect service listening");
    axum::serve(listener, router(state))
        .await
        .context("serve redirect service")
}
