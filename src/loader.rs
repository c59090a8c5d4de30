use crate::models::book::{format_for, BookData};
use log::{debug, info, warn};
use reqwest::StatusCode;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

const GENERIC_FAILURE: &str = "An error occurred loading the book";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Book file not found. The {source_id} file may be missing or moved.")]
    NotFound { source_id: String },
    #[error("Failed to load book data: {status} - {status_text}")]
    Status { status: u16, status_text: String },
    #[error("{}", .0.as_deref().unwrap_or(GENERIC_FAILURE))]
    Transport(Option<String>),
    #[error("{0}")]
    Parse(String),
}

impl LoadError {
    pub fn from_status(source_id: &str, status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            LoadError::NotFound {
                source_id: source_id.to_string(),
            }
        } else {
            LoadError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            }
        }
    }

    /// A transport failure; blank descriptions fall back to the generic message.
    pub fn transport(description: impl ToString) -> Self {
        let description = description.to_string();
        if description.trim().is_empty() {
            LoadError::Transport(None)
        } else {
            LoadError::Transport(Some(description))
        }
    }
}

/// Fetches the raw text of a book's data file.
pub trait BookSource {
    fn fetch(&self, source_id: &str) -> impl Future<Output = Result<String, LoadError>> + Send;
}

/// Serves data files from `<origin>/books/<source_id>` over HTTP.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: Url) -> Self {
        HttpSource {
            client: reqwest::Client::new(),
            base,
        }
    }
}

impl BookSource for HttpSource {
    async fn fetch(&self, source_id: &str) -> Result<String, LoadError> {
        let url = self
            .base
            .join(&format!("books/{}", source_id))
            .map_err(LoadError::transport)?;
        debug!("Fetching {}", url);

        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(LoadError::transport)?;
        let status = res.status();
        if !status.is_success() {
            return Err(LoadError::from_status(source_id, status));
        }
        res.text().await.map_err(LoadError::transport)
    }
}

/// Reads data files from `<root>/books/<source_id>`.
#[derive(Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSource { root: root.into() }
    }
}

impl BookSource for FileSource {
    async fn fetch(&self, source_id: &str) -> Result<String, LoadError> {
        let path = self.root.join("books").join(source_id);
        debug!("Reading {}", path.display());

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LoadError::NotFound {
                source_id: source_id.to_string(),
            }),
            Err(e) => Err(LoadError::transport(e)),
        }
    }
}

/// Fetches and parses one book. An empty identifier names no file at all.
pub async fn fetch_book<S: BookSource>(source: &S, source_id: &str) -> Result<BookData, LoadError> {
    if source_id.trim().is_empty() {
        return Err(LoadError::NotFound {
            source_id: source_id.to_string(),
        });
    }
    let text = source.fetch(source_id).await?;
    BookData::parse(&text, format_for(source_id)).map_err(|e| LoadError::Parse(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadState {
    pub data: Option<Arc<BookData>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl LoadState {
    fn pending() -> Self {
        LoadState {
            data: None,
            loading: true,
            error: None,
        }
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::pending()
    }
}

/// Identifies one load cycle; results carrying an older generation are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    source_id: String,
    generation: u64,
}

impl LoadTicket {
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Tracks `{data, loading, error}` for the book a view is showing.
#[derive(Debug, Default)]
pub struct BookLoader {
    source_id: Option<String>,
    generation: u64,
    state: LoadState,
}

impl BookLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the current book. Results for loads started before the reset
    /// are stale from here on.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.source_id = None;
        self.state = LoadState::pending();
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    /// Starts a load cycle when `source_id` differs from the current one.
    ///
    /// The state is reset before the ticket is handed out, so callers never
    /// observe the previous book's data once a new load is underway.
    pub fn begin(&mut self, source_id: &str) -> Option<LoadTicket> {
        if self.source_id.as_deref() == Some(source_id) {
            return None;
        }
        self.generation += 1;
        self.source_id = Some(source_id.to_string());
        self.state = LoadState::pending();
        info!("Loading book {}", source_id);

        Some(LoadTicket {
            source_id: source_id.to_string(),
            generation: self.generation,
        })
    }

    /// Applies a load result. Returns false if the ticket was superseded.
    pub fn complete(&mut self, ticket: LoadTicket, result: Result<BookData, LoadError>) -> bool {
        if ticket.generation != self.generation {
            warn!(
                "Dropping stale result for {} (generation {}, current {})",
                ticket.source_id, ticket.generation, self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(book) => {
                info!("Loaded \"{}\" with {} pages", book.title, book.len());
                LoadState {
                    data: Some(Arc::new(book)),
                    loading: false,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Unable to load {}: {}", ticket.source_id, e);
                LoadState {
                    data: None,
                    loading: false,
                    error: Some(e.to_string()),
                }
            }
        };
        true
    }

    /// Runs a whole load cycle inline. Repeated calls with the same
    /// identifier do not fetch again.
    pub async fn load<S: BookSource>(&mut self, source: &S, source_id: &str) -> &LoadState {
        if let Some(ticket) = self.begin(source_id) {
            let result = fetch_book(source, ticket.source_id()).await;
            self.complete(ticket, result);
        }
        &self.state
    }
}
