use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Path of the page illustration, e.g. `/books/super-bowie/1.jpg`.
    #[serde(default)]
    pub image: String,
    /// Caption shown under the illustration; empty for image-only pages.
    #[serde(default)]
    pub text: String,
}

impl Page {
    pub fn new(image: impl Into<String>, text: impl Into<String>) -> Self {
        Page {
            image: image.into(),
            text: text.into(),
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image.trim().is_empty()
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookData {
    // config folds keys to lowercase while merging sources
    #[serde(rename = "bookKey", alias = "bookkey")]
    pub book_key: String,
    pub title: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Format(#[from] ConfigError),
    #[error("Book data has an empty {0}")]
    Empty(&'static str),
}

impl BookData {
    /// Parses a book document, checking the invariants every view relies on:
    /// a non-empty key and title, and at least one page.
    pub fn parse(text: &str, format: FileFormat) -> Result<Self, ParseError> {
        let book: BookData = Config::builder()
            .add_source(File::from_str(text, format))
            .build()?
            .try_deserialize()?;

        if book.book_key.trim().is_empty() {
            return Err(ParseError::Empty("bookKey"));
        }
        if book.title.trim().is_empty() {
            return Err(ParseError::Empty("title"));
        }
        if book.pages.is_empty() {
            return Err(ParseError::Empty("page list"));
        }
        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }
}

/// Picks the document format from a data-file name, defaulting to YAML.
pub fn format_for(source_id: &str) -> FileFormat {
    let lower = source_id.to_ascii_lowercase();
    if lower.ends_with(".json") {
        FileFormat::Json
    } else if lower.ends_with(".toml") {
        FileFormat::Toml
    } else {
        FileFormat::Yaml
    }
}
