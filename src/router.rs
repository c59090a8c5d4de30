use crate::configuration::BookEntry;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unsupported route {0}")]
    Unsupported(String),
    #[error("Unknown book {0}")]
    UnknownBook(String),
}

/// A location in the app, parsed from a path.
///
/// `/` is the home grid, `/<bookKey>` the cover of a book and
/// `/<bookKey>/<page>` a page. The page segment is kept raw; resolving it
/// against the book is the navigator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Book {
        book_key: String,
        page: Option<String>,
    },
}

impl Route {
    pub fn cover(book_key: &str) -> Self {
        Route::Book {
            book_key: book_key.to_string(),
            page: None,
        }
    }

    pub fn page(book_key: &str, index: usize) -> Self {
        Route::Book {
            book_key: book_key.to_string(),
            page: Some(index.to_string()),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Ok(Route::Home),
            [book_key] => Ok(Route::cover(book_key)),
            [book_key, page] => Ok(Route::Book {
                book_key: book_key.to_string(),
                page: Some(page.to_string()),
            }),
            _ => Err(RouteError::Unsupported(path.to_string())),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Book {
                book_key,
                page: None,
            } => write!(f, "/{}", book_key),
            Route::Book {
                book_key,
                page: Some(page),
            } => write!(f, "/{}/{}", book_key, page),
        }
    }
}

/// The static set of books the app knows about, in display order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    books: Vec<BookEntry>,
}

impl Registry {
    pub fn new(books: Vec<BookEntry>) -> Self {
        Registry { books }
    }

    pub fn books(&self) -> &[BookEntry] {
        &self.books
    }

    pub fn get(&self, book_key: &str) -> Result<&BookEntry, RouteError> {
        self.books
            .iter()
            .find(|b| b.key == book_key)
            .ok_or_else(|| RouteError::UnknownBook(book_key.to_string()))
    }
}
