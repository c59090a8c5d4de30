use crate::images::ImageError;
use crate::keyboard::Key;
use crate::models::book::{BookData, Page};
use crate::router::Route;
use log::{debug, warn};
use std::sync::Arc;

/// Reads a page segment the way the address bar is read: leading
/// whitespace, an optional sign, then as many digits as there are.
/// Anything without digits, or no segment at all, is page 0.
pub fn parse_page(segment: Option<&str>) -> i64 {
    let Some(segment) = segment else {
        return 0;
    };
    let s = segment.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return 0;
    }
    match rest[..digits].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

/// Clamps a requested page into `0..=page_count - 1`.
pub fn resolve_index(requested: i64, page_count: usize) -> usize {
    let last = page_count.saturating_sub(1);
    if requested <= 0 {
        0
    } else {
        usize::try_from(requested).map_or(last, |r| r.min(last))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Previous page, or home from the cover.
    Previous,
    /// Next page, or home from the last page ("Finish").
    Next,
    /// Next page if there is one. Used by the arrow key and touch area.
    Advance,
    Cover,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Cover,
    Middle,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    /// The image failed to load. Counts as ready so the reader can move on.
    Broken,
}

/// Preload of one page image, tagged with the navigator generation that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    generation: u64,
    index: usize,
    image: String,
}

impl ImageRequest {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A new page is current; its image must be preloaded.
    Preload(ImageRequest),
    Unchanged,
    /// The requested page has no image; go to this path instead.
    Redirect(String),
}

#[derive(Debug)]
pub struct Navigator {
    book: Arc<BookData>,
    index: Option<usize>,
    readiness: Readiness,
    generation: u64,
}

impl Navigator {
    pub fn new(book: Arc<BookData>) -> Self {
        Self::starting_at(book, 0)
    }

    /// A navigator whose preloads are numbered after `generation`, so that
    /// requests issued by an earlier navigator never match this one.
    pub fn starting_at(book: Arc<BookData>, generation: u64) -> Self {
        Navigator {
            book,
            index: None,
            readiness: Readiness::Loading,
            generation,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn book(&self) -> &BookData {
        &self.book
    }

    pub fn book_key(&self) -> &str {
        &self.book.book_key
    }

    pub fn index(&self) -> usize {
        self.index.unwrap_or(0)
    }

    pub fn last_index(&self) -> usize {
        self.book.last_index()
    }

    pub fn page(&self) -> Option<&Page> {
        self.book.page(self.index())
    }

    pub fn position(&self) -> Position {
        let index = self.index();
        if index >= self.last_index() {
            Position::Last
        } else if index == 0 {
            Position::Cover
        } else {
            Position::Middle
        }
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn image_ready(&self) -> bool {
        matches!(self.readiness, Readiness::Ready | Readiness::Broken)
    }

    /// Resolves the page segment of the current location.
    pub fn sync(&mut self, segment: Option<&str>) -> Resolution {
        let index = resolve_index(parse_page(segment), self.book.len());
        if !self.book.page(index).map_or(false, Page::has_image) {
            warn!("Page {} of {} has no image", index, self.book.book_key);
            return Resolution::Redirect(Route::cover(&self.book.book_key).to_string());
        }
        if self.index == Some(index) {
            return Resolution::Unchanged;
        }

        self.index = Some(index);
        self.generation += 1;
        self.readiness = Readiness::Loading;
        debug!("Showing page {} of {}", index, self.book.book_key);

        Resolution::Preload(ImageRequest {
            generation: self.generation,
            index,
            image: self.book.pages[index].image.clone(),
        })
    }

    /// Records the outcome of a preload. Returns false if the page has
    /// changed since the request was issued.
    pub fn image_settled(&mut self, request: &ImageRequest, result: Result<(), ImageError>) -> bool {
        if request.generation != self.generation {
            debug!("Ignoring preload of {} for an earlier page", request.image);
            return false;
        }
        self.readiness = match result {
            Ok(()) => Readiness::Ready,
            Err(e) => {
                warn!("{}", e);
                Readiness::Broken
            }
        };
        true
    }

    /// Where `intent` leads from the current page, if anywhere.
    pub fn target(&self, intent: Intent) -> Option<String> {
        let index = self.index();
        let last = self.last_index();
        let key = self.book_key();
        match intent {
            Intent::Previous if index > 0 => Some(Route::page(key, index - 1).to_string()),
            Intent::Previous => Some(Route::Home.to_string()),
            Intent::Next if index < last => Some(Route::page(key, index + 1).to_string()),
            Intent::Next => Some(Route::Home.to_string()),
            Intent::Advance if index < last => Some(Route::page(key, index + 1).to_string()),
            Intent::Advance => None,
            Intent::Cover if index > 0 => Some(Route::cover(key).to_string()),
            Intent::Cover => None,
            Intent::Home => Some(Route::Home.to_string()),
        }
    }

    /// A button press. The next/finish button is inert until the image is ready.
    pub fn press(&self, intent: Intent) -> Option<String> {
        if intent == Intent::Next && !self.image_ready() {
            debug!("Next is disabled while page {} loads", self.index());
            return None;
        }
        self.target(intent)
    }

    pub fn on_key(&self, key: &Key) -> Option<String> {
        match key {
            Key::ArrowLeft => self.target(Intent::Previous),
            Key::ArrowRight => self.target(Intent::Advance),
            Key::Other(_) => None,
        }
    }
}
