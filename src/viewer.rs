//! The reader session: one location history driving the loader and the
//! navigator. All state changes go through the history; the page shown is
//! always derived from its current entry.
//!
//! The viewer does no I/O itself. Methods return [`Effect`]s for the caller
//! to perform, and the results come back as [`Event`]s.

use crate::configuration::BookEntry;
use crate::history::History;
use crate::images::ImageError;
use crate::keyboard::{Key, KeyBinding, KeyboardHub};
use crate::loader::{BookLoader, LoadError, LoadTicket};
use crate::models::book::BookData;
use crate::navigator::{ImageRequest, Intent, Navigator, Resolution};
use crate::render;
use crate::router::{Registry, Route, RouteError};
use log::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Key(Key),
    Press(Intent),
    Back,
    Forward,
    Go(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(LoadTicket),
    Preload(ImageRequest),
}

#[derive(Debug)]
pub enum Event {
    Fetched(LoadTicket, Result<BookData, LoadError>),
    ImageSettled(ImageRequest, Result<(), ImageError>),
}

pub struct Viewer {
    registry: Registry,
    history: History,
    loader: BookLoader,
    navigator: Option<Navigator>,
    keyboard: KeyboardHub,
    binding: Option<KeyBinding>,
    route_error: Option<RouteError>,
    /// Last preload generation handed out by any navigator.
    image_generation: u64,
}

impl Viewer {
    pub fn new(registry: Registry, start: &str) -> Self {
        Viewer {
            registry,
            history: History::new(start),
            loader: BookLoader::new(),
            navigator: None,
            keyboard: KeyboardHub::new(),
            binding: None,
            route_error: None,
            image_generation: 0,
        }
    }

    pub fn location(&self) -> &str {
        self.history.current()
    }

    pub fn navigator(&self) -> Option<&Navigator> {
        self.navigator.as_ref()
    }

    pub fn loader(&self) -> &BookLoader {
        &self.loader
    }

    pub fn keyboard(&self) -> &KeyboardHub {
        &self.keyboard
    }

    /// Effects needed to show the starting location.
    pub fn start(&mut self) -> Vec<Effect> {
        self.sync()
    }

    pub fn handle(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::Key(key) => {
                if !self.keyboard.dispatch(&key) {
                    return Vec::new();
                }
                match self.navigator.as_ref().and_then(|nav| nav.on_key(&key)) {
                    Some(target) => self.push(target),
                    None => Vec::new(),
                }
            }
            Command::Press(intent) => {
                let target = match &self.navigator {
                    Some(nav) => nav.press(intent),
                    None if intent == Intent::Home => Some(Route::Home.to_string()),
                    None => None,
                };
                match target {
                    Some(target) => self.push(target),
                    None => Vec::new(),
                }
            }
            Command::Back => {
                if self.history.back() {
                    self.sync()
                } else {
                    Vec::new()
                }
            }
            Command::Forward => {
                if self.history.forward() {
                    self.sync()
                } else {
                    Vec::new()
                }
            }
            Command::Go(path) => self.push(path),
        }
    }

    pub fn on_event(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Fetched(ticket, result) => {
                if self.loader.complete(ticket, result) {
                    self.sync()
                } else {
                    Vec::new()
                }
            }
            Event::ImageSettled(request, result) => {
                if let Some(nav) = self.navigator.as_mut() {
                    nav.image_settled(&request, result);
                }
                Vec::new()
            }
        }
    }

    pub fn screen(&self) -> String {
        if let Some(e) = &self.route_error {
            return render::not_found(self.location(), &e.to_string());
        }
        let Ok(Route::Book { book_key, .. }) = self.location().parse::<Route>() else {
            return render::home(&self.registry);
        };

        let state = self.loader.state();
        if state.loading {
            return render::loading();
        }
        if let Some(message) = &state.error {
            return render::error(&self.title(&book_key), message);
        }
        match &self.navigator {
            Some(nav) => render::page(nav),
            None => render::error(&self.title(&book_key), "The book's cover page has no image"),
        }
    }

    /// Registry title of a book, falling back to its data-file name.
    fn title(&self, book_key: &str) -> String {
        match self.registry.get(book_key) {
            Ok(entry) => entry.title.clone(),
            Err(_) => self.loader.source_id().unwrap_or(book_key).to_string(),
        }
    }

    fn push(&mut self, path: String) -> Vec<Effect> {
        self.history.push(path);
        self.sync()
    }

    fn unmount(&mut self) {
        self.binding = None;
        self.navigator = None;
        self.loader.reset();
    }

    fn sync(&mut self) -> Vec<Effect> {
        self.route_error = None;
        let route = match self.location().parse::<Route>() {
            Ok(route) => route,
            Err(e) => {
                self.unmount();
                self.route_error = Some(e);
                return Vec::new();
            }
        };

        match route {
            Route::Home => {
                self.unmount();
                Vec::new()
            }
            Route::Book { book_key, page } => {
                let entry = match self.registry.get(&book_key) {
                    Ok(entry) => entry.clone(),
                    Err(e) => {
                        self.unmount();
                        self.route_error = Some(e);
                        return Vec::new();
                    }
                };
                self.show(&entry, page.as_deref())
            }
        }
    }

    fn show(&mut self, entry: &BookEntry, page: Option<&str>) -> Vec<Effect> {
        let source_id = entry.source_id();
        if let Some(ticket) = self.loader.begin(&source_id) {
            self.binding = None;
            self.navigator = None;
            return vec![Effect::Fetch(ticket)];
        }
        let Some(book) = self.loader.state().data.clone() else {
            return Vec::new();
        };

        if self
            .navigator
            .as_ref()
            .map_or(true, |nav| nav.book_key() != book.book_key)
        {
            self.navigator = Some(Navigator::starting_at(book, self.image_generation));
        }
        let Some(nav) = self.navigator.as_mut() else {
            return Vec::new();
        };
        match nav.sync(page) {
            Resolution::Preload(request) => {
                self.image_generation = request.generation();
                // Replacing the binding drops the previous page's listener.
                self.binding = Some(self.keyboard.attach());
                vec![Effect::Preload(request)]
            }
            Resolution::Unchanged => Vec::new(),
            Resolution::Redirect(target) => {
                if target == self.location() {
                    error!("Cover of {} has no image, nothing to show", entry.key);
                    self.binding = None;
                    self.navigator = None;
                    return Vec::new();
                }
                debug!("Redirecting {} to {}", self.location(), target);
                self.push(target)
            }
        }
    }
}
