use crate::navigator::{Intent, Navigator, Position, Readiness};
use crate::router::{Registry, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub aria_label: &'static str,
    pub intent: Intent,
    pub enabled: bool,
}

impl Button {
    fn new(label: &'static str, aria_label: &'static str, intent: Intent) -> Self {
        Button {
            label,
            aria_label,
            intent,
            enabled: true,
        }
    }
}

/// The navigation bar above a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub left: Button,
    pub cover: Option<Button>,
    pub right: Button,
}

impl Controls {
    pub fn for_page(nav: &Navigator) -> Self {
        let on_cover = nav.index() == 0;
        let left = if on_cover {
            Button::new("Home", "Back to home", Intent::Previous)
        } else {
            Button::new("Previous", "Previous page", Intent::Previous)
        };
        let cover = (!on_cover).then(|| Button::new("Cover", "Go to cover", Intent::Cover));
        let mut right = if nav.position() == Position::Last {
            Button::new("Finish", "Back to home", Intent::Next)
        } else {
            Button::new("Next", "Next page", Intent::Next)
        };
        right.enabled = nav.image_ready();

        Controls { left, cover, right }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        std::iter::once(&self.left)
            .chain(self.cover.as_ref())
            .chain(std::iter::once(&self.right))
    }
}

pub fn page(nav: &Navigator) -> String {
    let bar: Vec<String> = Controls::for_page(nav)
        .buttons()
        .map(|b| {
            if b.enabled {
                format!("[ {} ]", b.label)
            } else {
                format!("( {} )", b.label)
            }
        })
        .collect();
    let mut out = format!("{}\n", bar.join("  "));

    if let Some(page) = nav.page() {
        let status = match nav.readiness() {
            Readiness::Loading => " (loading)",
            Readiness::Ready => "",
            Readiness::Broken => " (image unavailable)",
        };
        out += &format!("<Page {}> {}{}\n", nav.index(), page.image, status);
        if !page.text.is_empty() {
            out += &format!("{}\n", page.text);
        }
    }
    out
}

pub fn loading() -> String {
    "Loading...\n".to_string()
}

/// Shown when a book cannot be displayed.
pub fn error(book_title: &str, message: &str) -> String {
    format!(
        "Oops! Book Not Found\n\
         We're having trouble loading the {} book. The story file might be missing or temporarily unavailable.\n\
         Technical Details: {}\n\
         Back to Home: {}\n",
        book_title,
        message,
        Route::Home
    )
}

pub fn home(registry: &Registry) -> String {
    registry
        .books()
        .iter()
        .map(|book| format!("  {}  {}\n", book.title, Route::cover(&book.key)))
        .fold("Books\n".to_string(), |out, line| out + &line)
}

pub fn not_found(path: &str, reason: &str) -> String {
    format!("Nothing here at {} ({})\nBack to Home: {}\n", path, reason, Route::Home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::BookEntry;
    use crate::models::book::{BookData, Page};
    use crate::navigator::Resolution;
    use std::sync::Arc;

    fn navigator(count: usize, segment: &str) -> Navigator {
        let pages = (0..count)
            .map(|i| Page::new(format!("/books/a/{}.jpg", i), if i == 1 { "" } else { "Once" }))
            .collect();
        let mut nav = Navigator::new(Arc::new(BookData {
            book_key: "a".into(),
            title: "A".into(),
            pages,
        }));
        if let Resolution::Preload(request) = nav.sync(Some(segment)) {
            nav.image_settled(&request, Ok(()));
        }
        nav
    }

    fn labels(controls: &Controls) -> Vec<&'static str> {
        controls.buttons().map(|b| b.label).collect()
    }

    #[test]
    fn cover_controls() {
        let controls = Controls::for_page(&navigator(3, "0"));
        assert_eq!(vec!["Home", "Next"], labels(&controls));
        assert_eq!("Back to home", controls.left.aria_label);
    }

    #[test]
    fn middle_and_last_controls() {
        assert_eq!(
            vec!["Previous", "Cover", "Next"],
            labels(&Controls::for_page(&navigator(3, "1")))
        );
        assert_eq!(
            vec!["Previous", "Cover", "Finish"],
            labels(&Controls::for_page(&navigator(3, "2")))
        );
    }

    #[test]
    fn next_disabled_while_loading() {
        let mut nav = navigator(3, "0");
        nav.sync(Some("1"));
        let controls = Controls::for_page(&nav);
        assert!(!controls.right.enabled);
        assert!(controls.left.enabled);
        assert!(page(&nav).contains("( Next )"));
        assert!(page(&nav).contains("(loading)"));
    }

    #[test]
    fn empty_caption_is_not_rendered() {
        let shown = page(&navigator(3, "1"));
        assert_eq!(
            "[ Previous ]  [ Cover ]  [ Next ]\n<Page 1> /books/a/1.jpg\n",
            shown
        );
        assert!(page(&navigator(3, "2")).ends_with("Once\n"));
    }

    #[test]
    fn error_view_names_book() {
        let shown = error("Super Bowie", "Failed to load book data: 500 - Internal Server Error");
        assert!(shown.contains("loading the Super Bowie book"));
        assert!(shown.contains("500 - Internal Server Error"));
        assert!(shown.contains("Back to Home: /"));
        assert!(shown.starts_with("Oops! Book Not Found\nWe're having trouble"));
        assert_eq!(4, shown.lines().count());
    }

    #[test]
    fn home_lists_books() {
        let registry = Registry::new(vec![BookEntry {
            key: "super-bowie".into(),
            title: "Super Bowie".into(),
            source: None,
        }]);
        assert_eq!("Books\n  Super Bowie  /super-bowie\n", home(&registry));
    }
}
