use crate::models::book::BookData;
use thiserror::Error;

const BOOKS_ROOT: &str = "/books/";
const MAX_TITLE_CHARS: usize = 100;
const MAX_TEXT_CHARS: usize = 1000;

/// A content problem in a book file. These are conventions for how books are
/// organised, not conditions the reader needs in order to show a book.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bookKey is blank")]
    BlankKey,
    #[error("title is blank")]
    BlankTitle,
    #[error("title is {0} characters long, expected fewer than 100")]
    LongTitle(usize),
    #[error("book has no pages")]
    NoPages,
    #[error("bookKey \"{key}\" does not match file name \"{expected}\"")]
    KeyMismatch { key: String, expected: String },
    #[error("page {0} has no image")]
    MissingImage(usize),
    #[error("page {index} image path {image} should start with /books/")]
    OutsideBooks { index: usize, image: String },
    #[error("page {index} image path {image} should contain book key \"{key}\"")]
    ForeignImage {
        index: usize,
        image: String,
        key: String,
    },
    #[error("page {index} text is {chars} characters long, expected fewer than 1000")]
    LongText { index: usize, chars: usize },
    #[error("first page image {0} does not look like a cover")]
    NoCover(String),
}

/// The book key a data file is expected to declare, e.g. `super-bowie` for
/// `super-bowie.yaml`.
pub fn expected_key(source_id: &str) -> &str {
    let name = source_id.rsplit('/').next().unwrap_or(source_id);
    [".yaml", ".yml", ".json", ".toml"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

pub fn validate(book: &BookData, source_id: &str) -> Vec<ValidationError> {
    let mut problems = Vec::new();
    let key = book.book_key.as_str();

    if key.trim().is_empty() {
        problems.push(ValidationError::BlankKey);
    }
    let expected = expected_key(source_id);
    if key != expected {
        problems.push(ValidationError::KeyMismatch {
            key: key.to_string(),
            expected: expected.to_string(),
        });
    }

    let title_chars = book.title.chars().count();
    if book.title.trim().is_empty() {
        problems.push(ValidationError::BlankTitle);
    } else if title_chars >= MAX_TITLE_CHARS {
        problems.push(ValidationError::LongTitle(title_chars));
    }

    let Some(cover) = book.pages.first() else {
        problems.push(ValidationError::NoPages);
        return problems;
    };

    for (index, page) in book.pages.iter().enumerate() {
        if !page.has_image() {
            problems.push(ValidationError::MissingImage(index));
            continue;
        }
        if !page.image.starts_with(BOOKS_ROOT) {
            problems.push(ValidationError::OutsideBooks {
                index,
                image: page.image.clone(),
            });
        }
        if !key.is_empty() && !page.image.contains(key) {
            problems.push(ValidationError::ForeignImage {
                index,
                image: page.image.clone(),
                key: key.to_string(),
            });
        }
        if !page.text.trim().is_empty() {
            let chars = page.text.chars().count();
            if chars >= MAX_TEXT_CHARS {
                problems.push(ValidationError::LongText { index, chars });
            }
        }
    }

    if cover.has_image() && !looks_like_cover(&cover.image) {
        problems.push(ValidationError::NoCover(cover.image.clone()));
    }
    problems
}

fn looks_like_cover(image: &str) -> bool {
    image.to_lowercase().contains("cover") || image.contains('0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::Page;

    fn book(pages: Vec<Page>) -> BookData {
        BookData {
            book_key: "super-bowie".into(),
            title: "Super Bowie".into(),
            pages,
        }
    }

    #[test]
    fn expected_keys() {
        assert_eq!("super-bowie", expected_key("super-bowie.yaml"));
        assert_eq!("super-bowie", expected_key("nested/super-bowie.yml"));
        assert_eq!("ziggy", expected_key("ziggy.json"));
        assert_eq!("plain", expected_key("plain"));
    }

    #[test]
    fn valid_book() {
        let book = book(vec![
            Page::new("/books/super-bowie/0-cover.jpg", "Super Bowie"),
            Page::new("/books/super-bowie/1.jpg", ""),
        ]);
        assert_eq!(Vec::<ValidationError>::new(), validate(&book, "super-bowie.yaml"));
    }

    #[test]
    fn image_conventions() {
        let book = book(vec![
            Page::new("/books/super-bowie/Cover.JPG", ""),
            Page::new("/images/super-bowie/1.jpg", ""),
            Page::new("/books/ziggy/2.jpg", ""),
            Page::new("", "words"),
        ]);
        assert_eq!(
            vec![
                ValidationError::OutsideBooks {
                    index: 1,
                    image: "/images/super-bowie/1.jpg".into()
                },
                ValidationError::ForeignImage {
                    index: 2,
                    image: "/books/ziggy/2.jpg".into(),
                    key: "super-bowie".into()
                },
                ValidationError::MissingImage(3),
            ],
            validate(&book, "super-bowie.yaml")
        );
    }

    #[test]
    fn key_title_and_text() {
        let mut data = book(vec![Page::new("/books/super-bowie/1.jpg", "x".repeat(1000))]);
        data.title = "t".repeat(100);
        let problems = validate(&data, "bowie.yaml");

        assert_eq!(
            vec![
                ValidationError::KeyMismatch {
                    key: "super-bowie".into(),
                    expected: "bowie".into()
                },
                ValidationError::LongTitle(100),
                ValidationError::LongText {
                    index: 0,
                    chars: 1000
                },
                ValidationError::NoCover("/books/super-bowie/1.jpg".into()),
            ],
            problems
        );
        assert_eq!(
            "page 0 text is 1000 characters long, expected fewer than 1000",
            problems[2].to_string()
        );
    }

    #[test]
    fn no_pages() {
        assert_eq!(
            vec![ValidationError::NoPages],
            validate(&book(Vec::new()), "super-bowie.yaml")
        );
    }
}
