use anyhow::Context;
use config::{Config, ConfigError};
use resolve_path::PathResolveExt;
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub asset_origin: String,
    pub books: Vec<BookEntry>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BookEntry {
    pub key: String,
    pub title: String,
    pub source: Option<String>,
}

/// Where `/books/...` paths are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Remote(Url),
    Local(PathBuf),
}

impl Settings {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(config_file))
            .build()?;
        builder.try_deserialize()
    }

    pub fn origin(&self) -> anyhow::Result<Origin> {
        let origin = self.asset_origin.trim();
        if origin.starts_with("http://") || origin.starts_with("https://") {
            // Joining relative paths onto a base without a trailing slash drops its last segment
            let base = if origin.ends_with('/') {
                origin.to_string()
            } else {
                format!("{}/", origin)
            };
            let url = Url::parse(&base).with_context(|| format!("Invalid asset origin {}", origin))?;
            Ok(Origin::Remote(url))
        } else {
            Ok(Origin::Local(origin.resolve().into_owned()))
        }
    }
}

impl BookEntry {
    /// Name of the book's data file, `<key>.yaml` unless configured.
    pub fn source_id(&self) -> String {
        match &self.source {
            Some(source) => source.clone(),
            None => format!("{}.yaml", self.key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config() {
        let c = Settings::new("storybook.test.json").unwrap();

        assert_eq!("./public", c.asset_origin);

        let bowie = BookEntry {
            key: "super-bowie".into(),
            title: "Super Bowie".into(),
            source: None,
        };
        let dragon = BookEntry {
            key: "dragon-fighter".into(),
            title: "Dragon Fighter".into(),
            source: Some("dragon-fighter.json".into()),
        };
        assert_eq!(vec![bowie, dragon], c.books);
        assert_eq!("super-bowie.yaml", c.books[0].source_id());
        assert_eq!("dragon-fighter.json", c.books[1].source_id());
    }

    #[test]
    fn remote_origin_gets_trailing_slash() {
        let settings = Settings {
            asset_origin: "https://example.com/storybook".into(),
            books: Vec::new(),
        };
        let Origin::Remote(url) = settings.origin().unwrap() else {
            panic!("expected a remote origin");
        };
        assert_eq!("https://example.com/storybook/", url.as_str());
        assert_eq!(
            "https://example.com/storybook/books/a.yaml",
            url.join("books/a.yaml").unwrap().as_str()
        );
    }

    #[test]
    fn local_origin() {
        let settings = Settings {
            asset_origin: "./public".into(),
            books: Vec::new(),
        };
        assert!(matches!(settings.origin().unwrap(), Origin::Local(_)));
    }
}
