use log::debug;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image {0} not found")]
    NotFound(String),
    #[error("Image {image} failed to load: {reason}")]
    Failed { image: String, reason: String },
}

/// Loads a page image far enough to know whether it can be shown.
pub trait ImageFetch {
    fn fetch_image(&self, image: &str) -> impl Future<Output = Result<(), ImageError>> + Send;
}

#[derive(Clone)]
pub struct HttpImages {
    client: reqwest::Client,
    base: Url,
}

impl HttpImages {
    pub fn new(base: Url) -> Self {
        HttpImages {
            client: reqwest::Client::new(),
            base,
        }
    }
}

impl ImageFetch for HttpImages {
    async fn fetch_image(&self, image: &str) -> Result<(), ImageError> {
        let failed = |reason: String| ImageError::Failed {
            image: image.to_string(),
            reason,
        };
        let url = self
            .base
            .join(image.trim_start_matches('/'))
            .map_err(|e| failed(e.to_string()))?;
        debug!("Preloading {}", url);

        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ImageError::NotFound(image.to_string()));
        }
        if !res.status().is_success() {
            return Err(failed(res.status().to_string()));
        }
        res.bytes().await.map_err(|e| failed(e.to_string()))?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct FileImages {
    root: PathBuf,
}

impl FileImages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileImages { root: root.into() }
    }
}

impl ImageFetch for FileImages {
    async fn fetch_image(&self, image: &str) -> Result<(), ImageError> {
        let path = self.root.join(image.trim_start_matches('/'));
        debug!("Preloading {}", path.display());

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(ImageError::Failed {
                image: image.to_string(),
                reason: "not a file".to_string(),
            }),
            Err(_) => Err(ImageError::NotFound(image.to_string())),
        }
    }
}
