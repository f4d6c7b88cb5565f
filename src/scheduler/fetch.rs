//! Image fetching backends.
//!
//! The loader only depends on [`ImageFetcher`]. Local assets are read from a
//! filesystem root; remote urls need the `http` feature.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::error::LoadError;
use super::priority::FetchPriority;

/// Retrieves the bytes of one image.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, hint: FetchPriority) -> Result<Vec<u8>, LoadError>;
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Reads root-relative asset urls (`/Images/...`) from a directory.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
    cdn_url: String,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), cdn_url: String::new() }
    }

    /// Strip this prefix from urls before resolving them against the root.
    pub fn with_cdn_url(mut self, cdn_url: impl Into<String>) -> Self {
        self.cdn_url = cdn_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a url to a path under the root. Rejects remote urls and any
    /// path that escapes the root.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, LoadError> {
        let local = if !self.cdn_url.is_empty() && url.starts_with(&self.cdn_url) {
            &url[self.cdn_url.len()..]
        } else {
            url
        };
        if is_remote(local) {
            return Err(LoadError::UnsupportedUrl { url: url.to_string() });
        }
        let local = local.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(local.trim_start_matches('/'));

        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return Err(LoadError::fetch(url, "path escapes asset root")),
            }
        }
        if path == self.root {
            return Err(LoadError::fetch(url, "empty asset path"));
        }
        Ok(path)
    }
}

#[async_trait]
impl ImageFetcher for FileFetcher {
    async fn fetch(&self, url: &str, _hint: FetchPriority) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(url)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| LoadError::fetch(url, e))?;
        if bytes.is_empty() {
            return Err(LoadError::fetch(url, "empty image"));
        }
        Ok(bytes)
    }
}

/// Fetches remote images; root-relative urls are resolved against `base_url`.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn absolute(&self, url: &str) -> Result<String, LoadError> {
        if is_remote(url) {
            Ok(url.to_string())
        } else if !self.base_url.is_empty() && url.starts_with('/') {
            Ok(format!("{}{}", self.base_url, url))
        } else {
            Err(LoadError::UnsupportedUrl { url: url.to_string() })
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, hint: FetchPriority) -> Result<Vec<u8>, LoadError> {
        let target = self.absolute(url)?;
        tracing::trace!(url = %target, fetch_priority = %hint, "http image fetch");
        let response = self
            .client
            .get(&target)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoadError::fetch(url, e))?;
        let bytes = response.bytes().await.map_err(|e| LoadError::fetch(url, e))?;
        if bytes.is_empty() {
            return Err(LoadError::fetch(url, "empty image"));
        }
        Ok(bytes.to_vec())
    }
}
