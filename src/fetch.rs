use anyhow::{Context, Result};
use std::fs;
use url::Url;

/// Listing page markup plus the base used to resolve its relative links.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub content: String,
    pub base: Url,
}

pub trait ContentFetcher {
    fn fetch(&self, location: &str) -> Result<FetchedPage>;
}

pub trait BinaryFetcher {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http:") || location.starts_with("https:")
}

/// Fetches remote locations over HTTP and reads anything else from disk.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    local_base: Url,
}

impl HttpFetcher {
    pub fn new(local_base: Url) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, local_base })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        self.client
            .get(url)
            .send()
            .with_context(|| format!("Failed to send request to {}", url))?
            .error_for_status()
            .with_context(|| format!("Request to {} failed", url))
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch(&self, location: &str) -> Result<FetchedPage> {
        log::debug!("Fetching content from: {}", location);
        if is_remote(location) {
            let base = Url::parse(location)
                .with_context(|| format!("Invalid listing URL: {}", location))?;
            let content = self
                .get(location)?
                .text()
                .with_context(|| format!("Failed to read response body from {}", location))?;
            Ok(FetchedPage { content, base })
        } else {
            let content = fs::read_to_string(location)
                .with_context(|| format!("Failed to read listing file: {}", location))?;
            Ok(FetchedPage {
                content,
                base: self.local_base.clone(),
            })
        }
    }
}

impl BinaryFetcher for HttpFetcher {
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .get(url)?
            .bytes()
            .with_context(|| format!("Failed to read document body from {}", url))?;
        Ok(bytes.to_vec())
    }
}
