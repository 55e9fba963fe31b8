//! Thumbnail lookup against the MediaWiki `pageimages` API.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::EnrichmentConfig;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("image API answered {0}")]
    Status(u16),

    #[error("no thumbnail for '{0}'")]
    MissingThumbnail(String),
}

/// `{"query": {"pages": [{"thumbnail": {"source": ...}}]}}`, every level optional.
#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    pub query: Option<ImageQuery>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub title: Option<String>,
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub source: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageResponse {
    /// `query.pages[0].thumbnail.source`
    pub fn thumbnail_source(self, title: &str) -> Result<String, EnrichmentError> {
        self.query
            .and_then(|q| q.pages.into_iter().next())
            .and_then(|page| page.thumbnail)
            .map(|thumb| thumb.source)
            .ok_or_else(|| EnrichmentError::MissingThumbnail(title.to_string()))
    }
}

#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// URL of a thumbnail for the page titled `title`.
    async fn thumbnail(&self, title: &str) -> Result<String, EnrichmentError>;
}

pub struct WikipediaImages {
    client: reqwest::Client,
    api_url: String,
    thumbnail_size: u32,
}

impl WikipediaImages {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            thumbnail_size: config.thumbnail_size,
        })
    }
}

#[async_trait]
impl ImageLookup for WikipediaImages {
    async fn thumbnail(&self, title: &str) -> Result<String, EnrichmentError> {
        let size = self.thumbnail_size.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "pageimages"),
                ("titles", title),
                ("pithumbsize", size.as_str()),
                ("formatversion", "2"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body: ImageResponse = response.json().await?;
        let source = body.thumbnail_source(title)?;
        tracing::debug!("Resolved thumbnail for '{}': {}", title, source);
        Ok(source)
    }
}
