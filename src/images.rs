//! Header image lookup on Pexels.
//!
//! Image lookup never fails a run. [`resolve_image`] turns every error and
//! an empty result into [`ResolvedImage::Fallback`], which carries the reason
//! so the caller can log it.

use crate::utils::truncate_for_log;
use serde::Deserialize;
use std::error::Error;
use std::time::Instant;
use tracing::{info, instrument, warn};
use url::Url;

const PEXELS_SEARCH: &str = "https://api.pexels.com/v1/search";

/// Image used when the search cannot provide one.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.pexels.com/photos/1769279/pexels-photo-1769279.jpeg";

/// Finds a photo URL for a short query.
pub trait ImageSearch {
    /// `Ok(None)` when the search succeeded but matched nothing.
    async fn first_photo(&self, query: &str) -> Result<Option<String>, Box<dyn Error>>;
}

/// Outcome of an image lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedImage {
    Found(String),
    Fallback { reason: String },
}

impl ResolvedImage {
    pub fn url(&self) -> &str {
        match self {
            ResolvedImage::Found(url) => url,
            ResolvedImage::Fallback { .. } => FALLBACK_IMAGE_URL,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ResolvedImage::Fallback { .. })
    }
}

/// Pexels search API client.
#[derive(Clone)]
pub struct PexelsClient {
    http: reqwest::Client,
    base: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSrc,
}

#[derive(Debug, Deserialize)]
struct PhotoSrc {
    large: String,
}

impl PexelsClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            base: PEXELS_SEARCH.to_string(),
            api_key,
        }
    }

    fn search_url(&self, query: &str) -> Result<Url, Box<dyn Error>> {
        Ok(Url::parse_with_params(
            &self.base,
            &[("query", query), ("per_page", "1")],
        )?)
    }
}

impl ImageSearch for PexelsClient {
    #[instrument(level = "info", skip(self))]
    async fn first_photo(&self, query: &str) -> Result<Option<String>, Box<dyn Error>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err("PEXELS_API_KEY is not set".into());
        };
        let t0 = Instant::now();
        let resp = self
            .http
            .get(self.search_url(query)?)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(format!(
                "Pexels search failed: HTTP {status}: {}",
                truncate_for_log(&body, 200)
            )
            .into());
        }
        let url = parse_search_response(&body)?;
        info!(elapsed_ms = t0.elapsed().as_millis(), found = url.is_some(), "Pexels search finished");
        Ok(url)
    }
}

/// Read `photos[0].src.large` from a Pexels search response.
pub fn parse_search_response(body: &str) -> Result<Option<String>, Box<dyn Error>> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    Ok(parsed.photos.into_iter().next().map(|p| p.src.large))
}

/// Look up an image, substituting [`FALLBACK_IMAGE_URL`] on any failure.
///
/// # Arguments
///
/// * `search` - The image backend to query
/// * `query` - Short search phrase such as `"laboratory"`
///
/// # Returns
///
/// [`ResolvedImage::Found`] with the first photo's URL, or
/// [`ResolvedImage::Fallback`] carrying the reason. Errors never escape.
#[instrument(level = "info", skip(search))]
pub async fn resolve_image<S: ImageSearch>(search: &S, query: &str) -> ResolvedImage {
    match search.first_photo(query).await {
        Ok(Some(url)) => ResolvedImage::Found(url),
        Ok(None) => {
            warn!("No photos matched; using fallback image");
            ResolvedImage::Fallback {
                reason: "no photos matched".to_string(),
            }
        }
        Err(e) => {
            warn!(error = %e, "Image search failed; using fallback image");
            ResolvedImage::Fallback {
                reason: e.to_string(),
            }
        }
    }
}
