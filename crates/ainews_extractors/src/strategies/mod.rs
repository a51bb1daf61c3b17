use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, warn};
use url::Url;

use crate::fetch;

pub mod ainews;
pub mod mit;

pub use ainews::AiNewsImageStrategy;
pub use mit::MitImageStrategy;

/// A publisher-specific way of locating the principal image of an article
/// page. One strategy per feed, selected by the feed's origin.
pub trait ImageStrategy: Send + Sync {
    /// Human-readable publisher name.
    fn publisher(&self) -> &'static str;

    /// The RSS feed this publisher's articles come from. Its origin is the
    /// registry key.
    fn feed_url(&self) -> &'static str;

    /// Locates the main image in a parsed article page. `None` when the
    /// expected structure is absent.
    fn image_from_document(&self, document: &Html, page_url: &Url) -> Option<String>;
}

/// Origin (scheme + host, trailing slash stripped) of a URL.
pub fn normalized_origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let mut origin = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        origin.push_str(&format!(":{}", port));
    }
    Some(origin.trim_end_matches('/').to_string())
}

/// Resolves an image `src` against the page URL when the publisher gives a
/// relative path.
pub(crate) fn resolve_src(src: &str, page_url: &Url) -> Option<String> {
    if src.starts_with("http://") || src.starts_with("https://") {
        Some(src.to_string())
    } else {
        page_url.join(src).ok().map(|u| u.to_string())
    }
}

/// Static mapping from feed origin to image strategy, built once from the
/// known publishers.
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn ImageStrategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_known_publishers()
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    pub fn with_known_publishers() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(MitImageStrategy::new()));
        registry.register(Arc::new(AiNewsImageStrategy::new()));
        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn ImageStrategy>) {
        if let Some(origin) = normalized_origin(strategy.feed_url()) {
            self.strategies.insert(origin, strategy);
        } else {
            warn!(
                "Strategy for {} has an unparseable feed url, skipping registration",
                strategy.publisher()
            );
        }
    }

    /// Strategy for an article (or feed) URL, matched on its origin.
    /// `None` means "no image available", never a fatal condition.
    pub fn for_url(&self, url: &str) -> Option<Arc<dyn ImageStrategy>> {
        let origin = normalized_origin(url)?;
        match self.strategies.get(&origin) {
            Some(strategy) => {
                debug!(
                    "Extractor '{}' selected for base URL: {}",
                    strategy.publisher(),
                    origin
                );
                Some(strategy.clone())
            }
            None => {
                warn!("No extractor found for the news url: {}", url);
                None
            }
        }
    }

    /// (origin, publisher) pairs of every registered strategy.
    pub fn publishers(&self) -> Vec<(String, &'static str)> {
        let mut publishers: Vec<(String, &'static str)> = self
            .strategies
            .iter()
            .map(|(origin, strategy)| (origin.clone(), strategy.publisher()))
            .collect();
        publishers.sort();
        publishers
    }
}

/// Fetches one article page and delegates image lookup to the selected
/// strategy. Keeps the last fetched page so two lookups against the same
/// URL in one run hit the network once.
pub struct ImageExtractor {
    client: Client,
    strategy: Arc<dyn ImageStrategy>,
    last_page: Option<(String, String)>,
}

impl ImageExtractor {
    pub fn new(client: Client, strategy: Arc<dyn ImageStrategy>) -> Self {
        Self {
            client,
            strategy,
            last_page: None,
        }
    }

    /// URL of the article's main image, or `None` on any fetch or
    /// structure failure. One bad article never aborts the batch.
    pub async fn extract(&mut self, article_url: &str) -> Option<String> {
        let page_url = match Url::parse(article_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Invalid article url {}: {}", article_url, e);
                return None;
            }
        };

        let body = self.page_body(article_url).await?;
        let document = Html::parse_document(&body);
        self.strategy.image_from_document(&document, &page_url)
    }

    async fn page_body(&mut self, url: &str) -> Option<String> {
        if let Some((cached_url, body)) = &self.last_page {
            if cached_url == url {
                return Some(body.clone());
            }
        }

        match fetch::fetch_page(&self.client, url).await {
            Ok(body) => {
                self.last_page = Some((url.to_string(), body.clone()));
                Some(body)
            }
            Err(e) => {
                warn!("Error fetching html from page {}: {}", url, e);
                None
            }
        }
    }
}
