use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use super::{resolve_src, ImageStrategy};

/// AI News pages are built with Elementor; the lead image is the one
/// rendered at 800px width inside a widget container.
#[derive(Debug, Clone, Default)]
pub struct AiNewsImageStrategy;

impl AiNewsImageStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ImageStrategy for AiNewsImageStrategy {
    fn publisher(&self) -> &'static str {
        "AI News"
    }

    fn feed_url(&self) -> &'static str {
        ainews_core::config::AI_NEWS_FEED_URL
    }

    fn image_from_document(&self, document: &Html, page_url: &Url) -> Option<String> {
        let selector = Selector::parse(".elementor-widget-container img").unwrap();

        let image = document
            .select(&selector)
            .find(|img| img.value().attr("width") == Some("800"))
            .and_then(|img| img.value().attr("src"));

        match image {
            Some(src) => resolve_src(src, page_url),
            None => {
                warn!(
                    "Structure to get the image of the url {} was not found",
                    page_url
                );
                None
            }
        }
    }
}
