use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use super::{resolve_src, ImageStrategy};

/// MIT News wraps the article image in a dedicated media container and puts
/// the lazily-loaded path in `data-src`, relative to the site root.
#[derive(Debug, Clone, Default)]
pub struct MitImageStrategy;

impl MitImageStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl ImageStrategy for MitImageStrategy {
    fn publisher(&self) -> &'static str {
        "MIT News"
    }

    fn feed_url(&self) -> &'static str {
        ainews_core::config::MIT_NEWS_FEED_URL
    }

    fn image_from_document(&self, document: &Html, page_url: &Url) -> Option<String> {
        let selector = Selector::parse("div.news-article--media--image--file img").unwrap();

        let Some(image) = document.select(&selector).next() else {
            warn!(
                "Structure to get the image of the url {} was not found",
                page_url
            );
            return None;
        };

        match image
            .value()
            .attr("data-src")
            .or_else(|| image.value().attr("src"))
        {
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

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_URL: &str = "https://news.mit.edu/2024/some-article";

    #[test]
    fn test_extracts_relative_data_src() {
        let html = r#"
            <article>
              <div class="news-article--media--image--file">
                <img data-src="/sites/default/files/images/main.jpg" alt="">
              </div>
            </article>
        "#;
        let document = Html::parse_document(html);
        let page_url = Url::parse(ARTICLE_URL).unwrap();

        let image = MitImageStrategy::new().image_from_document(&document, &page_url);
        assert_eq!(
            image.as_deref(),
            Some("https://news.mit.edu/sites/default/files/images/main.jpg")
        );
    }

    #[test]
    fn test_missing_structure_returns_none() {
        let html = "<article><p>No media container here</p></article>";
        let document = Html::parse_document(html);
        let page_url = Url::parse(ARTICLE_URL).unwrap();

        assert!(MitImageStrategy::new()
            .image_from_document(&document, &page_url)
            .is_none());
    }
}
