use std::sync::Arc;

use feed_rs::model::Entry;
use reqwest::Client;
use tracing::{error, info, warn};

use ainews_core::types::ArticleRecord;
use ainews_core::Result;

use crate::fetch;
use crate::strategies::{ImageExtractor, StrategyRegistry};

/// Where the extractor stands for its current feed assignment.
///
/// `Unset -> Pending` on feed assignment, `Pending -> Fetched` on a
/// successful parse. Re-assigning the same URL keeps the fetched table;
/// assigning a new one drops it. An empty feed leaves the state `Pending`
/// so a transient empty response never replaces a valid table.
enum FeedState {
    Unset,
    Pending { feed_url: String },
    Fetched {
        feed_url: String,
        articles: Vec<ArticleRecord>,
    },
}

impl FeedState {
    fn feed_url(&self) -> Option<&str> {
        match self {
            FeedState::Unset => None,
            FeedState::Pending { feed_url } | FeedState::Fetched { feed_url, .. } => {
                Some(feed_url)
            }
        }
    }
}

/// Produces the article table for one feed URL: fetch, per-article image
/// extraction, normalization into `ArticleRecord`s.
pub struct NewsExtractor {
    client: Client,
    registry: Arc<StrategyRegistry>,
    image_extractor: Option<ImageExtractor>,
    state: FeedState,
}

impl NewsExtractor {
    pub fn new(client: Client, registry: Arc<StrategyRegistry>) -> Self {
        Self {
            client,
            registry,
            image_extractor: None,
            state: FeedState::Unset,
        }
    }

    /// Assigns the feed to extract from and re-resolves the image strategy.
    /// Soft validation: a URL not starting with `https://` is logged and
    /// ignored, leaving the current assignment untouched.
    pub fn set_feed(&mut self, feed_url: &str) {
        if !feed_url.starts_with("https://") {
            error!("feed_url must start with 'https://', got {:?}", feed_url);
            return;
        }

        if self.state.feed_url() == Some(feed_url) {
            return;
        }

        info!("Setting current feed url to {}", feed_url);
        self.image_extractor = self
            .registry
            .for_url(feed_url)
            .map(|strategy| ImageExtractor::new(self.client.clone(), strategy));
        self.state = FeedState::Pending {
            feed_url: feed_url.to_string(),
        };
    }

    pub fn current_feed_url(&self) -> Option<&str> {
        self.state.feed_url()
    }

    /// The cached article table, if the current feed has been fetched.
    pub fn articles(&self) -> Option<&[ArticleRecord]> {
        match &self.state {
            FeedState::Fetched { articles, .. } => Some(articles),
            _ => None,
        }
    }

    /// Fetches and normalizes the assigned feed. Returns the cached table
    /// when the same URL was already fetched; `Ok(None)` when no feed is
    /// assigned or the feed yields no usable entries.
    pub async fn fetch_articles(&mut self) -> Result<Option<Vec<ArticleRecord>>> {
        let feed_url = match &self.state {
            FeedState::Unset => {
                error!("No feed url has been set");
                return Ok(None);
            }
            FeedState::Fetched { feed_url, articles } => {
                info!("Articles from feed url {} already extracted", feed_url);
                return Ok(Some(articles.clone()));
            }
            FeedState::Pending { feed_url } => feed_url.clone(),
        };

        let feed = fetch::fetch_feed(&self.client, &feed_url).await?;

        let mut records = Vec::new();
        for entry in feed.entries {
            let image_link = match (&mut self.image_extractor, entry.links.first()) {
                (Some(extractor), Some(link)) => extractor.extract(&link.href).await,
                _ => None,
            };
            if let Some(record) = record_from_entry(&entry, image_link) {
                records.push(record);
            }
        }

        if records.is_empty() {
            error!(
                "No articles extracted from {}. Make sure the url is RSS-compatible",
                feed_url
            );
            return Ok(None);
        }

        info!("{} articles extracted", records.len());
        self.state = FeedState::Fetched {
            feed_url,
            articles: records.clone(),
        };
        Ok(Some(records))
    }
}

/// Builds one article record from a feed entry. Entries without a link or a
/// publication date are skipped with a warning.
pub fn record_from_entry(entry: &Entry, image_link: Option<String>) -> Option<ArticleRecord> {
    let Some(link) = entry.links.first().map(|l| l.href.clone()) else {
        warn!("Feed entry {:?} has no link, skipping it", entry.id);
        return None;
    };

    let Some(published) = entry.published.or(entry.updated) else {
        warn!("Feed entry {} has no publication date, skipping it", link);
        return None;
    };

    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.as_str())
        .unwrap_or_default();

    match ArticleRecord::new(title, &link, image_link, published) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Feed entry {} is not a valid article: {}", link, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const FEED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>AI News</title>
    <link>https://www.example.com</link>
    <item>
      <title>New Gemini Model Launches</title>
      <link>https://www.example.com/gemini-launch</link>
      <pubDate>Fri, 09 Oct 2020 14:19:00 +0000</pubDate>
      <description>A new model</description>
    </item>
    <item>
      <title>Entry without a date</title>
      <link>https://www.example.com/no-date</link>
      <description>Skipped</description>
    </item>
  </channel>
</rss>"#;

    fn extractor() -> NewsExtractor {
        NewsExtractor::new(
            fetch::http_client(),
            Arc::new(StrategyRegistry::with_known_publishers()),
        )
    }

    #[test]
    fn test_set_feed_soft_validation() {
        let mut extractor = extractor();

        extractor.set_feed("http://insecure.example.com/feed");
        assert!(extractor.current_feed_url().is_none());

        extractor.set_feed("https://news.mit.edu/rss/feed");
        assert_eq!(
            extractor.current_feed_url(),
            Some("https://news.mit.edu/rss/feed")
        );

        // A later bad assignment does not clobber the valid one.
        extractor.set_feed("ftp://bad");
        assert_eq!(
            extractor.current_feed_url(),
            Some("https://news.mit.edu/rss/feed")
        );
    }

    #[tokio::test]
    async fn test_fetch_without_feed_is_none() {
        let mut extractor = extractor();
        let result = extractor.fetch_articles().await.unwrap();
        assert!(result.is_none());
        assert!(extractor.articles().is_none());
    }

    #[test]
    fn test_record_from_entry() {
        let feed = feed_rs::parser::parse(FEED_XML.as_bytes()).unwrap();
        assert_eq!(feed.entries.len(), 2);

        let record = record_from_entry(&feed.entries[0], None).unwrap();
        assert_eq!(record.title, "New Gemini Model Launches");
        assert_eq!(record.news_link, "https://www.example.com/gemini-launch");
        assert_eq!(record.image_link, None);
        assert_eq!(
            record.publish_date,
            Utc.with_ymd_and_hms(2020, 10, 9, 14, 19, 0).unwrap()
        );

        // The RFC 2822 date is mandatory.
        assert!(record_from_entry(&feed.entries[1], None).is_none());
    }

    #[test]
    fn test_record_from_entry_normalizes_title() {
        let xml = FEED_XML.replace(
            "New Gemini Model Launches",
            "OpenAI&apos;s &quot;new&quot; model",
        );
        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();

        let record = record_from_entry(&feed.entries[0], None).unwrap();
        assert_eq!(record.title, "OpenAIs new model");
    }
}
