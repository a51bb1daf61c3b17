use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{error, info};

use ainews_core::config::PipelineConfig;
use ainews_core::types::{ArticleRecord, PipelineArgs};
use ainews_core::{Error, Result};
use ainews_storage::DedupSink;

use crate::extractor::NewsExtractor;
use crate::strategies::StrategyRegistry;

/// Independent feeds are fetched by a small worker pool.
pub const MAX_CONCURRENT_FEEDS: usize = 5;

/// Column order of the exported table.
pub const EXPORT_HEADERS: [&str; 4] = ["title", "news_link", "image_link", "publish_date"];

/// Extracts the article table for one feed URL.
pub async fn extract_from_feed(
    client: &Client,
    registry: &Arc<StrategyRegistry>,
    feed_url: &str,
) -> Result<Option<Vec<ArticleRecord>>> {
    let mut extractor = NewsExtractor::new(client.clone(), registry.clone());
    extractor.set_feed(feed_url);
    extractor.fetch_articles().await
}

/// Fetches several feeds concurrently. One feed's failure is logged and
/// never cancels its siblings; results are concatenated once every worker
/// has finished.
pub async fn extract_from_feeds(
    client: &Client,
    registry: &Arc<StrategyRegistry>,
    feed_urls: &[String],
) -> Result<Vec<ArticleRecord>> {
    if feed_urls.is_empty() {
        return Err(Error::Validation(
            "feed_urls must be a non-empty list of feed urls".to_string(),
        ));
    }
    if feed_urls.iter().any(|url| url.trim().is_empty()) {
        return Err(Error::Validation(
            "All the entries of the feed_urls list must be non-blank strings".to_string(),
        ));
    }

    let results: Vec<Vec<ArticleRecord>> = stream::iter(feed_urls.iter().cloned())
        .map(|feed_url| {
            let client = client.clone();
            let registry = registry.clone();
            async move {
                match extract_from_feed(&client, &registry, &feed_url).await {
                    Ok(Some(articles)) => Some(articles),
                    Ok(None) => None,
                    Err(e) => {
                        error!("Error extracting articles from {}: {}", feed_url, e);
                        None
                    }
                }
            }
        })
        .buffer_unordered(MAX_CONCURRENT_FEEDS)
        .filter_map(|result| async { result })
        .collect()
        .await;

    if results.is_empty() {
        error!("No articles were extracted from any source");
    }

    Ok(results.into_iter().flatten().collect())
}

/// Keeps articles whose title contains any case-sensitive keyword as an
/// exact substring, or any case-insensitive keyword case-folded. Logical
/// OR, not AND.
pub fn filter_by_keywords(records: Vec<ArticleRecord>, args: &PipelineArgs) -> Vec<ArticleRecord> {
    let kept: Vec<ArticleRecord> = records
        .into_iter()
        .filter(|record| matches_keywords(&record.title, args))
        .collect();

    info!(
        "Keyword filtering complete. {} articles matched the criteria.",
        kept.len()
    );
    kept
}

fn matches_keywords(title: &str, args: &PipelineArgs) -> bool {
    let lowered = title.to_lowercase();

    args.case_sen_search_kw
        .iter()
        .any(|kw| title.contains(kw.as_str()))
        || args
            .case_insen_search_kw
            .iter()
            .any(|kw| lowered.contains(&kw.to_lowercase()))
}

/// Keeps articles published within the last `max_days_old` days. The lower
/// bound is inclusive.
pub fn filter_by_recency(records: Vec<ArticleRecord>, max_days_old: u32) -> Vec<ArticleRecord> {
    filter_by_recency_at(records, max_days_old, Utc::now())
}

pub fn filter_by_recency_at(
    records: Vec<ArticleRecord>,
    max_days_old: u32,
    now: DateTime<Utc>,
) -> Vec<ArticleRecord> {
    let max_publish_date = now - Duration::days(max_days_old as i64);

    let kept: Vec<ArticleRecord> = records
        .into_iter()
        .filter(|record| record.publish_date >= max_publish_date)
        .collect();

    info!(
        "Date filtering complete. {} articles published within the allowed range.",
        kept.len()
    );
    kept
}

/// Renders records into export rows, dates pre-converted to strings.
pub fn render_rows(records: &[ArticleRecord], date_format: &str) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            vec![
                record.title.clone(),
                record.news_link.clone(),
                record.image_link.clone().unwrap_or_default(),
                record.publish_date.format(date_format).to_string(),
            ]
        })
        .collect()
}

/// The extraction pipeline with its collaborators injected: HTTP client,
/// strategy registry, deduplicating sink, configuration.
pub struct Pipeline {
    client: Client,
    registry: Arc<StrategyRegistry>,
    sink: DedupSink,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        client: Client,
        registry: Arc<StrategyRegistry>,
        sink: DedupSink,
        config: PipelineConfig,
    ) -> Self {
        Self {
            client,
            registry,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// One full run: extract every configured feed, filter by recency and
    /// keywords, persist new rows, return the filtered table. A sink
    /// failure is logged and leaves the run alive; zero matches is a
    /// normal terminal state.
    pub async fn run(&self, args: &PipelineArgs) -> Result<Vec<ArticleRecord>> {
        let args = args.clone().validated()?;

        let all_articles =
            extract_from_feeds(&self.client, &self.registry, &self.config.feed_urls).await?;
        info!("{} articles extracted in total", all_articles.len());

        info!(
            "Filtering news articles from the last {} days...",
            args.max_days_old
        );
        let articles = filter_by_recency(all_articles, args.max_days_old);
        let articles = filter_by_keywords(articles, &args);

        match self.sink.add_rows(&articles).await {
            Ok(inserted) => info!("{} new rows stored", inserted),
            Err(e) => error!("Error while inserting rows into the news table: {}", e),
        }

        Ok(articles)
    }
}
