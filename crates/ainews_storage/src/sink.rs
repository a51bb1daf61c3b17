use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use ainews_core::store::NewsStore;
use ainews_core::types::{ArticleRecord, NewsRecord};
use ainews_core::Result;

/// Deduplicating sink over the news table. Rows are keyed by a
/// content-derived id so re-runs against the same feed insert nothing.
pub struct DedupSink {
    store: Arc<dyn NewsStore>,
}

impl DedupSink {
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        Self { store }
    }

    /// Deterministic row id for a news link, stable across runs and
    /// process restarts.
    pub fn generate_id(news_link: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(news_link.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Inserts a single article unless its id is already in the table.
    /// Returns the id of the inserted row, or `None` when skipped.
    pub async fn add_row(&self, article: &ArticleRecord) -> Result<Option<String>> {
        debug!("Generating ID...");
        let news_id = Self::generate_id(&article.news_link);

        if self.store.contains(&news_id).await? {
            warn!(
                "Extracted news {} already in database, skipping it...",
                article.title
            );
            return Ok(None);
        }

        let mut record = NewsRecord::from_article(article, news_id.clone());
        record.extracted_at = Some(Utc::now());
        self.store.insert(&[record]).await?;

        Ok(Some(news_id))
    }

    /// Batch variant: filters out known ids, then inserts the rest in one
    /// call. Returns the number of rows inserted. The per-candidate
    /// existence check only avoids pointless writes; the store's unique key
    /// decides.
    pub async fn add_rows(&self, articles: &[ArticleRecord]) -> Result<usize> {
        let mut to_add = Vec::new();
        for article in articles {
            let news_id = Self::generate_id(&article.news_link);
            if self.store.contains(&news_id).await? {
                continue;
            }

            let mut record = NewsRecord::from_article(article, news_id);
            record.extracted_at = Some(Utc::now());
            to_add.push(record);
        }

        if to_add.is_empty() {
            warn!("All the news have been previously added to the database.");
            return Ok(0);
        }

        info!("Inserting {} new rows into the news table", to_add.len());
        self.store.insert(&to_add).await
    }

    pub fn store(&self) -> &Arc<dyn NewsStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::MemoryStore;
    use chrono::Utc;

    fn article(link: &str) -> ArticleRecord {
        ArticleRecord::new("New Gemini Model Launches", link, None, Utc::now()).unwrap()
    }

    #[test]
    fn test_generate_id_is_idempotent() {
        let a = DedupSink::generate_id("https://news.mit.edu/article-1");
        let b = DedupSink::generate_id("https://news.mit.edu/article-1");
        let c = DedupSink::generate_id("https://news.mit.edu/article-2");

        assert_eq!(a, b);
        assert_ne!(a, c);
        // sha256 hex digest
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_add_rows_is_deduplicating() {
        let sink = DedupSink::new(Arc::new(MemoryStore::new()));
        let articles = vec![
            article("https://example.com/a"),
            article("https://example.com/b"),
            article("https://example.com/c"),
        ];

        assert_eq!(sink.add_rows(&articles).await.unwrap(), 3);
        // A second run over the same (or a subset of the same) articles
        // inserts nothing.
        assert_eq!(sink.add_rows(&articles).await.unwrap(), 0);
        assert_eq!(sink.add_rows(&articles[..2]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_row_skips_existing() {
        let sink = DedupSink::new(Arc::new(MemoryStore::new()));
        let article = article("https://example.com/a");

        let inserted = sink.add_row(&article).await.unwrap();
        assert!(inserted.is_some());

        let skipped = sink.add_row(&article).await.unwrap();
        assert!(skipped.is_none());

        let rows = sink.store().fetch_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].extracted_at.is_some());
    }
}
