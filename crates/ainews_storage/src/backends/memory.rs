use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ainews_core::store::NewsStore;
use ainews_core::types::NewsRecord;
use ainews_core::Result;

/// In-memory news table, mainly for tests and dry runs. The keyed map gives
/// the same uniqueness guarantee as the sqlite primary key.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<String, NewsRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn contains(&self, news_id: &str) -> Result<bool> {
        Ok(self.rows.read().await.contains_key(news_id))
    }

    async fn insert(&self, rows: &[NewsRecord]) -> Result<usize> {
        let mut table = self.rows.write().await;
        let mut inserted = 0;
        for row in rows {
            if !table.contains_key(&row.news_id) {
                table.insert(row.news_id.clone(), row.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn fetch_all(&self) -> Result<Vec<NewsRecord>> {
        let table = self.rows.read().await;
        let mut rows: Vec<NewsRecord> = table.values().cloned().collect();
        rows.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ainews_core::types::ArticleRecord;
    use chrono::Utc;

    fn record(id: &str, link: &str) -> NewsRecord {
        let article =
            ArticleRecord::new("Test Article", link, None, Utc::now()).unwrap();
        NewsRecord::from_article(&article, id.to_string())
    }

    #[tokio::test]
    async fn test_insert_skips_existing_ids() {
        let store = MemoryStore::new();

        let first = store
            .insert(&[record("a", "https://example.com/a")])
            .await
            .unwrap();
        assert_eq!(first, 1);

        let second = store
            .insert(&[
                record("a", "https://example.com/a"),
                record("b", "https://example.com/b"),
            ])
            .await
            .unwrap();
        assert_eq!(second, 1);

        assert!(store.contains("a").await.unwrap());
        assert!(store.contains("b").await.unwrap());
        assert_eq!(store.fetch_all().await.unwrap().len(), 2);
    }
}
