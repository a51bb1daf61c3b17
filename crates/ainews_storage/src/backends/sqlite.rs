use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;

use ainews_core::store::NewsStore;
use ainews_core::types::NewsRecord;
use ainews_core::{Error, Result};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news_metadata (
        news_id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        published_at TEXT NOT NULL,
        extracted_at TEXT,
        news_link TEXT NOT NULL,
        image_link TEXT
    )
    "#,
    // Add future migrations here
];

/// SQLite-backed news table. The `news_id` primary key plus `INSERT OR
/// IGNORE` is the real duplicate guard; the sink's existence check only
/// saves work.
pub struct SqliteStore {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl SqliteStore {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<NewsRecord> {
        let published_at: String = row.get("published_at");
        let extracted_at: Option<String> = row.get("extracted_at");

        Ok(NewsRecord {
            news_id: row.get("news_id"),
            title: row.get("title"),
            published_at: parse_timestamp(&published_at)?,
            extracted_at: extracted_at.as_deref().map(parse_timestamp).transpose()?,
            news_link: row.get("news_link"),
            image_link: row.get("image_link"),
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("Failed to parse date {:?}: {}", raw, e)))
}

#[async_trait]
impl NewsStore for SqliteStore {
    async fn contains(&self, news_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT news_id FROM news_metadata WHERE news_id = ?")
            .bind(news_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to check row existence: {}", e)))?;

        Ok(row.is_some())
    }

    async fn insert(&self, rows: &[NewsRecord]) -> Result<usize> {
        let mut inserted = 0u64;
        for row in rows {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO news_metadata
                (news_id, title, published_at, extracted_at, news_link, image_link)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.news_id)
            .bind(&row.title)
            .bind(row.published_at.to_rfc3339())
            .bind(row.extracted_at.map(|dt| dt.to_rfc3339()))
            .bind(&row.news_link)
            .bind(row.image_link.as_deref())
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to insert news row: {}", e)))?;

            inserted += result.rows_affected();
        }

        Ok(inserted as usize)
    }

    async fn fetch_all(&self) -> Result<Vec<NewsRecord>> {
        let rows = sqlx::query("SELECT * FROM news_metadata ORDER BY published_at DESC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("Failed to fetch news rows: {}", e)))?;

        rows.iter().map(Self::row_to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ainews_core::types::ArticleRecord;
    use tempfile::tempdir;

    fn record(id: &str, link: &str) -> NewsRecord {
        let article =
            ArticleRecord::new("Test Article", link, None, Utc::now()).unwrap();
        let mut record = NewsRecord::from_article(&article, id.to_string());
        record.extracted_at = Some(Utc::now());
        record
    }

    #[tokio::test]
    async fn test_insert_or_ignore_deduplicates() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = SqliteStore::new_with_path(&db_path).await.unwrap();

        let rows = vec![
            record("a", "https://example.com/a"),
            record("b", "https://example.com/b"),
        ];
        assert_eq!(store.insert(&rows).await.unwrap(), 2);
        assert_eq!(store.insert(&rows).await.unwrap(), 0);

        assert!(store.contains("a").await.unwrap());
        assert!(!store.contains("c").await.unwrap());

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.extracted_at.is_some()));
    }
}
