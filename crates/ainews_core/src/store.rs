use async_trait::async_trait;

use crate::types::NewsRecord;
use crate::Result;

/// Persistence seam for the deduplicating sink. Implementations must treat
/// `news_id` as a unique key: `insert` skips rows whose id is already
/// present, so the existence check in the sink is an optimization only and
/// concurrent writers cannot produce duplicates.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// True if a row with this id is already in the table.
    async fn contains(&self, news_id: &str) -> Result<bool>;

    /// Inserts rows, ignoring ids already present.
    /// Returns the number of rows actually inserted.
    async fn insert(&self, rows: &[NewsRecord]) -> Result<usize>;

    /// Every row currently in the table.
    async fn fetch_all(&self) -> Result<Vec<NewsRecord>>;
}
