use std::sync::Arc;

use ainews_core::store::NewsStore;
use ainews_core::{Error, Result};

pub mod backends;
pub mod sink;

pub use backends::memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use backends::sqlite::SqliteStore;
pub use sink::DedupSink;

/// Builds a store backend by name, the way the CLI selects it.
pub async fn create_store(backend: &str, db_path: Option<&str>) -> Result<Arc<dyn NewsStore>> {
    match backend {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = std::path::PathBuf::from(db_path.unwrap_or("news_metadata.db"));
            Ok(Arc::new(SqliteStore::new_with_path(&path).await?))
        }
        other => Err(Error::Storage(format!(
            "Unknown storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::sink::DedupSink;
    pub use ainews_core::store::NewsStore;
    pub use ainews_core::types::NewsRecord;
}
