use serde::{Deserialize, Serialize};

pub const MIT_NEWS_FEED_URL: &str = "https://news.mit.edu/rss/feed";
pub const AI_NEWS_FEED_URL: &str =
    "https://www.artificialintelligence-news.com/artificial-intelligence-news/feed/";

/// Environment-backed pipeline configuration. Read once at process start and
/// passed into components; nothing here is a global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// RSS feed URLs to extract from.
    pub feed_urls: Vec<String>,
    /// strftime format used when rendering timestamps for export.
    pub date_string_format: String,
    /// Destination of the spreadsheet export.
    pub export_path: String,
    pub sheet_name: String,
    pub table_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feed_urls: vec![
                MIT_NEWS_FEED_URL.to_string(),
                AI_NEWS_FEED_URL.to_string(),
            ],
            date_string_format: "%Y-%m-%d %H:%M:%SZ".to_string(),
            export_path: "ai_news.xlsx".to_string(),
            sheet_name: "AI-News".to_string(),
            table_name: "RecentAINews".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `AINEWS_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(feeds) = std::env::var("AINEWS_FEED_URLS") {
            let feeds: Vec<String> = feeds
                .split(',')
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect();
            if !feeds.is_empty() {
                config.feed_urls = feeds;
            }
        }
        if let Ok(format) = std::env::var("AINEWS_DATE_FORMAT") {
            config.date_string_format = format;
        }
        if let Ok(path) = std::env::var("AINEWS_EXPORT_PATH") {
            config.export_path = path;
        }
        if let Ok(sheet) = std::env::var("AINEWS_SHEET_NAME") {
            config.sheet_name = sheet;
        }
        if let Ok(table) = std::env::var("AINEWS_TABLE_NAME") {
            config.table_name = table;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.feed_urls.len(), 2);
        assert!(config.export_path.ends_with(".xlsx"));
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("AINEWS_SHEET_NAME", "Overridden");
        let config = PipelineConfig::from_env();
        assert_eq!(config.sheet_name, "Overridden");
        std::env::remove_var("AINEWS_SHEET_NAME");
    }
}
