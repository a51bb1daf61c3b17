use std::time::Duration;

use feed_rs::model::Feed;
use reqwest::Client;

use ainews_core::{Error, Result};

/// Browser user agent; several publishers serve different markup to bots.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client, built once at process start and cloned into components.
pub fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to create HTTP client")
}

/// Fetches and parses an RSS/Atom feed. Feed-level failures are errors;
/// isolation across feeds happens in the multi-feed layer.
pub async fn fetch_feed(client: &Client, feed_url: &str) -> Result<Feed> {
    let response = client.get(feed_url).send().await?;
    if !response.status().is_success() {
        return Err(Error::Feed(format!(
            "Failed to fetch feed {}: HTTP {}",
            feed_url,
            response.status()
        )));
    }

    let bytes = response.bytes().await?;
    feed_rs::parser::parse(&bytes[..])
        .map_err(|e| Error::Feed(format!("Failed to parse feed {}: {}", feed_url, e)))
}

/// Fetches the raw HTML of one article page.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(Error::Scraping(format!(
            "Failed to fetch page {}: HTTP {}",
            url,
            response.status()
        )));
    }

    Ok(response.text().await?)
}
