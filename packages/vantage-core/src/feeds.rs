//! News/RSS feed monitor.
//!
//! Feeds are polled through a JSON feed-conversion endpoint. The batch
//! fetch fans out over every configured source; a dead feed is logged
//! and skipped, never fatal for its siblings.

use std::sync::Arc;

use futures::future::join_all;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ScanError, ScanResult};
use crate::fetch::RelayFetcher;

/// Default JSON feed-conversion endpoint.
pub const DEFAULT_CONVERT_URL: &str = "https://api.rss2json.com/v1/api.json";

/// One configured feed.
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub url: String,
    pub name: String,
    pub category: String,
}

impl FeedSource {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            category: category.into(),
        }
    }
}

/// The production feed set.
pub fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new("https://housedemocrats.wa.gov/feed/", "House Dems", "Official"),
        FeedSource::new("https://senatedemocrats.wa.gov/feed/", "Senate Dems", "Official"),
        FeedSource::new("https://houserepublicans.wa.gov/feed/", "House GOP", "Official"),
        FeedSource::new("https://src.wastateleg.org/feed/", "Senate GOP", "Official"),
        FeedSource::new("https://www.thestranger.com/feed", "The Stranger", "Partisan"),
        FeedSource::new("https://www.seattletimes.com/opinion/feed/", "Seattle Times Op", "Media"),
        FeedSource::new("https://www.spokesman.com/feeds/stories/", "Spokesman Main", "Media"),
    ]
}

/// One feed entry, normalized for the intelligence list.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub source: String,
    pub published: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
struct ConvertedFeed {
    #[serde(default)]
    items: Vec<ConvertedItem>,
}

#[derive(Debug, Deserialize)]
struct ConvertedItem {
    #[serde(default)]
    guid: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "pubDate", default)]
    pub_date: String,
    #[serde(default)]
    description: String,
}

/// Fan-out feed poller.
pub struct FeedScanner {
    fetcher: Arc<RelayFetcher>,
    convert_url: String,
    feeds: Vec<FeedSource>,
}

impl FeedScanner {
    pub fn new(fetcher: Arc<RelayFetcher>, feeds: Vec<FeedSource>) -> Self {
        Self {
            fetcher,
            convert_url: DEFAULT_CONVERT_URL.to_string(),
            feeds,
        }
    }

    /// Point at a different conversion endpoint.
    pub fn with_convert_url(mut self, url: impl Into<String>) -> Self {
        self.convert_url = url.into();
        self
    }

    /// Fetch every configured feed; failures are isolated per feed and
    /// the survivors come back flattened in feed order.
    pub async fn fetch_all(&self) -> Vec<FeedItem> {
        let results = join_all(self.feeds.iter().map(|feed| async move {
            match self.fetch_feed(feed).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(feed = %feed.name, error = %e, "feed fetch failed, skipping");
                    Vec::new()
                }
            }
        }))
        .await;

        let items: Vec<FeedItem> = results.into_iter().flatten().collect();
        info!(feeds = self.feeds.len(), items = items.len(), "feed refresh completed");
        items
    }

    async fn fetch_feed(&self, feed: &FeedSource) -> ScanResult<Vec<FeedItem>> {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("rss_url", &feed.url)
            .finish();
        let body = self
            .fetcher
            .get_text(&format!("{}?{}", self.convert_url, query))
            .await?;

        let converted: ConvertedFeed =
            serde_json::from_str(&body).map_err(|e| ScanError::Malformed {
                endpoint: "feed conversion".to_string(),
                detail: e.to_string(),
            })?;

        Ok(converted
            .items
            .into_iter()
            .map(|item| FeedItem {
                id: item.guid,
                title: item.title,
                source: feed.name.clone(),
                published: item.pub_date,
                summary: item.description,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRelay;

    const FEED_JSON: &str = r#"{
        "items": [
            {"guid": "g1", "title": "Session opens", "pubDate": "2025-01-13", "description": "First day."},
            {"guid": "g2", "title": "Budget outlook", "pubDate": "2025-01-14", "description": "Forecast."}
        ]
    }"#;

    #[tokio::test]
    async fn dead_feed_does_not_take_down_the_batch() {
        // First feed answers HTML (parse failure), second answers JSON.
        let relay = ScriptedRelay::named("scripted")
            .text("<html>oops</html>")
            .text(FEED_JSON);
        let fetcher = Arc::new(RelayFetcher::with_relays(vec![Box::new(relay)]));

        let scanner = FeedScanner::new(
            fetcher,
            vec![
                FeedSource::new("https://a.test/feed", "Dead Feed", "Media"),
                FeedSource::new("https://b.test/feed", "Live Feed", "Media"),
            ],
        );

        let items = scanner.fetch_all().await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.source == "Live Feed"));
        assert_eq!(items[0].title, "Session opens");
    }

    #[tokio::test]
    async fn items_carry_their_feed_name() {
        let relay = ScriptedRelay::named("scripted").text(FEED_JSON);
        let fetcher = Arc::new(RelayFetcher::with_relays(vec![Box::new(relay)]));
        let scanner = FeedScanner::new(
            fetcher,
            vec![FeedSource::new("https://b.test/feed", "House Dems", "Official")],
        );

        let items = scanner.fetch_all().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "House Dems");
        assert_eq!(items[1].id, "g2");
    }
}
