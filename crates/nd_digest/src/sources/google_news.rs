use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nd_core::types::parse_published_at;
use nd_core::{Article, Error, HeadlineSource, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "https://news.google.com/rss/search";
pub const DEFAULT_MAX_ARTICLES: usize = 10;
const USER_AGENT: &str = "Mozilla/5.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Recent headlines for a topic from the Google News search feed.
#[derive(Debug, Clone)]
pub struct GoogleNewsSource {
    client: Client,
    search_url: String,
    max_age: chrono::Duration,
    max_articles: usize,
}

impl GoogleNewsSource {
    pub fn new(max_article_hours: i64) -> Result<Self> {
        let max_age = chrono::Duration::try_hours(max_article_hours)
            .ok_or_else(|| Error::Config(format!("Article age of {} hours is out of range", max_article_hours)))?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            max_age,
            max_articles: DEFAULT_MAX_ARTICLES,
        })
    }

    pub fn with_search_url(mut self, search_url: impl Into<String>) -> Self {
        self.search_url = search_url.into();
        self
    }

    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = max_articles;
        self
    }

    pub fn feed_url(&self, topic: &str) -> Result<Url> {
        Url::parse_with_params(&self.search_url, &[("q", topic)])
            .map_err(|e| Error::Feed(format!("Invalid feed URL for {}: {}", topic, e)))
    }
}

#[async_trait]
impl HeadlineSource for GoogleNewsSource {
    fn name(&self) -> &str {
        "Google News"
    }

    async fn fetch(&self, topic: &str) -> Result<Vec<Article>> {
        let url = self.feed_url(topic)?;
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let cutoff = Utc::now()
            .checked_sub_signed(self.max_age)
            .ok_or_else(|| Error::Config(format!("Article age window {} is out of range", self.max_age)))?;
        parse_feed(&body, cutoff, self.max_articles)
    }
}

/// Extracts up to `limit` items published after `cutoff`, in feed order.
///
/// Items without a parseable `pubDate` are skipped. A missing title becomes
/// "No title".
pub fn parse_feed(content: &[u8], cutoff: DateTime<Utc>, limit: usize) -> Result<Vec<Article>> {
    let channel = rss::Channel::read_from(content).map_err(|e| Error::Feed(format!("Invalid RSS: {}", e)))?;

    let mut articles = Vec::new();
    for item in channel.items() {
        if articles.len() >= limit {
            break;
        }
        let Some(pub_date) = item.pub_date() else {
            continue;
        };
        let Some(published) = parse_published_at(pub_date) else {
            debug!("Skipping item with malformed pubDate {:?}", pub_date);
            continue;
        };
        if published.with_timezone(&Utc) <= cutoff {
            continue;
        }
        articles.push(Article::new(
            item.title().unwrap_or("No title"),
            item.link().unwrap_or_default(),
            pub_date,
        ));
    }

    Ok(articles)
}
