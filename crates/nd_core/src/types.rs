use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A headline as fetched from a feed. `published_at` is the feed's own date
/// string, kept verbatim so it can be re-parsed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    #[serde(rename = "publishedAt", alias = "pubDate")]
    pub published_at: String,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>, published_at: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at: published_at.into(),
        }
    }

    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        parse_published_at(&self.published_at)
    }
}

/// Reduced form of an [`Article`] kept in the sent history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    #[serde(rename = "publishedAt", alias = "pubDate")]
    pub published_at: String,
}

impl From<&Article> for HistoryEntry {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            published_at: article.published_at.clone(),
        }
    }
}

/// Articles available for selection this run, per topic, in fetch order.
pub type CandidateSet = IndexMap<String, Vec<Article>>;

/// Titles picked by the ranking model, per topic.
pub type DigestSelection = IndexMap<String, Vec<String>>;

/// The reconciled digest: full article records per topic.
pub type Digest = IndexMap<String, Vec<Article>>;

/// Storage-safe key for a topic name.
pub fn topic_key(topic: &str) -> String {
    topic.replace(' ', "_").to_lowercase()
}

/// Parses a feed date. RSS uses RFC 2822; RFC 3339 is accepted as well.
pub fn parse_published_at(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}
