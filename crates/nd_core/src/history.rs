//! Rolling record of headlines that have already been emailed.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::normalize::normalize;
use crate::types::{parse_published_at, topic_key, Digest, HistoryEntry};

/// Entries kept per topic key, most recent last.
pub const MAX_ENTRIES_PER_TOPIC: usize = 40;

/// Entries older than this are dropped by [`HistoryStore::prune`].
pub const RETENTION_DAYS: i64 = 30;

/// Serialized as a bare object of topic key to entries. Deserializing goes
/// through the `From` conversion, so empty topics never survive a load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "IndexMap<String, Vec<HistoryEntry>>")]
pub struct HistoryStore {
    topics: IndexMap<String, Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    pub fn topic_keys(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn entries(&self, key: &str) -> Option<&[HistoryEntry]> {
        self.topics.get(key).map(Vec::as_slice)
    }

    /// Every stored entry, across all topics, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HistoryEntry)> {
        self.topics
            .iter()
            .flat_map(|(key, entries)| entries.iter().map(move |entry| (key.as_str(), entry)))
    }

    /// Appends the articles of a sent digest under their topic keys.
    ///
    /// Articles whose normalized title is already recorded under the same key
    /// are skipped; each key is then truncated to its most recent
    /// [`MAX_ENTRIES_PER_TOPIC`] entries.
    pub fn record_sent(&mut self, digest: &Digest) {
        for (topic, articles) in digest {
            let key = topic_key(topic);
            let entries = self.topics.entry(key.clone()).or_default();
            let mut existing: HashSet<String> = entries.iter().map(|e| normalize(&e.title)).collect();

            for article in articles {
                if existing.insert(normalize(&article.title)) {
                    entries.push(HistoryEntry::from(article));
                } else {
                    debug!("History already holds '{}' under {}", article.title, key);
                }
            }

            if entries.len() > MAX_ENTRIES_PER_TOPIC {
                let excess = entries.len() - MAX_ENTRIES_PER_TOPIC;
                entries.drain(..excess);
            }
            if entries.is_empty() {
                self.topics.shift_remove(&key);
            }
        }
    }

    /// Drops entries published more than [`RETENTION_DAYS`] before `now`,
    /// entries whose date cannot be parsed, and any topic key left empty.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(RETENTION_DAYS);

        self.topics.retain(|key, entries| {
            entries.retain(|entry| match parse_published_at(&entry.published_at) {
                Some(published) => published.with_timezone(&Utc) >= cutoff,
                None => {
                    warn!(
                        "Skipping malformed publish date in history ({}): {:?}",
                        key, entry.published_at
                    );
                    false
                }
            });
            !entries.is_empty()
        });
    }
}

impl From<IndexMap<String, Vec<HistoryEntry>>> for HistoryStore {
    fn from(mut topics: IndexMap<String, Vec<HistoryEntry>>) -> Self {
        topics.retain(|_, entries| !entries.is_empty());
        Self { topics }
    }
}

impl Serialize for HistoryStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.topics.serialize(serializer)
    }
}
