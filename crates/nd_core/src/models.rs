use async_trait::async_trait;
use indexmap::IndexMap;

use crate::Result;

/// Everything the ranking model is told about one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingRequest {
    /// Candidate headlines per topic.
    pub headlines: IndexMap<String, Vec<String>>,
    /// Rendered user preferences.
    pub preferences: String,
    pub max_topics: usize,
    pub max_articles_per_topic: usize,
    pub demote_factor: f64,
}

impl RankingRequest {
    pub fn total_headlines(&self) -> usize {
        self.headlines.values().map(Vec::len).sum()
    }
}

#[async_trait]
pub trait RankingModel: Send + Sync {
    fn name(&self) -> &str;

    /// Asks the model to pick headlines. Returns the raw response text, which
    /// is expected, but not guaranteed, to be a JSON object of topic to titles.
    async fn rank(&self, request: &RankingRequest) -> Result<String>;
}
