use async_trait::async_trait;
use indexmap::IndexMap;
use nd_core::{RankingModel, RankingRequest, Result};

/// Offline stand-in that keeps the first topics and headlines in request order.
#[derive(Debug, Default)]
pub struct DummyModel;

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RankingModel for DummyModel {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn rank(&self, request: &RankingRequest) -> Result<String> {
        let picks: IndexMap<&String, Vec<&String>> = request
            .headlines
            .iter()
            .filter(|(_, titles)| !titles.is_empty())
            .take(request.max_topics)
            .map(|(topic, titles)| (topic, titles.iter().take(request.max_articles_per_topic).collect()))
            .collect();
        Ok(serde_json::to_string(&picks)?)
    }
}
