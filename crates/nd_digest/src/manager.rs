use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use indexmap::IndexMap;
use nd_core::{
    is_duplicate, reconcile, Article, CandidateSet, DigestSender, HeadlineSource, HistoryStorage, HistoryStore,
    PreferenceModel, RankingModel, RankingRequest, Result, Settings,
};
use nd_inference::parse_selection;

use crate::logging::Logger;
use crate::render::{self, Footer};

/// Topic feeds fetched at the same time.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub settings: Settings,
    pub preferences: PreferenceModel,
    /// Send as usual but leave the stored history untouched.
    pub dry_run: bool,
    pub fetch_concurrency: usize,
    /// Linked from the email footer.
    pub preferences_url: Option<String>,
}

impl RunOptions {
    pub fn new(settings: Settings, preferences: PreferenceModel) -> Self {
        Self {
            settings,
            preferences,
            dry_run: false,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            preferences_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every headline was filtered out or no feed returned anything.
    NoCandidates,
    /// The model's answer matched none of the candidates.
    NothingSelected,
    Sent { topics: usize, articles: usize },
}

/// Drives one digest cycle: fetch, filter, rank, reconcile, send, record.
pub struct DigestManager {
    headlines: Arc<dyn HeadlineSource>,
    model: Arc<dyn RankingModel>,
    sender: Arc<dyn DigestSender>,
    storage: Arc<dyn HistoryStorage>,
    options: RunOptions,
    logger: Logger,
}

impl DigestManager {
    pub fn new(
        headlines: Arc<dyn HeadlineSource>,
        model: Arc<dyn RankingModel>,
        sender: Arc<dyn DigestSender>,
        storage: Arc<dyn HistoryStorage>,
        options: RunOptions,
    ) -> Self {
        Self {
            headlines,
            model,
            sender,
            storage,
            options,
            logger: Logger::new(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let mut history = self.storage.load().await?;
        self.logger.debug(&format!("History holds {} entries", history.len()));

        let candidates = self.collect_candidates(&history).await;
        if candidates.is_empty() {
            self.logger.info("No headlines available for ranking.");
            return Ok(RunOutcome::NoCandidates);
        }

        let settings = &self.options.settings;
        let request = RankingRequest {
            headlines: candidates
                .iter()
                .map(|(topic, articles)| (topic.clone(), articles.iter().map(|a| a.title.clone()).collect()))
                .collect(),
            preferences: self.options.preferences.render(settings.demote_factor),
            max_topics: settings.max_topics,
            max_articles_per_topic: settings.max_articles_per_topic,
            demote_factor: settings.demote_factor,
        };
        let total_headlines = request.total_headlines();
        self.logger.info(&format!(
            "Sending {} headlines across {} topics to {}.",
            total_headlines,
            request.headlines.len(),
            self.model.name()
        ));

        let raw = self.model.rank(&request).await?;
        let selection = parse_selection(&raw);
        let digest = reconcile(&selection, &candidates);
        if digest.is_empty() {
            self.logger.info(&format!("{} returned no digest-worthy content.", self.model.name()));
            return Ok(RunOutcome::NothingSelected);
        }

        let tz = render::resolve_timezone(&settings.timezone);
        let footer = Footer {
            model_name: self.model.name(),
            total_headlines,
            max_article_hours: settings.max_article_hours,
            preferences_url: self.options.preferences_url.as_deref(),
        };
        let html = render::render_html(&digest, tz, &footer);
        let subject = render::subject(now, tz);

        self.sender.send(&html, &subject).await?;
        let outcome = RunOutcome::Sent {
            topics: digest.len(),
            articles: digest.values().map(Vec::len).sum(),
        };

        if self.options.dry_run {
            self.logger.info("Dry run, history left unchanged.");
            return Ok(outcome);
        }

        history.record_sent(&digest);
        history.prune(now);
        self.storage.persist(&history).await?;
        self.logger.info(&format!("History now holds {} entries", history.len()));

        Ok(outcome)
    }

    /// Fetches every preferred topic and keeps headlines that are neither
    /// near-duplicates of sent ones nor banned. Topics keep preference order.
    async fn collect_candidates(&self, history: &HistoryStore) -> CandidateSet {
        let topics: Vec<&String> = self.options.preferences.topics.keys().collect();
        let concurrency = self.options.fetch_concurrency.max(1);

        let fetched: Vec<(&String, Vec<Article>)> = stream::iter(topics)
            .map(|topic| async move { (topic, self.fetch_topic(topic).await) })
            .buffered(concurrency)
            .collect()
            .await;

        let mut candidates = IndexMap::new();
        for (topic, articles) in fetched {
            let logger = self.logger.clone().with_prefix(format!("[{}]", topic));
            let fetched_count = articles.len();
            let allowed: Vec<Article> = articles
                .into_iter()
                .filter(|a| !is_duplicate(&a.title, history) && !self.options.preferences.is_banned(&a.title))
                .collect();
            logger.debug(&format!("{} of {} headlines kept", allowed.len(), fetched_count));
            if !allowed.is_empty() {
                candidates.insert(topic.clone(), allowed);
            }
        }
        candidates
    }

    async fn fetch_topic(&self, topic: &str) -> Vec<Article> {
        match self.headlines.fetch(topic).await {
            Ok(articles) => articles,
            Err(e) => {
                self.logger
                    .clone()
                    .with_prefix(format!("[{}]", topic))
                    .warn(&format!("Failed to fetch articles from {}: {}", self.headlines.name(), e));
                Vec::new()
            }
        }
    }
}
