//! Maps titles chosen by the ranking model back onto fetched articles.

use std::collections::HashSet;

use tracing::debug;

use crate::normalize::normalize;
use crate::types::{CandidateSet, Digest, DigestSelection};

/// Drops every title whose normalized form was already accepted, earlier in
/// the same topic or under a previous topic. Topics left empty are removed.
pub fn dedupe_across_topics(selection: &DigestSelection) -> DigestSelection {
    let mut seen = HashSet::new();
    let mut deduped = DigestSelection::new();

    for (topic, titles) in selection {
        let kept: Vec<String> = titles
            .iter()
            .filter(|title| {
                let fresh = seen.insert(normalize(title));
                if !fresh {
                    debug!("Dropping repeated headline '{}' under {}", title, topic);
                }
                fresh
            })
            .cloned()
            .collect();
        if !kept.is_empty() {
            deduped.insert(topic.clone(), kept);
        }
    }

    deduped
}

/// Builds the digest from the model's selection.
///
/// Each selected title is resolved to the first candidate article of the same
/// topic with an identical normalized title. Titles that match nothing are
/// discarded, so the digest only ever contains articles that were fetched.
pub fn reconcile(selection: &DigestSelection, candidates: &CandidateSet) -> Digest {
    let mut digest = Digest::new();

    for (topic, titles) in dedupe_across_topics(selection) {
        let Some(articles) = candidates.get(&topic) else {
            debug!("Model picked unknown topic '{}'", topic);
            continue;
        };

        let mut used = HashSet::new();
        let mut selected = Vec::new();
        for title in &titles {
            let target = normalize(title);
            if used.contains(&target) {
                continue;
            }
            match articles.iter().find(|a| normalize(&a.title) == target) {
                Some(article) => {
                    used.insert(target);
                    selected.push(article.clone());
                }
                None => debug!("No fetched article for '{}' under {}", title, topic),
            }
        }

        if !selected.is_empty() {
            digest.insert(topic, selected);
        }
    }

    digest
}
