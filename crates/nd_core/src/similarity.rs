use std::collections::HashSet;

use tracing::debug;

use crate::history::HistoryStore;
use crate::normalize::token_set;

/// Overlap ratio at or above which a candidate counts as already seen.
pub const MATCH_THRESHOLD: f64 = 0.4;

/// Share of the candidate's tokens that also appear in `past`.
///
/// The measure is containment, not Jaccard: the denominator is the candidate's
/// token count only. Returns `None` for a candidate without tokens.
pub fn overlap_ratio(candidate: &HashSet<String>, past: &HashSet<String>) -> Option<f64> {
    if candidate.is_empty() {
        return None;
    }
    let shared = candidate.intersection(past).count();
    Some(shared as f64 / candidate.len() as f64)
}

/// Whether `title` matches any headline in `history`, across every topic.
pub fn is_duplicate(title: &str, history: &HistoryStore) -> bool {
    let candidate = token_set(title);
    if candidate.is_empty() {
        return false;
    }

    for (key, entry) in history.iter() {
        let past = token_set(&entry.title);
        if past.is_empty() {
            continue;
        }
        if let Some(ratio) = overlap_ratio(&candidate, &past) {
            if ratio >= MATCH_THRESHOLD {
                debug!(
                    "'{}' matches '{}' from {} (overlap {:.2})",
                    title, entry.title, key, ratio
                );
                return true;
            }
        }
    }

    false
}
