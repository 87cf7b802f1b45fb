//! User preferences: topic and keyword weights plus ban/demote overrides.

use std::fmt::Write;
use std::str::FromStr;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::normalize::normalize;

/// Raw rows of a key-value table, header excluded.
pub type KeyValues = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    Ban,
    Demote,
}

impl FromStr for OverrideKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ban" => Ok(Self::Ban),
            "demote" => Ok(Self::Demote),
            other => Err(format!("unknown override kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceModel {
    pub topics: IndexMap<String, u8>,
    pub keywords: IndexMap<String, u8>,
    pub overrides: IndexMap<String, OverrideKind>,
}

impl PreferenceModel {
    pub fn from_tables(topics: &KeyValues, keywords: &KeyValues, overrides: &KeyValues) -> Self {
        Self {
            topics: parse_weights(topics),
            keywords: parse_weights(keywords),
            overrides: parse_overrides(overrides),
        }
    }

    pub fn banned_terms(&self) -> Vec<&str> {
        self.terms_of(OverrideKind::Ban)
    }

    pub fn demoted_terms(&self) -> Vec<&str> {
        self.terms_of(OverrideKind::Demote)
    }

    fn terms_of(&self, kind: OverrideKind) -> Vec<&str> {
        self.overrides
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(term, _)| term.as_str())
            .collect()
    }

    /// Whether any banned term occurs in the normalized form of `title`.
    pub fn is_banned(&self, title: &str) -> bool {
        let text = normalize(title);
        self.banned_terms().into_iter().any(|term| {
            let term = normalize(term);
            !term.is_empty() && text.contains(&term)
        })
    }

    /// Text rendering handed to the ranking model.
    pub fn render(&self, demote_factor: f64) -> String {
        let mut sections = Vec::new();

        if !self.topics.is_empty() {
            sections.push(ranked_section("User topics (ranked 1-5 in importance):", &self.topics));
        }
        if !self.keywords.is_empty() {
            sections.push(ranked_section(
                "Headline keywords (ranked 1-5 in importance):",
                &self.keywords,
            ));
        }

        let banned = self.banned_terms();
        if !banned.is_empty() {
            sections.push(list_section(
                "Banned terms (must not appear in topics or headlines):",
                &banned,
            ));
        }

        let demoted = self.demoted_terms();
        if !demoted.is_empty() {
            let header = format!(
                "Demoted terms (consider headlines with these terms {} times as important to the user, all else equal):",
                demote_factor
            );
            sections.push(list_section(&header, &demoted));
        }

        sections.join("\n\n")
    }
}

fn ranked_section(header: &str, weights: &IndexMap<String, u8>) -> String {
    let mut ranked: Vec<(&String, &u8)> = weights.iter().collect();
    // Stable, so equal scores keep table order.
    ranked.sort_by(|a, b| b.1.cmp(a.1));

    let mut out = header.to_string();
    for (name, score) in ranked {
        let _ = write!(out, "\n- {}: {}", name, score);
    }
    out
}

fn list_section(header: &str, terms: &[&str]) -> String {
    let mut out = header.to_string();
    for term in terms {
        let _ = write!(out, "\n- {}", term);
    }
    out
}

/// Importance scores run from 1 (lowest) to 5 (highest).
pub const SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Parses importance scores, skipping rows whose value is not an integer in
/// [`SCORE_RANGE`].
pub fn parse_weights(rows: &KeyValues) -> IndexMap<String, u8> {
    let mut weights = IndexMap::new();
    for (key, value) in rows {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        match value.trim().parse::<u8>() {
            Ok(score) if SCORE_RANGE.contains(&score) => {
                weights.insert(key.to_string(), score);
            }
            Ok(score) => warn!("Skipping weight row '{}' = {:?}: score {} is not between 1 and 5", key, value, score),
            Err(e) => warn!("Skipping weight row '{}' = {:?}: {}", key, value, e),
        }
    }
    weights
}

/// Parses ban/demote overrides. Terms are lowercased; unknown kinds are skipped.
pub fn parse_overrides(rows: &KeyValues) -> IndexMap<String, OverrideKind> {
    let mut overrides = IndexMap::new();
    for (term, kind) in rows {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            continue;
        }
        match kind.parse::<OverrideKind>() {
            Ok(kind) => {
                overrides.insert(term, kind);
            }
            Err(e) => debug!("Ignoring override '{}': {}", term, e),
        }
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str)]) -> KeyValues {
        rows.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn model() -> PreferenceModel {
        PreferenceModel::from_tables(
            &table(&[("Technology", "3"), ("Climate", "5"), ("Gardening", "lots")]),
            &table(&[("AI", "4"), ("", "2")]),
            &table(&[("Celebrity", "BAN"), ("opinion", "demote"), ("weather", "maybe")]),
        )
    }

    #[test]
    fn test_non_numeric_rows_are_skipped() {
        let prefs = model();
        assert_eq!(prefs.topics.len(), 2);
        assert!(!prefs.topics.contains_key("Gardening"));
        assert_eq!(prefs.keywords.len(), 1);
    }

    #[test]
    fn test_out_of_range_scores_are_skipped() {
        let weights = parse_weights(&table(&[("Zero", "0"), ("Six", "6"), ("Max", "255"), ("Low", "1"), ("High", " 5 ")]));
        assert_eq!(weights.keys().collect::<Vec<_>>(), vec!["Low", "High"]);
        assert_eq!(weights["High"], 5);
    }

    #[test]
    fn test_overrides() {
        let prefs = model();
        assert_eq!(prefs.banned_terms(), vec!["celebrity"]);
        assert_eq!(prefs.demoted_terms(), vec!["opinion"]);
        assert!(!prefs.overrides.contains_key("weather"));
    }

    #[test]
    fn test_is_banned_matches_normalized_forms() {
        let prefs = model();
        assert!(prefs.is_banned("Celebrities attend gala"));
        assert!(prefs.is_banned("New CELEBRITY feud"));
        assert!(!prefs.is_banned("Senate passes budget"));
    }

    #[test]
    fn test_render_orders_by_score() {
        let text = model().render(0.5);
        let climate = text.find("- Climate: 5").unwrap();
        let tech = text.find("- Technology: 3").unwrap();
        assert!(climate < tech);
        assert!(text.contains("Banned terms (must not appear in topics or headlines):\n- celebrity"));
        assert!(text.contains("these terms 0.5 times as important"));
        assert!(text.contains("\n- opinion"));
    }

    #[test]
    fn test_render_empty_model() {
        assert_eq!(PreferenceModel::default().render(0.5), "");
    }
}
