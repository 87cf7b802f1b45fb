use std::collections::BTreeMap;

use nd_core::{RankingRequest, Result};

/// Builds the instruction text sent to the ranking model.
pub fn build_prompt(request: &RankingRequest) -> Result<String> {
    let sorted: BTreeMap<&String, &Vec<String>> = request.headlines.iter().collect();
    let headlines = serde_json::to_string_pretty(&sorted)?;

    let max_topics = request.max_topics;
    let per_topic = request.max_articles_per_topic;
    let demote = request.demote_factor;

    Ok(format!(
        "You are choosing the most relevant news topics and headlines to include in an email digest for a user based on their specific preferences.\n\
         Given a dictionary of headlines retrieved for specific topics, and the user's preferences, select up to {max_topics} of the most important topics to include in the digest.\n\
         For each selected topic, return the top {per_topic} most important headlines to include in the digest.\n\
         Respond only with valid JSON. Ensure you respond **WITH VALID JSON ONLY** like:\n\
         {{ \"Technology\": [\"Headline A\", \"Headline B\"], \"Climate\": [\"Headline C\"] }}\n\n\
         Ensure you **do not return multiple copies of the same or similar headlines** that are covering roughly the same thing, even if they are in different topics.\n\
         Avoid all local news, for example any headlines containing a regional town or county name. Focus on U.S. News.\n\
         Respect the user's importance preferences for topics and keywords, with 1 the lowest and 5 the highest.\n\
         Reject any headlines containing terms flagged 'banned', and demote headlines with terms flagged 'demote' by a multiplier of {demote}.\n\
         Reject all advertisements and mentions of specific products or services unless it is newsworthy criticism.\n\
         There should be a healthy diversity of subjects covered overall in your article recommendations. Do not focus on one theme.\n\
         Prefer to recommend content-rich and informative headlines over any clickbait or filler or questions or lists.\n\
         Again, there can only be up to {max_topics} topics in your response, and up to {per_topic} articles per topic.\n\
         User Preferences:\n{preferences}\n\n\
         Topics and Headlines:\n{headlines}\n",
        preferences = request.preferences,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn request() -> RankingRequest {
        let mut headlines = IndexMap::new();
        headlines.insert("World".to_string(), vec!["Summit opens".to_string()]);
        headlines.insert("Climate".to_string(), vec!["Glacier melt speeds up".to_string()]);
        RankingRequest {
            headlines,
            preferences: "User topics (ranked 1-5 in importance):\n- Climate: 5".to_string(),
            max_topics: 7,
            max_articles_per_topic: 2,
            demote_factor: 0.5,
        }
    }

    #[test]
    fn test_prompt_carries_limits_and_preferences() {
        let prompt = build_prompt(&request()).unwrap();
        assert!(prompt.contains("select up to 7 of the most important topics"));
        assert!(prompt.contains("return the top 2 most important headlines"));
        assert!(prompt.contains("by a multiplier of 0.5."));
        assert!(prompt.contains("User Preferences:\nUser topics (ranked 1-5 in importance):\n- Climate: 5\n\n"));
        assert!(prompt.contains("{ \"Technology\": [\"Headline A\", \"Headline B\"], \"Climate\": [\"Headline C\"] }"));
    }

    #[test]
    fn test_headlines_are_sorted_by_topic() {
        let prompt = build_prompt(&request()).unwrap();
        let climate = prompt.find("\"Climate\": [\n").unwrap();
        let world = prompt.find("\"World\": [\n").unwrap();
        assert!(climate < world);
        assert!(prompt.ends_with("}\n"));
    }
}
