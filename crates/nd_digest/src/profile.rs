//! Loads run settings and user preferences from the four key-value tables.

use nd_core::{Error, KeyValueSource, KeyValues, PreferenceModel, Result, Settings};
use tracing::info;

/// Where each table lives: a URL or a local path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetLocations {
    pub config: String,
    pub topics: String,
    pub keywords: String,
    pub overrides: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub settings: Settings,
    pub preferences: PreferenceModel,
}

/// Fetches all four tables. Any table that cannot be loaded fails the run.
pub async fn load_profile(source: &dyn KeyValueSource, locations: &SheetLocations) -> Result<Profile> {
    let (config, topics, keywords, overrides) = tokio::try_join!(
        load_table(source, "config", &locations.config),
        load_table(source, "topics", &locations.topics),
        load_table(source, "keywords", &locations.keywords),
        load_table(source, "overrides", &locations.overrides),
    )?;

    let settings = Settings::from_key_values(&config);
    let preferences = PreferenceModel::from_tables(&topics, &keywords, &overrides);
    info!(
        "Loaded {} topics, {} keywords and {} overrides",
        preferences.topics.len(),
        preferences.keywords.len(),
        preferences.overrides.len()
    );

    Ok(Profile { settings, preferences })
}

async fn load_table(source: &dyn KeyValueSource, name: &str, location: &str) -> Result<KeyValues> {
    if location.trim().is_empty() {
        return Err(Error::Config(format!("No location configured for the {} table", name)));
    }
    source
        .load_key_values(location)
        .await
        .map_err(|e| Error::Config(format!("Failed to load {} table from {}: {}", name, location, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeSheets(HashMap<&'static str, Vec<(&'static str, &'static str)>>);

    #[async_trait]
    impl KeyValueSource for FakeSheets {
        async fn load_key_values(&self, location: &str) -> Result<KeyValues> {
            self.0
                .get(location)
                .map(|rows| rows.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
                .ok_or_else(|| Error::Feed(format!("404 for {}", location)))
        }
    }

    fn locations() -> SheetLocations {
        SheetLocations {
            config: "config".to_string(),
            topics: "topics".to_string(),
            keywords: "keywords".to_string(),
            overrides: "overrides".to_string(),
        }
    }

    fn sheets() -> FakeSheets {
        let mut tables = HashMap::new();
        tables.insert("config", vec![("MAX_TOPICS", "3")]);
        tables.insert("topics", vec![("Technology", "4"), ("World", "5")]);
        tables.insert("keywords", vec![("AI", "2")]);
        tables.insert("overrides", vec![("celebrity", "ban")]);
        FakeSheets(tables)
    }

    #[tokio::test]
    async fn test_load_profile() {
        let profile = load_profile(&sheets(), &locations()).await.unwrap();
        assert_eq!(profile.settings.max_topics, 3);
        assert_eq!(profile.settings.max_article_hours, 6);
        assert_eq!(profile.preferences.topics.len(), 2);
        assert_eq!(profile.preferences.banned_terms(), vec!["celebrity"]);
    }

    #[tokio::test]
    async fn test_missing_table_is_fatal() {
        let mut sheets = sheets();
        sheets.0.remove("keywords");
        let err = load_profile(&sheets, &locations()).await.unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("keywords")));
    }

    #[tokio::test]
    async fn test_blank_location_is_fatal() {
        let mut locations = locations();
        locations.overrides.clear();
        assert!(load_profile(&sheets(), &locations).await.is_err());
    }
}
