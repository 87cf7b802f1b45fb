use std::ops::RangeInclusive;
use std::str::FromStr;

use tracing::warn;

use crate::preferences::KeyValues;

pub const DEFAULT_MAX_ARTICLE_HOURS: i64 = 6;
pub const DEFAULT_MAX_TOPICS: usize = 7;
pub const DEFAULT_MAX_ARTICLES_PER_TOPIC: usize = 1;
pub const DEFAULT_DEMOTE_FACTOR: f64 = 0.5;
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
/// Longest accepted article age: one year.
pub const MAX_ARTICLE_HOURS_LIMIT: i64 = 24 * 365;

/// Run settings read from the remote key-value config table.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Feed items older than this many hours are ignored.
    pub max_article_hours: i64,
    pub max_topics: usize,
    pub max_articles_per_topic: usize,
    pub demote_factor: f64,
    /// IANA zone name used when rendering dates.
    pub timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_article_hours: DEFAULT_MAX_ARTICLE_HOURS,
            max_topics: DEFAULT_MAX_TOPICS,
            max_articles_per_topic: DEFAULT_MAX_ARTICLES_PER_TOPIC,
            demote_factor: DEFAULT_DEMOTE_FACTOR,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Settings {
    /// Overlays the known keys of `values` on the defaults. Values that do not
    /// parse are reported and left at their default.
    pub fn from_key_values(values: &KeyValues) -> Self {
        let defaults = Self::default();
        Self {
            max_article_hours: lookup_in_range(
                values,
                "MAX_ARTICLE_HOURS",
                1..=MAX_ARTICLE_HOURS_LIMIT,
                defaults.max_article_hours,
            ),
            max_topics: lookup(values, "MAX_TOPICS", defaults.max_topics),
            max_articles_per_topic: lookup(values, "MAX_ARTICLES_PER_TOPIC", defaults.max_articles_per_topic),
            demote_factor: lookup(values, "DEMOTE_FACTOR", defaults.demote_factor),
            timezone: values
                .get("TIMEZONE")
                .map(|tz| tz.trim().to_string())
                .filter(|tz| !tz.is_empty())
                .unwrap_or(defaults.timezone),
        }
    }
}

fn lookup<T>(values: &KeyValues, key: &str, default: T) -> T
where
    T: FromStr + Copy,
    T::Err: std::fmt::Display,
{
    let Some(raw) = values.get(key) else {
        return default;
    };
    let raw = raw.trim();
    // Sheets export whole numbers as "6.0" now and then.
    let parsed = raw
        .parse::<T>()
        .or_else(|e| raw.strip_suffix(".0").map(str::parse::<T>).unwrap_or(Err(e)));
    match parsed {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid value {:?} for {}: {}; using default", raw, key, e);
            default
        }
    }
}

fn lookup_in_range<T>(values: &KeyValues, key: &str, range: RangeInclusive<T>, default: T) -> T
where
    T: FromStr + Copy + PartialOrd + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let value = lookup(values, key, default);
    if range.contains(&value) {
        value
    } else {
        warn!(
            "Value {} for {} is outside {}..={}; using default",
            value,
            key,
            range.start(),
            range.end()
        );
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(rows: &[(&str, &str)]) -> KeyValues {
        rows.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_when_empty() {
        assert_eq!(Settings::from_key_values(&KeyValues::new()), Settings::default());
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let settings = Settings::from_key_values(&values(&[
            ("MAX_ARTICLE_HOURS", "12"),
            ("MAX_TOPICS", "five"),
            ("MAX_ARTICLES_PER_TOPIC", "3.0"),
            ("DEMOTE_FACTOR", "0.25"),
            ("TIMEZONE", "Europe/Madrid"),
            ("UNRELATED", "x"),
        ]));
        assert_eq!(settings.max_article_hours, 12);
        assert_eq!(settings.max_topics, DEFAULT_MAX_TOPICS);
        assert_eq!(settings.max_articles_per_topic, 3);
        assert_eq!(settings.demote_factor, 0.25);
        assert_eq!(settings.timezone, "Europe/Madrid");
    }

    #[test]
    fn test_out_of_range_article_hours_fall_back() {
        for raw in ["9999999999999", "0", "-4", "8761"] {
            let settings = Settings::from_key_values(&values(&[("MAX_ARTICLE_HOURS", raw)]));
            assert_eq!(settings.max_article_hours, DEFAULT_MAX_ARTICLE_HOURS, "value {}", raw);
        }
        let settings = Settings::from_key_values(&values(&[("MAX_ARTICLE_HOURS", "8760")]));
        assert_eq!(settings.max_article_hours, MAX_ARTICLE_HOURS_LIMIT);
    }
}
