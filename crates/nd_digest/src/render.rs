//! HTML body and subject line of the digest email.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use nd_core::config::DEFAULT_TIMEZONE;
use nd_core::Digest;
use tracing::warn;

/// Details shown in the footer.
#[derive(Debug, Clone)]
pub struct Footer<'a> {
    pub model_name: &'a str,
    /// Headlines the model chose from.
    pub total_headlines: usize,
    pub max_article_hours: i64,
    pub preferences_url: Option<&'a str>,
}

/// Resolves an IANA zone name, falling back to the default zone.
pub fn resolve_timezone(name: &str) -> Tz {
    match name.trim().parse::<Tz>() {
        Ok(tz) => tz,
        Err(e) => {
            warn!(
                "Invalid TIMEZONE '{}' in config ({}). Falling back to '{}'",
                name, e, DEFAULT_TIMEZONE
            );
            chrono_tz::America::New_York
        }
    }
}

pub fn subject(now: DateTime<Utc>, tz: Tz) -> String {
    format!("🗞️ News – {}", now.with_timezone(&tz).format("%Y-%m-%d %I:%M %p %Z"))
}

pub fn render_html(digest: &Digest, tz: Tz, footer: &Footer<'_>) -> String {
    let mut html = String::from("<h2>Your News</h2>");

    for (topic, articles) in digest {
        let _ = write!(
            html,
            r#"<h3 style="margin: 0 0 0 0;">{}</h3>"#,
            html_escape::encode_text(topic)
        );
        for article in articles {
            let date = match article.published() {
                Some(published) => published
                    .with_timezone(&tz)
                    .format("%a, %d %b %Y %I:%M %p %Z")
                    .to_string(),
                None => article.published_at.clone(),
            };
            let _ = write!(
                html,
                concat!(
                    r#"<p style="margin: 0.4em 0 1.2em 0;">"#,
                    r#"📰 <a href="{}" target="_blank">{}</a><br>"#,
                    r#"<span style="font-size: 0.9em;">📅 {}</span>"#,
                    "</p>"
                ),
                html_escape::encode_double_quoted_attribute(&article.link),
                html_escape::encode_text(&article.title),
                html_escape::encode_text(&date),
            );
        }
    }

    let preferences = match footer.preferences_url {
        Some(url) => format!(
            r#"<a href="{}">preferences</a>"#,
            html_escape::encode_double_quoted_attribute(url)
        ),
        None => "preferences".to_string(),
    };
    let _ = write!(
        html,
        "<hr><small>{} recommends these articles among {} published in the last {} hours based on your {}.</small>",
        html_escape::encode_text(footer.model_name),
        footer.total_headlines,
        footer.max_article_hours,
        preferences
    );

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nd_core::Article;

    fn footer() -> Footer<'static> {
        Footer {
            model_name: "gemini-2.0-flash",
            total_headlines: 12,
            max_article_hours: 6,
            preferences_url: None,
        }
    }

    #[test]
    fn test_render_escapes_and_localizes() {
        let mut digest = Digest::new();
        digest.insert(
            "Science & Tech".to_string(),
            vec![Article::new(
                "Chips <rally>",
                "https://news.example/a?x=1&y=\"2\"",
                "Tue, 03 Jun 2025 14:05:00 GMT",
            )],
        );

        let html = render_html(&digest, chrono_tz::America::New_York, &footer());

        assert!(html.starts_with("<h2>Your News</h2>"));
        assert!(html.contains("Science &amp; Tech"));
        assert!(html.contains("Chips &lt;rally&gt;"));
        assert!(html.contains("href=\"https://news.example/a?x=1&amp;y=&quot;2&quot;\""));
        assert!(html.contains("📅 Tue, 03 Jun 2025 10:05 AM EDT"));
        assert!(html.contains("gemini-2.0-flash recommends these articles among 12 published in the last 6 hours"));
    }

    #[test]
    fn test_unparseable_date_is_shown_verbatim() {
        let mut digest = Digest::new();
        digest.insert("Tech".to_string(), vec![Article::new("t", "https://l", "yesterday")]);
        let html = render_html(&digest, chrono_tz::UTC, &footer());
        assert!(html.contains("📅 yesterday"));
    }

    #[test]
    fn test_preferences_link() {
        let mut footer = footer();
        footer.preferences_url = Some("https://sheets.example/prefs");
        let html = render_html(&Digest::new(), chrono_tz::UTC, &footer);
        assert!(html.ends_with(r#"based on your <a href="https://sheets.example/prefs">preferences</a>.</small>"#));
    }

    #[test]
    fn test_subject_and_timezone() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 13, 30, 0).unwrap();
        assert_eq!(subject(now, chrono_tz::America::New_York), "🗞️ News – 2025-01-15 08:30 AM EST");
        assert_eq!(resolve_timezone("Europe/Madrid"), chrono_tz::Europe::Madrid);
        assert_eq!(resolve_timezone("Mars/Olympus"), chrono_tz::America::New_York);
    }
}
