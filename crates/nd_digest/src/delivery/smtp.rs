use std::fmt;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use nd_core::{DigestSender, Error, Result};
use tracing::info;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
const PLAIN_TEXT_BODY: &str = "This is the plain-text version of your digest.";

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Login name, also used as both From and To.
    pub username: String,
    pub password: String,
    /// Blind-copied readers.
    pub recipients: Vec<String>,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl SmtpConfig {
    /// Splits a comma separated recipient list, dropping blanks.
    pub fn parse_recipients(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Sends the digest over SMTP with STARTTLS.
#[derive(Debug)]
pub struct SmtpSender {
    config: SmtpConfig,
}

impl SmtpSender {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        if config.username.trim().is_empty() {
            return Err(Error::Config("SMTP username is required".to_string()));
        }
        Ok(Self { config })
    }

    fn build_message(&self, html_body: &str, subject: &str) -> Result<Message> {
        let sender: Mailbox = self
            .config
            .username
            .trim()
            .parse()
            .map_err(|e| Error::Delivery(format!("Invalid sender address: {}", e)))?;

        let mut builder = Message::builder()
            .from(sender.clone())
            .to(sender)
            .subject(subject);
        for recipient in &self.config.recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| Error::Delivery(format!("Invalid recipient {}: {}", recipient, e)))?;
            builder = builder.bcc(mailbox);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                PLAIN_TEXT_BODY.to_string(),
                html_body.to_string(),
            ))
            .map_err(|e| Error::Delivery(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl DigestSender for SmtpSender {
    async fn send(&self, html_body: &str, subject: &str) -> Result<()> {
        let message = self.build_message(html_body, subject)?;
        let transport = SmtpTransport::starttls_relay(&self.config.host)
            .map_err(|e| Error::Delivery(format!("SMTP relay init failed: {}", e)))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.trim().to_string(),
                self.config.password.clone(),
            ))
            .build();

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| Error::Delivery(format!("SMTP task failed: {}", e)))?
            .map_err(|e| Error::Delivery(format!("SMTP send failed: {}", e)))?;

        info!(
            "Digest email sent to {} recipient(s)",
            self.config.recipients.len() + 1
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(recipients: &str) -> SmtpConfig {
        SmtpConfig {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: "digest@example.com".to_string(),
            password: "app-password".to_string(),
            recipients: SmtpConfig::parse_recipients(recipients),
        }
    }

    #[test]
    fn test_parse_recipients() {
        assert_eq!(
            SmtpConfig::parse_recipients(" a@example.com, ,b@example.com,"),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
        assert!(SmtpConfig::parse_recipients("").is_empty());
    }

    #[test]
    fn test_message_envelope_includes_bcc() {
        let sender = SmtpSender::new(config("reader@example.com")).unwrap();
        let message = sender.build_message("<h2>Your News</h2>", "News").unwrap();

        let to: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert!(to.contains(&"digest@example.com".to_string()));
        assert!(to.contains(&"reader@example.com".to_string()));
        assert_eq!(
            message.envelope().from().map(|a| a.to_string()),
            Some("digest@example.com".to_string())
        );
    }

    #[test]
    fn test_invalid_recipient_is_rejected() {
        let sender = SmtpSender::new(config("not an address")).unwrap();
        assert!(matches!(sender.build_message("<p></p>", "News"), Err(Error::Delivery(_))));
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", config(""));
        assert!(!debug.contains("app-password"));
    }

    #[test]
    fn test_username_required() {
        let mut cfg = config("");
        cfg.username = " ".to_string();
        assert!(SmtpSender::new(cfg).is_err());
    }
}
