use async_trait::async_trait;
use nd_core::{DigestSender, Result};
use tracing::info;

/// Prints the digest instead of mailing it.
#[derive(Debug, Default)]
pub struct ConsoleSender;

#[async_trait]
impl DigestSender for ConsoleSender {
    async fn send(&self, html_body: &str, subject: &str) -> Result<()> {
        info!("Dry run: printing digest instead of sending it");
        println!("Subject: {}\n\n{}", subject, html_body);
        Ok(())
    }
}
