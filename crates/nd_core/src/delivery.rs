use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait DigestSender: Send + Sync {
    async fn send(&self, html_body: &str, subject: &str) -> Result<()>;
}
