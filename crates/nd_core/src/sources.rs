use async_trait::async_trait;

use crate::preferences::KeyValues;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait HeadlineSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches recent headlines for `topic`, newest feed order preserved.
    async fn fetch(&self, topic: &str) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait KeyValueSource: Send + Sync {
    /// Loads a two-column key-value table from `location`.
    async fn load_key_values(&self, location: &str) -> Result<KeyValues>;
}
