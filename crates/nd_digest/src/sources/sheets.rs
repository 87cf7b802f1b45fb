use std::time::Duration;

use async_trait::async_trait;
use nd_core::{Error, KeyValueSource, KeyValues, Result};
use reqwest::Client;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Two-column CSV tables, either published spreadsheets or local files.
#[derive(Debug, Clone)]
pub struct SheetSource {
    client: Client,
}

impl SheetSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }

    async fn read(&self, location: &str) -> Result<String> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let text = self
                .client
                .get(location)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            Ok(text)
        } else {
            Ok(tokio::fs::read_to_string(location).await?)
        }
    }
}

#[async_trait]
impl KeyValueSource for SheetSource {
    async fn load_key_values(&self, location: &str) -> Result<KeyValues> {
        let text = self.read(location).await?;
        let values = parse_key_values(&text)?;
        debug!("Loaded {} rows from {}", values.len(), location);
        Ok(values)
    }
}

/// Reads the first two columns of every row after the header. Shorter rows
/// are ignored; later duplicates replace earlier values.
pub fn parse_key_values(text: &str) -> Result<KeyValues> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut values = KeyValues::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Config(format!("Malformed CSV: {}", e)))?;
        if let (Some(key), Some(value)) = (record.get(0), record.get(1)) {
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(values)
}
