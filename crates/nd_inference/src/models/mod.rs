use std::sync::Arc;

use nd_core::{Error, RankingModel, Result};

use crate::Config;

pub mod dummy;
pub mod gemini;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;

/// Builds the ranking model named by `config.model`.
pub fn create_model(config: Config) -> Result<Arc<dyn RankingModel>> {
    match config.model.to_lowercase().as_str() {
        "" | "gemini" => Ok(Arc::new(GeminiModel::new(config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Config(format!("Unknown ranking model: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_model() {
        let model = create_model(Config {
            model: "dummy".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(model.name(), "dummy");

        let model = create_model(Config {
            model: "Gemini".to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(model.name(), gemini::DEFAULT_MODEL);

        assert!(create_model(Config {
            model: "gpt".to_string(),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let err = create_model(Config {
            model: "gemini".to_string(),
            ..Default::default()
        })
        .err()
        .unwrap();
        assert_eq!(err.to_string(), "Configuration error: Gemini API key is required");
    }
}
