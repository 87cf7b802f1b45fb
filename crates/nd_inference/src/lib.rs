pub mod models;
pub mod parser;
pub mod prompt;

/// Settings for constructing a ranking model.
#[derive(Clone, Default)]
pub struct Config {
    /// Which model to use: `gemini` or `dummy`.
    pub model: String,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::parser::{parse_selection, ParseOutcome, ParseStage};
    pub use super::Config;
    pub use nd_core::{DigestSelection, Error, RankingModel, RankingRequest, Result};
}

pub use models::create_model;
pub use parser::parse_selection;
