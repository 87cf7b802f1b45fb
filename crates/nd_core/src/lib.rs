pub mod config;
pub mod delivery;
pub mod error;
pub mod history;
mod lemma;
pub mod models;
pub mod normalize;
pub mod preferences;
pub mod reconcile;
pub mod similarity;
pub mod sources;
pub mod storage;
pub mod types;

pub use config::Settings;
pub use delivery::DigestSender;
pub use error::{Error, Result};
pub use history::HistoryStore;
pub use models::{RankingModel, RankingRequest};
pub use normalize::normalize;
pub use preferences::{KeyValues, OverrideKind, PreferenceModel};
pub use reconcile::reconcile;
pub use similarity::is_duplicate;
pub use sources::{HeadlineSource, KeyValueSource};
pub use storage::HistoryStorage;
pub use types::{topic_key, Article, CandidateSet, Digest, DigestSelection, HistoryEntry};

pub mod prelude {
    pub use super::{Article, Digest, DigestSelection, Error, HistoryStore, Result};
}
