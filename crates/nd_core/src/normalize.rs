//! Headline normalization used for every fuzzy comparison in the pipeline.

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};

use crate::lemma::lemmatize;

/// Upper bound on stem/lemmatize passes for a single token.
const MAX_REDUCTION_ROUNDS: usize = 8;

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Lowercases `text`, splits it on whitespace and reduces every token to its
/// root form. Tokens are joined back with single spaces.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .map(reduce_token)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Token set of the normalized form of `text`.
pub fn token_set(text: &str) -> std::collections::HashSet<String> {
    normalize(text)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Stem then lemmatize, repeated until the token stops changing so that a
/// normalized string normalizes to itself.
fn reduce_token(token: &str) -> String {
    let mut current = token.to_string();
    for _ in 0..MAX_REDUCTION_ROUNDS {
        let stemmed = STEMMER.stem(&current);
        let next = lemmatize(&stemmed).to_string();
        if next == current {
            break;
        }
        current = next;
    }
    current
}
