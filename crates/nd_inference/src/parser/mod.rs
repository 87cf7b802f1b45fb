//! Recovery parser for the ranking model's response.
//!
//! The model is asked for a JSON object of topic to headlines but routinely
//! wraps it in fences, uses Python quoting or gets cut off. [`parse_selection`]
//! walks a cascade of increasingly forgiving strategies and never fails: when
//! nothing works it returns an empty selection.

pub mod repair;

use lazy_static::lazy_static;
use nd_core::DigestSelection;
use regex::Regex;
use tracing::{debug, error, warn};

/// Characters of raw model output included in the failure log line.
const RAW_LOG_LIMIT: usize = 2000;

lazy_static! {
    static ref OBJECT_SPAN: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
}

/// Which strategy produced the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// The text was valid JSON as received.
    Strict,
    /// Valid JSON after fence stripping and text repairs.
    Repaired,
    /// Accepted by the JSON5 literal parser.
    Literal,
    /// Recovered from the first `{ ... }` span in the text.
    Extracted,
    /// Every strategy failed; the selection is empty.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub selection: DigestSelection,
    pub stage: ParseStage,
}

impl ParseOutcome {
    fn new(selection: DigestSelection, stage: ParseStage) -> Self {
        Self { selection, stage }
    }
}

/// Recovers a topic → headlines mapping from `raw`.
pub fn parse_selection(raw: &str) -> DigestSelection {
    parse_selection_detailed(raw).selection
}

/// Like [`parse_selection`], also reporting the stage that succeeded.
pub fn parse_selection_detailed(raw: &str) -> ParseOutcome {
    match parse_strict(raw) {
        Ok(selection) => return ParseOutcome::new(selection, ParseStage::Strict),
        Err(e) => warn!("Initial JSON parse failed: {}", e),
    }
    debug!("Pre-cleaned raw input (first 1000 chars):\n{}", preview(raw, 1000));

    let mut text = repair::strip_fences(raw);
    if text != raw {
        match parse_strict(&text) {
            Ok(selection) => return ParseOutcome::new(selection, ParseStage::Repaired),
            Err(e) => warn!("JSON parse after stripping code fences failed: {}", e),
        }
    }

    for (name, repair) in repair::REPAIRS {
        let repaired = repair(&text);
        if repaired == text {
            continue;
        }
        text = repaired;
        match parse_strict(&text) {
            Ok(selection) => {
                debug!("Model output recovered after {} repair", name);
                return ParseOutcome::new(selection, ParseStage::Repaired);
            }
            Err(e) => warn!("JSON parse after {} repair failed: {}", name, e),
        }
    }

    match json5::from_str::<DigestSelection>(&text) {
        Ok(selection) => return ParseOutcome::new(selection, ParseStage::Literal),
        Err(e) => warn!("Literal parse failed: {}", e),
    }

    match OBJECT_SPAN.find(&text) {
        Some(span) => {
            let candidate = repair::clean(span.as_str());
            match parse_strict(&candidate) {
                Ok(selection) => return ParseOutcome::new(selection, ParseStage::Extracted),
                Err(e) => warn!("Regex-based fallback failed: {}", e),
            }
        }
        None => warn!("Regex-based fallback failed: no brace-delimited span"),
    }

    error!("All parsing methods failed. Raw content:\n{}", preview(raw, RAW_LOG_LIMIT));
    ParseOutcome::new(DigestSelection::new(), ParseStage::Failed)
}

fn parse_strict(text: &str) -> serde_json::Result<DigestSelection> {
    serde_json::from_str(text)
}

fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
