use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Mutex, Once};

use nd_core::Result;
use tracing::Level;

static INIT: Once = Once::new();

pub const DEFAULT_LOG_FILE: &str = "logs/newsdigest.log";

/// Prepends a stack of prefixes (usually a topic) to every message.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_new_prefixes(mut self, prefix: String) -> Self {
        self.prefixes.clear();
        self.prefixes.push_back(prefix);
        self
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefixes.push_back(prefix);
        self
    }

    fn prefixed(&self, message: &str) -> String {
        let prefix = self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>();
        format!("{}{}", prefix, message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.prefixed(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.prefixed(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", self.prefixed(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.prefixed(message));
    }
}

/// Installs the global subscriber once. With `log_file` set, output is
/// appended there without ANSI colors instead of going to stderr.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<Logger> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let file = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Some(OpenOptions::new().create(true).append(true).open(path)?)
        }
        None => None,
    };

    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(move || {
            let builder = tracing_subscriber::fmt().with_max_level(level);
            let _ = match file {
                Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
                None => builder.with_writer(std::io::stderr).try_init(),
            };
        });
    }

    Ok(Logger::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        let logger = Logger::new().with_prefix("[Tech]".to_string()).with_prefix("[feed]".to_string());
        assert_eq!(logger.prefixed("fetched 3"), "[Tech] [feed] fetched 3");

        let logger = logger.with_new_prefixes("[World]".to_string());
        assert_eq!(logger.prefixed("fetched 1"), "[World] fetched 1");
    }

    #[test]
    fn test_init_logging_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("digest.log");
        init_logging(false, Some(&path)).unwrap();
        assert!(path.exists());
    }
}
