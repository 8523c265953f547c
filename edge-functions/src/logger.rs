use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
const DEFAULT_LEVEL: &str = "INFO";

static LOGGERS: OnceLock<Mutex<HashMap<String, Logger>>> = OnceLock::new();
// Threshold for handles when LOG_LEVEL is unset, fixed by `init`.
static FALLBACK_THRESHOLD: OnceLock<LevelFilter> = OnceLock::new();

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set, then `LOG_LEVEL`, then `config_level`, then INFO.
/// Calling this more than once is a no-op.
pub fn init(config_level: Option<&str>) {
    let log_level = std::env::var(LOG_LEVEL_ENV).ok();
    let (filter, fallback) = match EnvFilter::try_from_default_env() {
        // RUST_LOG directives do the filtering; handles pass everything through.
        Ok(filter) => (filter, LevelFilter::TRACE),
        Err(_) => {
            let level = resolve_level(log_level.as_deref(), config_level);
            (EnvFilter::new(level.to_string()), level)
        }
    };
    let _ = FALLBACK_THRESHOLD.set(fallback);
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn resolve_level(log_level: Option<&str>, config_level: Option<&str>) -> LevelFilter {
    parse_level(log_level.or(config_level).unwrap_or(DEFAULT_LEVEL))
}

/// Map a textual level name to a filter. Unknown names fall back to INFO.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" => LevelFilter::TRACE,
        "DEBUG" => LevelFilter::DEBUG,
        "INFO" => LevelFilter::INFO,
        "WARN" | "WARNING" => LevelFilter::WARN,
        "ERROR" | "CRITICAL" => LevelFilter::ERROR,
        "OFF" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn handle_threshold(log_level: Option<&str>, fallback: Option<LevelFilter>) -> LevelFilter {
    match log_level {
        Some(level) => parse_level(level),
        None => fallback.unwrap_or(LevelFilter::INFO),
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    name: Arc<str>,
    threshold: LevelFilter,
}

impl Logger {
    fn new(name: &str, threshold: LevelFilter) -> Self {
        Self {
            name: Arc::from(name),
            threshold,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> LevelFilter {
        self.threshold
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.threshold
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        if self.enabled(Level::DEBUG) {
            tracing::debug!(component = %self.name, "{}", message.as_ref());
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        if self.enabled(Level::INFO) {
            tracing::info!(component = %self.name, "{}", message.as_ref());
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        if self.enabled(Level::WARN) {
            tracing::warn!(component = %self.name, "{}", message.as_ref());
        }
    }

    pub fn error(&self, message: impl AsRef<str>) {
        if self.enabled(Level::ERROR) {
            tracing::error!(component = %self.name, "{}", message.as_ref());
        }
    }
}

/// Return the cached logger for `name`, creating it on first use.
pub fn get_logger(name: &str) -> Logger {
    let cache = LOGGERS.get_or_init(Default::default);
    let mut loggers = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    loggers
        .entry(name.to_owned())
        .or_insert_with(|| {
            let log_level = std::env::var(LOG_LEVEL_ENV).ok();
            let threshold =
                handle_threshold(log_level.as_deref(), FALLBACK_THRESHOLD.get().copied());
            Logger::new(name, threshold)
        })
        .clone()
}
