use serde::Deserialize;
use std::fs;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_REGISTRY_CAPACITY: usize = 10_000;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub listen: Option<String>,
    // Severity used when neither LOG_LEVEL nor RUST_LOG is set.
    pub log_level: Option<String>,
    // Maximum number of connection ids the in-memory registry keeps.
    // Oldest entries are evicted first. Defaults to 10_000; zero is rejected.
    pub registry_capacity: Option<usize>,
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let cfg_str = fs::read_to_string(path)?;
        Ok(toml::from_str(&cfg_str)?)
    }

    pub fn listen_addr(&self) -> &str {
        self.listen.as_deref().unwrap_or(DEFAULT_LISTEN)
    }

    pub fn registry_capacity(&self) -> usize {
        self.registry_capacity.unwrap_or(DEFAULT_REGISTRY_CAPACITY)
    }
}
