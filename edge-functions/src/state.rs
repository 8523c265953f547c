use crate::config::Config;
use crate::registry::{ConnectionRegistry, InMemoryRegistry};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

pub struct AppState {
    pub registry: Arc<dyn ConnectionRegistry>,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let capacity = NonZeroUsize::new(cfg.registry_capacity())
            .ok_or_else(|| anyhow::anyhow!("registry_capacity must be greater than zero"))?;
        info!("Connection registry capacity: {}", capacity);
        Ok(Self::with_registry(Arc::new(InMemoryRegistry::new(capacity))))
    }

    pub fn with_registry(registry: Arc<dyn ConnectionRegistry>) -> Self {
        debug!("Application state created");
        AppState { registry }
    }
}
