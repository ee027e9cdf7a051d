use crate::di::DependenciesInject;
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::config::{Config, ConnectionPool};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("deps", &self.di_container)
            .field("registry", &"Registry")
            .finish()
    }
}

impl AppState {
    pub async fn new(pool: ConnectionPool, config: &Config) -> Result<Self> {
        let registry = Arc::new(Mutex::new(Registry::default()));

        let di_container = DependenciesInject::new(pool, config, registry.clone())
            .await
            .context("Failed to initialize dependency injection container")?;

        Ok(Self {
            di_container,
            registry,
        })
    }
}
