//! Payload sources behind the `render` command.

use crate::cli::SourceKind;
use crate::config::SourceConfig;
use crate::data::DataManager;
use crate::error::Result;
use ligenv::core::resources::{Environment, Resource};
use ligenv::workflows::provider::{FetchError, ResourceProvider};
use reqwest::StatusCode;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches from the PDBe API and keeps every successful response in the data directory.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    cache: DataManager,
    offline: bool,
}

impl HttpProvider {
    pub fn new(cache: DataManager, offline: bool, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ligenv/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            cache,
            offline,
        })
    }

    async fn download(
        &self,
        resource: &Resource,
        environment: Environment,
    ) -> std::result::Result<String, FetchError> {
        let url = resource.url(environment);
        info!("Requesting {}", url);
        let transport = |reason: String| FetchError::Transport {
            resource: resource.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(resource.clone()));
        }
        let response = response
            .error_for_status()
            .map_err(|e| transport(e.to_string()))?;
        response.text().await.map_err(|e| transport(e.to_string()))
    }

    async fn store(&self, path: &Path, body: &str) {
        let written = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, body).await
        }
        .await;
        if let Err(e) = written {
            warn!("Could not cache payload at {:?}: {}", path, e);
        }
    }
}

impl ResourceProvider for HttpProvider {
    async fn fetch(
        &self,
        resource: &Resource,
        environment: Environment,
    ) -> std::result::Result<String, FetchError> {
        let cached = self.cache.cache_path(resource, environment);
        match tokio::fs::read_to_string(&cached).await {
            Ok(body) => {
                debug!("Cache hit for {} at {:?}", resource, &cached);
                return Ok(body);
            }
            Err(e) if e.kind() != ErrorKind::NotFound => {
                warn!("Ignoring unreadable cache entry {:?}: {}", &cached, e);
            }
            Err(_) => {}
        }

        if self.offline {
            return Err(FetchError::Transport {
                resource: resource.clone(),
                reason: "not cached and offline mode is enabled".to_string(),
            });
        }

        let body = self.download(resource, environment).await?;
        self.store(&cached, &body).await;
        Ok(body)
    }
}

/// Reads payloads laid out by [`Resource::local_path`] under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ResourceProvider for DirectoryProvider {
    async fn fetch(
        &self,
        resource: &Resource,
        _environment: Environment,
    ) -> std::result::Result<String, FetchError> {
        let path = self.root.join(resource.local_path());
        debug!("Reading {} from {:?}", resource, &path);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                FetchError::NotFound(resource.clone())
            } else {
                FetchError::Transport {
                    resource: resource.clone(),
                    reason: e.to_string(),
                }
            }
        })
    }
}

/// The provider selected by the command line and configuration.
#[derive(Debug, Clone)]
pub enum CliProvider {
    Http(HttpProvider),
    Directory(DirectoryProvider),
}

impl CliProvider {
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(match config.kind {
            SourceKind::Api => {
                info!(
                    "Using the {} API (cache: {:?}, offline: {})",
                    config.environment, &config.data_dir, config.offline
                );
                CliProvider::Http(HttpProvider::new(
                    DataManager::with_custom_path(config.data_dir.clone()),
                    config.offline,
                    config.timeout,
                )?)
            }
            SourceKind::Dir => {
                info!("Reading payloads from {:?}", &config.data_dir);
                CliProvider::Directory(DirectoryProvider::new(config.data_dir.clone()))
            }
        })
    }
}

impl ResourceProvider for CliProvider {
    async fn fetch(
        &self,
        resource: &Resource,
        environment: Environment,
    ) -> std::result::Result<String, FetchError> {
        match self {
            CliProvider::Http(p) => p.fetch(resource, environment).await,
            CliProvider::Directory(p) => p.fetch(resource, environment).await,
        }
    }
}
