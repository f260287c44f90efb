use crate::core::resources::{Environment, Resource};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(Resource),

    #[error("Failed to fetch {resource}: {reason}")]
    Transport { resource: Resource, reason: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Source of the JSON documents a scene is built from.
pub trait ResourceProvider: Send + Sync {
    /// Returns the raw text of `resource` as served for `environment`.
    fn fetch(
        &self,
        resource: &Resource,
        environment: Environment,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Provider serving documents registered up front, for any environment.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    documents: HashMap<Resource, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: Resource, text: impl Into<String>) -> Self {
        self.insert(resource, text);
        self
    }

    pub fn insert(&mut self, resource: Resource, text: impl Into<String>) {
        self.documents.insert(resource, text.into());
    }
}

impl ResourceProvider for MemoryProvider {
    async fn fetch(&self, resource: &Resource, _environment: Environment) -> Result<String, FetchError> {
        self.documents
            .get(resource)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(resource.clone()))
    }
}
