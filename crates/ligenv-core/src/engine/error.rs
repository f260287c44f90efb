use super::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Node '{0}' is not part of the simulated binding site")]
    NodeNotFound(String),

    #[error("Node '{0}' is static and cannot be dragged")]
    StaticNode(String),

    #[error("Node '{0}' has not been placed yet")]
    UnplacedNode(String),

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
