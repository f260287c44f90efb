use crate::cli::SourceKind;
use ligenv::core::resources::Environment;
use ligenv::engine::config::VisualizationConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub environment: Environment,
    pub data_dir: PathBuf,
    pub offline: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub visualization: VisualizationConfig,
    pub source: SourceConfig,
    pub weights: Option<PathBuf>,
    pub contact_types: Vec<String>,
    pub output: Option<PathBuf>,
}
