use crate::cli::SourceKind;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileViewportConfig {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileLayoutConfig {
    pub jitter: Option<f64>,
    pub seed: Option<u64>,
    pub max_ticks: Option<usize>,
    pub settle_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSourceConfig {
    pub kind: Option<SourceKind>,
    pub environment: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub offline: Option<bool>,
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileWeightsConfig {
    pub path: Option<PathBuf>,
    pub contact_types: Option<Vec<String>>,
}

/// Everything a `render` configuration file may set; each section is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub viewport: Option<FileViewportConfig>,
    pub layout: Option<FileLayoutConfig>,
    pub source: Option<FileSourceConfig>,
    pub weights: Option<FileWeightsConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_parses_with_kebab_case_keys() {
        let config = FileConfig::from_toml(
            r#"
            [viewport]
            width = 1024
            height = 768

            [layout]
            seed = 42
            max-ticks = 500
            settle-threshold = 0.005

            [source]
            kind = "dir"
            environment = "dev"
            data-dir = "/srv/payloads"
            offline = true
            timeout-secs = 5

            [weights]
            path = "weights.json"
            contact-types = ["hbond", "vdw"]
            "#,
        )
        .unwrap();

        let viewport = config.viewport.unwrap();
        assert_eq!(viewport.width, Some(1024.0));
        let layout = config.layout.unwrap();
        assert_eq!(layout.seed, Some(42));
        assert_eq!(layout.max_ticks, Some(500));
        assert_eq!(layout.jitter, None);
        let source = config.source.unwrap();
        assert_eq!(source.kind, Some(SourceKind::Dir));
        assert_eq!(source.data_dir, Some(PathBuf::from("/srv/payloads")));
        let weights = config.weights.unwrap();
        assert_eq!(
            weights.contact_types,
            Some(vec!["hbond".to_string(), "vdw".to_string()])
        );
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert!(config.viewport.is_none());
        assert!(config.layout.is_none());
        assert!(config.source.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml("[layout]\nalpha = 1.0\n").is_err());
        assert!(FileConfig::from_toml("[render]\n").is_err());
    }

    #[test]
    fn from_file_reports_the_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[viewport]\nwidth = \"wide\"\n").unwrap();
        let err = FileConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { path: p, .. } if p == path));
    }
}
