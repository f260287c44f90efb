use crate::error::{CliError, Result};
use directories::ProjectDirs;
use ligenv::core::resources::{Environment, Resource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PATH_CONFIG_FILE: &str = "path.conf";
const CACHE_DIR: &str = "cache";

/// Location of the local payload cache.
///
/// The directory is the platform data directory unless `path.conf` in the platform config
/// directory names another one.
#[derive(Debug, Clone)]
pub struct DataManager {
    base_path: PathBuf,
}

impl DataManager {
    pub fn new() -> Result<Self> {
        let path = Self::determine_data_path()?;
        debug!("DataManager initialized with path: {:?}", &path);
        Ok(Self { base_path: path })
    }

    pub fn with_custom_path(path: PathBuf) -> Self {
        Self { base_path: path }
    }

    pub fn data_path(&self) -> &Path {
        &self.base_path
    }

    /// Cached copy of `resource` as served by `environment`.
    pub fn cache_path(&self, resource: &Resource, environment: Environment) -> PathBuf {
        self.base_path
            .join(CACHE_DIR)
            .join(environment.to_string())
            .join(resource.local_path())
    }

    /// Deletes all cached payloads and returns how many files were removed.
    pub fn clear_cache(&self) -> Result<usize> {
        let cache = self.base_path.join(CACHE_DIR);
        if !cache.exists() {
            info!("No cache directory at {:?}, nothing to clear.", &cache);
            return Ok(0);
        }
        let removed = count_files(&cache)?;
        fs::remove_dir_all(&cache)?;
        info!("Removed {} cached payload(s) from {:?}", removed, &cache);
        Ok(removed)
    }

    pub fn set_custom_path(path: &Path) -> Result<()> {
        let path_str = path.to_str().ok_or_else(|| {
            CliError::Argument(format!("Data path is not valid UTF-8: {}", path.display()))
        })?;
        let config_path = Self::path_config_file()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, path_str).map_err(CliError::from)
    }

    pub fn reset_path() -> Result<()> {
        if let Ok(config_path) = Self::path_config_file() {
            if config_path.exists() {
                fs::remove_file(config_path)?;
            }
        }
        Ok(())
    }

    fn determine_data_path() -> Result<PathBuf> {
        match Self::path_config_file() {
            Ok(config_path) if config_path.exists() => {
                read_path_override(&config_path)?.map_or_else(Self::default_data_path, Ok)
            }
            _ => Self::default_data_path(),
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("org", "pdbe", "ligenv").ok_or_else(|| {
            CliError::Data("Could not determine the platform directories.".to_string())
        })
    }

    fn path_config_file() -> Result<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(PATH_CONFIG_FILE))
    }

    fn default_data_path() -> Result<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }
}

/// Path named by a `path.conf` file; `None` when the file is blank.
fn read_path_override(config_path: &Path) -> Result<Option<PathBuf>> {
    let custom = fs::read_to_string(config_path)?.trim().to_string();
    if custom.is_empty() {
        warn!("Custom path config file is empty, falling back to default path.");
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(custom)))
    }
}

fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            count += count_files(&path)?;
        } else {
            count += 1;
        }
    }
    Ok(count)
}
