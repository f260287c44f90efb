use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, SourceConfig};
use crate::cli::{RenderArgs, SourceKind};
use crate::data::DataManager;
use crate::error::{CliError, Result};
use ligenv::core::resources::Environment;
use ligenv::engine::config::VisualizationConfigBuilder;
use ligenv::engine::viewport::Viewport;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Folds defaults, the optional config file, `-S` settings and explicit flags (in increasing
/// precedence) into the final configuration.
pub fn build_config(args: &RenderArgs, data_manager: &DataManager) -> Result<AppConfig> {
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let file_config = apply_set_values(file_config, &args.set_values)?;
    let defaults = DefaultsConfig::default();

    let viewport_file = file_config.viewport.unwrap_or_default();
    let layout_file = file_config.layout.unwrap_or_default();
    let source_file = file_config.source.unwrap_or_default();
    let weights_file = file_config.weights.unwrap_or_default();

    let width = args.width.or(viewport_file.width).unwrap_or(defaults.width);
    let height = args.height.or(viewport_file.height).unwrap_or(defaults.height);
    let selector = args
        .environment
        .as_deref()
        .or(source_file.environment.as_deref())
        .unwrap_or(&defaults.environment);
    let environment = Environment::parse_or_default(Some(selector));

    let visualization = VisualizationConfigBuilder::new()
        .environment(environment)
        .viewport(Viewport::new(width, height))
        .jitter(layout_file.jitter.unwrap_or(defaults.jitter))
        .seed(args.seed.or(layout_file.seed).unwrap_or(defaults.seed))
        .max_ticks(
            args.max_ticks
                .or(layout_file.max_ticks)
                .unwrap_or(defaults.max_ticks),
        )
        .settle_threshold(
            layout_file
                .settle_threshold
                .unwrap_or(defaults.settle_threshold),
        )
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let kind = args.source.or(source_file.kind).unwrap_or(defaults.source);
    let data_dir = args
        .data_dir
        .clone()
        .or(source_file.data_dir)
        .unwrap_or_else(|| data_manager.data_path().to_path_buf());
    if kind == SourceKind::Dir && !data_dir.is_dir() {
        return Err(CliError::Data(format!(
            "Payload directory does not exist: {:?}.\nHint: Pass --data-dir or set source.data-dir in the config file.",
            data_dir
        )));
    }
    let source = SourceConfig {
        kind,
        environment,
        data_dir,
        offline: args.offline || source_file.offline.unwrap_or(false),
        timeout: Duration::from_secs(source_file.timeout_secs.unwrap_or(defaults.timeout_secs)),
    };

    let contact_types = if !args.contact_types.is_empty() {
        args.contact_types.clone()
    } else {
        weights_file
            .contact_types
            .unwrap_or(defaults.contact_types)
    };

    let config = AppConfig {
        visualization,
        source,
        weights: args.weights.clone().or(weights_file.path),
        contact_types,
        output: args.output.clone(),
    };
    debug!("Final configuration: {:?}", &config);
    Ok(config)
}

fn parse_value<T: FromStr>(key: &str, value: &str, expected: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", expected, key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "viewport.width" => {
                config.viewport.get_or_insert_with(Default::default).width =
                    Some(parse_value(key, value, "float")?);
            }
            "viewport.height" => {
                config.viewport.get_or_insert_with(Default::default).height =
                    Some(parse_value(key, value, "float")?);
            }
            "layout.jitter" => {
                config.layout.get_or_insert_with(Default::default).jitter =
                    Some(parse_value(key, value, "float")?);
            }
            "layout.seed" => {
                config.layout.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value, "integer")?);
            }
            "layout.max-ticks" => {
                config.layout.get_or_insert_with(Default::default).max_ticks =
                    Some(parse_value(key, value, "integer")?);
            }
            "layout.settle-threshold" => {
                config
                    .layout
                    .get_or_insert_with(Default::default)
                    .settle_threshold = Some(parse_value(key, value, "float")?);
            }
            "source.kind" => {
                let kind = match value {
                    "api" => SourceKind::Api,
                    "dir" => SourceKind::Dir,
                    _ => {
                        return Err(CliError::Config(format!(
                            "Invalid source kind for {}: {} (expected 'api' or 'dir')",
                            key, value
                        )));
                    }
                };
                config.source.get_or_insert_with(Default::default).kind = Some(kind);
            }
            "source.environment" => {
                config.source.get_or_insert_with(Default::default).environment =
                    Some(value.to_string());
            }
            "source.data-dir" => {
                config.source.get_or_insert_with(Default::default).data_dir =
                    Some(PathBuf::from(value));
            }
            "source.offline" => {
                config.source.get_or_insert_with(Default::default).offline =
                    Some(parse_value(key, value, "boolean")?);
            }
            "source.timeout-secs" => {
                config.source.get_or_insert_with(Default::default).timeout_secs =
                    Some(parse_value(key, value, "integer")?);
            }
            "weights.path" => {
                config.weights.get_or_insert_with(Default::default).path =
                    Some(PathBuf::from(value));
            }
            "weights.contact-types" => {
                config
                    .weights
                    .get_or_insert_with(Default::default)
                    .contact_types = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SceneTarget;
    use std::fs;
    use tempfile::tempdir;

    fn base_render_args() -> RenderArgs {
        RenderArgs {
            scene: SceneTarget::Depiction {
                ccd_id: "ATP".to_string(),
            },
            output: None,
            config: None,
            width: None,
            height: None,
            environment: None,
            source: None,
            data_dir: None,
            offline: false,
            seed: None,
            max_ticks: None,
            weights: None,
            contact_types: vec![],
            set_values: vec![],
            export_payload: None,
        }
    }

    fn manager() -> DataManager {
        DataManager::with_custom_path(PathBuf::from("/tmp/ligenv-data"))
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let app = build_config(&base_render_args(), &manager()).unwrap();
        let defaults = DefaultsConfig::default();
        assert_eq!(app.visualization.viewport, Viewport::new(800.0, 600.0));
        assert_eq!(app.visualization.environment, Environment::Production);
        assert_eq!(app.visualization.seed, defaults.seed);
        assert_eq!(app.source.kind, SourceKind::Api);
        assert_eq!(app.source.data_dir, PathBuf::from("/tmp/ligenv-data"));
        assert!(!app.source.offline);
        assert_eq!(app.contact_types, vec!["TOTAL".to_string()]);
    }

    #[test]
    fn flags_override_file_and_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("render.toml");
        fs::write(
            &path,
            "[viewport]\nwidth = 1000\nheight = 900\n[layout]\nseed = 3\nmax-ticks = 50\n",
        )
        .unwrap();

        let mut args = base_render_args();
        args.config = Some(path);
        args.width = Some(640.0);
        args.max_ticks = Some(20);

        let app = build_config(&args, &manager()).unwrap();
        assert_eq!(app.visualization.viewport, Viewport::new(640.0, 900.0));
        assert_eq!(app.visualization.seed, 3);
        assert_eq!(app.visualization.max_ticks, 20);
    }

    #[test]
    fn set_values_override_the_file() {
        let mut args = base_render_args();
        args.set_values = vec![
            "layout.seed=11".to_string(),
            "source.environment=dev".to_string(),
            "weights.contact-types=hbond, vdw".to_string(),
            "source.offline=true".to_string(),
        ];
        let app = build_config(&args, &manager()).unwrap();
        assert_eq!(app.visualization.seed, 11);
        assert_eq!(app.visualization.environment, Environment::Development);
        assert_eq!(app.source.environment, Environment::Development);
        assert_eq!(
            app.contact_types,
            vec!["hbond".to_string(), "vdw".to_string()]
        );
        assert!(app.source.offline);
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let mut args = base_render_args();
        args.set_values = vec!["layout.seed".to_string()];
        assert!(matches!(
            build_config(&args, &manager()),
            Err(CliError::Config(_))
        ));

        args.set_values = vec!["layout.seed=many".to_string()];
        assert!(matches!(
            build_config(&args, &manager()),
            Err(CliError::Config(_))
        ));

        args.set_values = vec!["layout.gravity=1".to_string()];
        assert!(matches!(
            build_config(&args, &manager()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn unknown_environment_falls_back_to_production() {
        let mut args = base_render_args();
        args.environment = Some("staging".to_string());
        let app = build_config(&args, &manager()).unwrap();
        assert_eq!(app.visualization.environment, Environment::Production);
    }

    #[test]
    fn invalid_viewport_is_a_config_error() {
        let mut args = base_render_args();
        args.width = Some(0.0);
        assert!(matches!(
            build_config(&args, &manager()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn directory_source_requires_an_existing_directory() {
        let mut args = base_render_args();
        args.source = Some(SourceKind::Dir);
        args.data_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(matches!(
            build_config(&args, &manager()),
            Err(CliError::Data(_))
        ));

        let dir = tempdir().unwrap();
        args.data_dir = Some(dir.path().to_path_buf());
        let app = build_config(&args, &manager()).unwrap();
        assert_eq!(app.source.kind, SourceKind::Dir);
    }
}
