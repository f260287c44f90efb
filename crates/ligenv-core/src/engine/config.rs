use super::viewport::Viewport;
use crate::core::geometry::Point;
use crate::core::resources::Environment;
use thiserror::Error;

pub const DEFAULT_ALPHA_MIN: f64 = 0.001;
pub const DEFAULT_VELOCITY_DECAY: f64 = 0.4;
/// Number of ticks after which an undisturbed simulation cools below `DEFAULT_ALPHA_MIN`.
const COOLING_TICKS: f64 = 300.0;

pub const DEFAULT_JITTER: f64 = 55.0;
pub const DEFAULT_MAX_TICKS: usize = 1000;
pub const DEFAULT_SEED: u64 = 0x1d_e9_c0_de;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub fn alpha_decay_for(alpha_min: f64) -> f64 {
    1.0 - alpha_min.powf(1.0 / COOLING_TICKS)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkDistance {
    Fixed(f64),
    /// `between_ligands` when both endpoints wrap ligand residues, `default` otherwise.
    LigandAware { between_ligands: f64, default: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkForceConfig {
    pub distance: LinkDistance,
    /// `None` uses `1 / min(degree(source), degree(target))`.
    pub strength: Option<f64>,
    pub iterations: usize,
    pub exclude_hydrophobic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManyBodyConfig {
    pub strength: f64,
    pub distance_min: f64,
    pub distance_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollideConfig {
    pub radius: f64,
    pub strength: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub link: LinkForceConfig,
    pub many_body: ManyBodyConfig,
    pub collide: CollideConfig,
    pub center: Option<Point>,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
}

impl LayoutConfig {
    /// Residue-level graph centred in the viewport.
    pub fn residue_scene(center: Point) -> Self {
        Self {
            link: LinkForceConfig {
                distance: LinkDistance::LigandAware {
                    between_ligands: 55.0,
                    default: 150.0,
                },
                strength: Some(0.5),
                iterations: 1,
                exclude_hydrophobic: false,
            },
            many_body: ManyBodyConfig {
                strength: -1000.0,
                distance_min: 55.0,
                distance_max: 250.0,
            },
            collide: CollideConfig {
                radius: 45.0,
                strength: 1.0,
                iterations: 1,
            },
            center: Some(center),
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: alpha_decay_for(DEFAULT_ALPHA_MIN),
            velocity_decay: DEFAULT_VELOCITY_DECAY,
        }
    }

    /// Partners around a pinned ligand depiction; hydrophobic contacts exert no pull.
    pub fn ligand_scene() -> Self {
        Self {
            link: LinkForceConfig {
                distance: LinkDistance::Fixed(5.0),
                strength: None,
                iterations: 1,
                exclude_hydrophobic: true,
            },
            many_body: ManyBodyConfig {
                strength: -80.0,
                distance_min: 10.0,
                distance_max: 20.0,
            },
            collide: CollideConfig {
                radius: 50.0,
                strength: 0.5,
                iterations: 10,
            },
            center: None,
            alpha_min: DEFAULT_ALPHA_MIN,
            alpha_decay: alpha_decay_for(DEFAULT_ALPHA_MIN),
            velocity_decay: DEFAULT_VELOCITY_DECAY,
        }
    }
}

#[derive(Default)]
pub struct LayoutConfigBuilder {
    link: Option<LinkForceConfig>,
    many_body: Option<ManyBodyConfig>,
    collide: Option<CollideConfig>,
    center: Option<Point>,
    alpha_min: Option<f64>,
    alpha_decay: Option<f64>,
    velocity_decay: Option<f64>,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(mut self, link: LinkForceConfig) -> Self {
        self.link = Some(link);
        self
    }
    pub fn many_body(mut self, many_body: ManyBodyConfig) -> Self {
        self.many_body = Some(many_body);
        self
    }
    pub fn collide(mut self, collide: CollideConfig) -> Self {
        self.collide = Some(collide);
        self
    }
    pub fn center(mut self, center: Point) -> Self {
        self.center = Some(center);
        self
    }
    pub fn alpha_min(mut self, alpha_min: f64) -> Self {
        self.alpha_min = Some(alpha_min);
        self
    }
    pub fn alpha_decay(mut self, alpha_decay: f64) -> Self {
        self.alpha_decay = Some(alpha_decay);
        self
    }
    pub fn velocity_decay(mut self, velocity_decay: f64) -> Self {
        self.velocity_decay = Some(velocity_decay);
        self
    }

    pub fn build(self) -> Result<LayoutConfig, ConfigError> {
        let alpha_min = self.alpha_min.unwrap_or(DEFAULT_ALPHA_MIN);
        let config = LayoutConfig {
            link: self.link.ok_or(ConfigError::MissingParameter("link"))?,
            many_body: self
                .many_body
                .ok_or(ConfigError::MissingParameter("many_body"))?,
            collide: self
                .collide
                .ok_or(ConfigError::MissingParameter("collide"))?,
            center: self.center,
            alpha_min,
            alpha_decay: self.alpha_decay.unwrap_or_else(|| alpha_decay_for(alpha_min)),
            velocity_decay: self.velocity_decay.unwrap_or(DEFAULT_VELOCITY_DECAY),
        };
        validate_layout(&config)?;
        Ok(config)
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn validate_layout(config: &LayoutConfig) -> Result<(), ConfigError> {
    if !(0.0..1.0).contains(&config.alpha_min) {
        return Err(invalid("alpha_min", "must lie in [0, 1)"));
    }
    if !(0.0..=1.0).contains(&config.alpha_decay) {
        return Err(invalid("alpha_decay", "must lie in [0, 1]"));
    }
    if !(0.0..=1.0).contains(&config.velocity_decay) {
        return Err(invalid("velocity_decay", "must lie in [0, 1]"));
    }
    if config.many_body.distance_min > config.many_body.distance_max {
        return Err(invalid(
            "many_body",
            "distance_min must not exceed distance_max",
        ));
    }
    if config.collide.radius < 0.0 {
        return Err(invalid("collide", "radius must not be negative"));
    }
    if config.collide.iterations == 0 || config.link.iterations == 0 {
        return Err(invalid("iterations", "at least one iteration is required"));
    }
    Ok(())
}

/// Settings of a [`crate::workflows::visualization::Visualization`].
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizationConfig {
    pub environment: Environment,
    pub viewport: Viewport,
    /// Upper bound of the random offset added to the initial partner positions of a ligand scene.
    pub jitter: f64,
    pub seed: u64,
    pub max_ticks: usize,
    /// Alpha below which a layout with content counts as settled.
    pub settle_threshold: f64,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            viewport: Viewport::new(800.0, 600.0),
            jitter: DEFAULT_JITTER,
            seed: DEFAULT_SEED,
            max_ticks: DEFAULT_MAX_TICKS,
            settle_threshold: DEFAULT_ALPHA_MIN,
        }
    }
}

#[derive(Default)]
pub struct VisualizationConfigBuilder {
    environment: Option<Environment>,
    viewport: Option<Viewport>,
    jitter: Option<f64>,
    seed: Option<u64>,
    max_ticks: Option<usize>,
    settle_threshold: Option<f64>,
}

impl VisualizationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }
    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
    pub fn settle_threshold(mut self, threshold: f64) -> Self {
        self.settle_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> Result<VisualizationConfig, ConfigError> {
        let defaults = VisualizationConfig::default();
        let config = VisualizationConfig {
            environment: self.environment.unwrap_or(defaults.environment),
            viewport: self
                .viewport
                .ok_or(ConfigError::MissingParameter("viewport"))?,
            jitter: self.jitter.unwrap_or(defaults.jitter),
            seed: self.seed.unwrap_or(defaults.seed),
            max_ticks: self.max_ticks.unwrap_or(defaults.max_ticks),
            settle_threshold: self.settle_threshold.unwrap_or(defaults.settle_threshold),
        };
        if !(config.viewport.width > 0.0 && config.viewport.height > 0.0) {
            return Err(invalid("viewport", "width and height must be positive"));
        }
        if !config.jitter.is_finite() || config.jitter < 0.0 {
            return Err(invalid("jitter", "must be finite and not negative"));
        }
        if config.max_ticks == 0 {
            return Err(invalid("max_ticks", "at least one tick is required"));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alpha_decay_cools_to_alpha_min_in_300_ticks() {
        let decay = alpha_decay_for(DEFAULT_ALPHA_MIN);
        let alpha = (1.0 - decay).powi(300);
        assert!((alpha - DEFAULT_ALPHA_MIN).abs() < 1e-9);
    }

    #[test]
    fn residue_scene_preset_matches_hand_tuned_parameters() {
        let config = LayoutConfig::residue_scene(Point::new(400.0, 300.0));
        assert_eq!(
            config.link.distance,
            LinkDistance::LigandAware {
                between_ligands: 55.0,
                default: 150.0
            }
        );
        assert_eq!(config.link.strength, Some(0.5));
        assert_eq!(config.many_body.strength, -1000.0);
        assert_eq!(config.collide.radius, 45.0);
        assert_eq!(config.center, Some(Point::new(400.0, 300.0)));
    }

    #[test]
    fn ligand_scene_preset_has_no_centering_force() {
        let config = LayoutConfig::ligand_scene();
        assert!(config.center.is_none());
        assert!(config.link.exclude_hydrophobic);
        assert_eq!(config.collide.iterations, 10);
        assert_eq!(config.collide.strength, 0.5);
        assert_eq!(config.many_body.distance_max, 20.0);
    }

    #[test]
    fn builder_reports_missing_forces() {
        let err = LayoutConfigBuilder::new().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("link"));
        let preset = LayoutConfig::ligand_scene();
        let err = LayoutConfigBuilder::new()
            .link(preset.link)
            .many_body(preset.many_body)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("collide"));
    }

    #[test]
    fn builder_rejects_inverted_many_body_range() {
        let preset = LayoutConfig::ligand_scene();
        let err = LayoutConfigBuilder::new()
            .link(preset.link)
            .many_body(ManyBodyConfig {
                strength: -10.0,
                distance_min: 30.0,
                distance_max: 20.0,
            })
            .collide(preset.collide)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "many_body", .. }));
    }

    #[test]
    fn builder_fills_alpha_defaults() {
        let preset = LayoutConfig::ligand_scene();
        let config = LayoutConfigBuilder::new()
            .link(preset.link)
            .many_body(preset.many_body)
            .collide(preset.collide)
            .build()
            .unwrap();
        assert_eq!(config, preset);
    }

    #[test]
    fn visualization_builder_requires_positive_viewport() {
        assert_eq!(
            VisualizationConfigBuilder::new().build().unwrap_err(),
            ConfigError::MissingParameter("viewport")
        );
        let err = VisualizationConfigBuilder::new()
            .viewport(Viewport::new(0.0, 100.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { name: "viewport", .. }));
        let config = VisualizationConfigBuilder::new()
            .viewport(Viewport::new(640.0, 480.0))
            .seed(7)
            .build()
            .unwrap();
        assert_eq!(config.jitter, DEFAULT_JITTER);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn builder_rejects_negative_or_non_finite_jitter() {
        for jitter in [-1.0, f64::INFINITY, f64::NAN] {
            let err = VisualizationConfigBuilder::new()
                .viewport(Viewport::new(640.0, 480.0))
                .jitter(jitter)
                .build()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidParameter { name: "jitter", .. }),
                "jitter {jitter} was accepted"
            );
        }
    }
}
