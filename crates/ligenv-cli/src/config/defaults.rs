use crate::cli::SourceKind;
use ligenv::engine::config::{DEFAULT_ALPHA_MIN, DEFAULT_JITTER, DEFAULT_MAX_TICKS, DEFAULT_SEED};

pub struct DefaultsConfig {
    pub width: f64,
    pub height: f64,
    pub environment: String,
    pub source: SourceKind,
    pub timeout_secs: u64,
    pub jitter: f64,
    pub seed: u64,
    pub max_ticks: usize,
    pub settle_threshold: f64,
    pub contact_types: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            environment: "production".to_string(),
            source: SourceKind::Api,
            timeout_secs: 30,
            jitter: DEFAULT_JITTER,
            seed: DEFAULT_SEED,
            max_ticks: DEFAULT_MAX_TICKS,
            settle_threshold: DEFAULT_ALPHA_MIN,
            contact_types: vec!["TOTAL".to_string()],
        }
    }
}
