use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ligenv - Lay out ligand binding-site interaction graphs from PDBe interaction data.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a scene, run the layout to rest and write the scene snapshot as JSON.
    Render(RenderArgs),
    /// Compute per-atom interaction weights of a ligand depiction and write them as CSV.
    Weights(WeightsArgs),
    /// Manage the local payload cache directory.
    Data(DataArgs),
}

/// Where scene payloads are read from.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// The PDBe web API, with responses cached in the data directory.
    #[default]
    Api,
    /// A directory of previously downloaded payloads.
    Dir,
}

/// Arguments for the `render` subcommand.
#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(subcommand)]
    pub scene: SceneTarget,

    /// Output path for the JSON snapshot; standard output when omitted.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Viewport Overrides ---
    /// Override the viewport width.
    #[arg(long, global = true, value_name = "FLOAT")]
    pub width: Option<f64>,

    /// Override the viewport height.
    #[arg(long, global = true, value_name = "FLOAT")]
    pub height: Option<f64>,

    // --- Source Overrides ---
    /// API environment: production, development or internal.
    #[arg(short, long, global = true, value_name = "NAME")]
    pub environment: Option<String>,

    /// Read payloads from the web API or from a local directory.
    #[arg(long, global = true, value_enum)]
    pub source: Option<SourceKind>,

    /// Directory holding the payload cache (api) or the payload tree (dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Never touch the network; only cached payloads are used.
    #[arg(long, global = true)]
    pub offline: bool,

    // --- Layout Overrides ---
    /// Seed of the layout's random number generator.
    #[arg(long, global = true, value_name = "INT")]
    pub seed: Option<u64>,

    /// Maximum number of simulation ticks before the layout is frozen.
    #[arg(long, global = true, value_name = "INT")]
    pub max_ticks: Option<usize>,

    // --- Depiction Weights ---
    /// Aggregated contact counts used to weight the ligand's depiction atoms.
    #[arg(long, global = true, value_name = "PATH")]
    pub weights: Option<PathBuf>,

    /// Contact types counted for the atom weights (TOTAL selects all).
    #[arg(long = "contact-type", global = true, value_name = "TYPE")]
    pub contact_types: Vec<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S layout.seed=7
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,

    /// Also write the interactions document behind the scene. A directory gets
    /// `<pdb>_<bm>_interactions.json`.
    #[arg(long, global = true, value_name = "PATH")]
    pub export_payload: Option<PathBuf>,
}

/// Scenes `render` can build.
#[derive(Subcommand, Debug, Clone)]
pub enum SceneTarget {
    /// Interactions of a single ligand residue, drawn around its 2D depiction.
    Ligand {
        pdb_id: String,
        chain_id: String,
        #[arg(allow_negative_numbers = true)]
        residue_number: i32,
    },
    /// Residue-level interactions of a bound molecule.
    BoundMolecule { pdb_id: String, bm_id: String },
    /// Residue-level interactions of a carbohydrate polymer.
    Carbohydrate {
        pdb_id: String,
        bm_id: String,
        entity_id: String,
    },
    /// The bare 2D depiction of a chemical component.
    Depiction { ccd_id: String },
}

/// Arguments for the `weights` subcommand.
#[derive(Args, Debug)]
pub struct WeightsArgs {
    /// Ligand structural annotation (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub annotation: PathBuf,

    /// Aggregated contact counts per contact type (JSON).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub weights: PathBuf,

    /// Contact types to count; all types when omitted.
    #[arg(long = "contact-type", value_name = "TYPE")]
    pub contact_types: Vec<String>,

    /// Output path for the CSV table; standard output when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `data` subcommand.
#[derive(Args, Debug)]
pub struct DataArgs {
    #[command(subcommand)]
    pub command: DataCommands,
}

/// Available commands for the payload cache.
#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Show the absolute path to the local data directory.
    Path,
    /// Set a custom absolute path for the local data directory.
    SetPath {
        /// The new path to use for cached payloads.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Reset the data path to its default, OS-specific location.
    ResetPath,
    /// Delete every cached payload.
    Clear,
}
