use crate::cli::WeightsArgs;
use crate::error::{CliError, Result};
use ligenv::core::depiction::Depiction;
use ligenv::core::depiction::weights::{TOTAL_CONTACT_TYPE, atom_propensity};
use ligenv::core::io::payload::{AggregatedWeights, LigandAnnotation};
use ligenv::core::io::traits::JsonDocument;
use ligenv::workflows::visualization::VisualizationError;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightRow {
    pub atom: String,
    pub weight: f64,
    pub radius: f64,
    pub color: String,
}

pub async fn run(args: WeightsArgs) -> Result<()> {
    let annotation: LigandAnnotation = read_document(&args.annotation)?;
    let weights: AggregatedWeights = read_document(&args.weights)?;
    let contact_types = if args.contact_types.is_empty() {
        vec![TOTAL_CONTACT_TYPE.to_string()]
    } else {
        args.contact_types
    };

    let rows = weight_table(&annotation, &weights, &contact_types)?;
    info!(
        "Weighted {} atom(s) of {} by [{}]",
        rows.len(),
        annotation.ccd_id,
        contact_types.join(", ")
    );

    match &args.output {
        Some(path) => {
            write_table(&rows, File::create(path)?)?;
            println!("Atom weights written to: {}", path.display());
        }
        None => write_table(&rows, std::io::stdout().lock())?,
    }
    Ok(())
}

pub fn read_document<T: JsonDocument>(path: &Path) -> Result<T> {
    let mut file = File::open(path)?;
    T::read_from(&mut file).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// One row per depiction atom, in depiction order; atoms without contacts get weight 0.
pub fn weight_table<S: AsRef<str>>(
    annotation: &LigandAnnotation,
    weights: &AggregatedWeights,
    contact_types: &[S],
) -> Result<Vec<WeightRow>> {
    let mut depiction = Depiction::from_annotation(annotation).map_err(VisualizationError::from)?;
    let propensities = atom_propensity(weights, contact_types);
    depiction.set_weights(propensities.iter().map(|p| (p.atom.as_str(), p.value)));

    let scale = depiction.weight_scale();
    Ok(depiction
        .atoms()
        .iter()
        .map(|atom| WeightRow {
            atom: atom.name.clone(),
            weight: atom.weight,
            radius: scale.radius(atom.weight),
            color: scale.color(atom.weight).to_string(),
        })
        .collect())
}

pub fn write_table(rows: &[WeightRow], writer: impl Write) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}
