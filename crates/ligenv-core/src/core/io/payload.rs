use super::traits::{JsonDocument, decode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error while reading payload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload carries no entries")]
    Empty,

    #[error("Payload entry '{0}' has no records")]
    EmptyEntry(String),
}

/// Residue identity as it appears in every interaction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueRecord {
    pub chain_id: String,
    pub author_residue_number: i32,
    pub chem_comp_id: String,
    #[serde(default)]
    pub author_insertion_code: Option<String>,
}

impl ResidueRecord {
    pub fn insertion_code(&self) -> &str {
        self.author_insertion_code.as_deref().unwrap_or("")
    }
}

// --- Ligand structural annotation ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGlyph {
    pub d: String,
    #[serde(default)]
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationAtom {
    pub name: String,
    #[serde(default)]
    pub labels: Vec<LabelGlyph>,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBond {
    pub bgn: String,
    pub end: String,
    #[serde(default)]
    pub coords: String,
    #[serde(default)]
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LigandAnnotation {
    pub ccd_id: String,
    pub resolution: Resolution,
    pub atoms: Vec<AnnotationAtom>,
    #[serde(default)]
    pub bonds: Vec<AnnotationBond>,
}

impl JsonDocument for LigandAnnotation {
    fn from_json(text: &str) -> Result<Self, PayloadError> {
        decode(text)
    }
}

// --- Bound molecule / bound polymer interactions ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Composition {
    #[serde(default)]
    pub ligands: Vec<ResidueRecord>,
    #[serde(default)]
    pub connections: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResidueInteractionRecord {
    pub begin: ResidueRecord,
    pub end: ResidueRecord,
    pub interactions: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoundMoleculeEntry {
    pub bm_id: String,
    pub composition: Composition,
    #[serde(default)]
    pub interactions: Vec<ResidueInteractionRecord>,
}

impl JsonDocument for BoundMoleculeEntry {
    fn from_json(text: &str) -> Result<Self, PayloadError> {
        first_record(decode(text)?)
    }
}

// --- Bound ligand interactions ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContactPartner {
    #[serde(flatten)]
    pub residue: ResidueRecord,
    #[serde(default)]
    pub atom_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LigandInteractionRecord {
    pub ligand_atoms: Vec<String>,
    pub end: ContactPartner,
    pub interaction_type: String,
    #[serde(default)]
    pub interaction_details: Vec<String>,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LigandInteractionEntry {
    pub ligand: ResidueRecord,
    #[serde(default)]
    pub interactions: Vec<LigandInteractionRecord>,
}

impl JsonDocument for LigandInteractionEntry {
    fn from_json(text: &str) -> Result<Self, PayloadError> {
        first_record(decode(text)?)
    }
}

// --- Aggregated per-atom contact counts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactCount {
    pub atom: String,
    #[serde(default)]
    pub residue: String,
    pub count: f64,
}

/// Contact counts grouped by contact type, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedWeights(pub IndexMap<String, Vec<ContactCount>>);

impl JsonDocument for AggregatedWeights {
    fn from_json(text: &str) -> Result<Self, PayloadError> {
        decode(text)
    }
}

// --- Compound summary (single-letter code lookups) ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompoundSummary {
    #[serde(default)]
    pub one_letter_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct CompoundSummaryDocument(pub IndexMap<String, Vec<CompoundSummary>>);

impl CompoundSummaryDocument {
    pub fn one_letter_code(&self, code: &str) -> Option<&str> {
        self.0
            .get(code)
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.one_letter_code.as_deref())
    }
}

impl JsonDocument for CompoundSummaryDocument {
    fn from_json(text: &str) -> Result<Self, PayloadError> {
        decode(text)
    }
}

/// Unwraps the `{ <key>: [record, ...] }` envelope to the first record of the first key.
fn first_record<T>(envelope: IndexMap<String, Vec<T>>) -> Result<T, PayloadError> {
    let (key, records) = envelope
        .into_iter()
        .next()
        .ok_or(PayloadError::Empty)?;
    records
        .into_iter()
        .next()
        .ok_or(PayloadError::EmptyEntry(key))
}
