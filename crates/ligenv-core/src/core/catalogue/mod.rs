//! Resolution of chemical component codes to single-letter classification codes.
//!
//! The catalogue is seeded with the standard amino acids and extended at runtime with the
//! results of compound-summary lookups. It is an explicit value owned by the caller rather than
//! process-wide state, so two visualizations can keep independent caches.

mod tables;

use crate::core::io::payload::CompoundSummaryDocument;
use crate::core::io::traits::JsonDocument;
use crate::core::io::PayloadError;
use crate::core::models::residue::Residue;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::debug;

pub use tables::STANDARD_AMINO_ACIDS;

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Compound summary for '{code}' could not be decoded: {source}")]
    Payload {
        code: String,
        #[source]
        source: PayloadError,
    },

    #[error("Compound summary for '{0}' carries no single-letter code")]
    MissingCode(String),
}

#[derive(Debug, Clone)]
pub struct ResidueCatalogue {
    mapping: HashMap<String, String>,
}

impl Default for ResidueCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl ResidueCatalogue {
    pub fn new() -> Self {
        let mapping = STANDARD_AMINO_ACIDS
            .entries()
            .map(|(code, letter)| (code.to_string(), letter.to_string()))
            .collect();
        Self { mapping }
    }

    pub fn abbreviation(&self, chem_comp_id: &str) -> Option<&str> {
        self.mapping.get(chem_comp_id).map(String::as_str)
    }

    pub fn contains(&self, chem_comp_id: &str) -> bool {
        self.mapping.contains_key(chem_comp_id)
    }

    /// Ligands are never classified through the catalogue.
    pub fn needs_lookup(&self, residue: &Residue) -> bool {
        !residue.is_ligand && !self.contains(&residue.chem_comp_id)
    }

    /// Distinct codes of `residues` that still need a remote lookup, sorted.
    pub fn pending_codes<'a, I>(&self, residues: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a Residue>,
    {
        residues
            .into_iter()
            .filter(|r| self.needs_lookup(r))
            .map(|r| r.chem_comp_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn insert(&mut self, chem_comp_id: impl Into<String>, one_letter_code: impl Into<String>) {
        let (code, letter) = (chem_comp_id.into(), one_letter_code.into());
        debug!(code = %code, letter = %letter, "Registered residue abbreviation");
        self.mapping.insert(code, letter);
    }

    /// Extracts the single-letter code of `chem_comp_id` from a compound-summary document.
    pub fn parse_summary(chem_comp_id: &str, text: &str) -> Result<String, CatalogueError> {
        let document =
            CompoundSummaryDocument::from_json(text).map_err(|source| CatalogueError::Payload {
                code: chem_comp_id.to_string(),
                source,
            })?;
        document
            .one_letter_code(chem_comp_id)
            .map(str::to_string)
            .ok_or_else(|| CatalogueError::MissingCode(chem_comp_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_catalogue_is_seeded_with_standard_amino_acids() {
        let catalogue = ResidueCatalogue::new();
        assert_eq!(catalogue.len(), 20);
        assert_eq!(catalogue.abbreviation("TRP"), Some("W"));
        assert_eq!(catalogue.abbreviation("MSE"), None);
    }

    #[test]
    fn ligands_and_known_codes_need_no_lookup() {
        let catalogue = ResidueCatalogue::new();
        assert!(!catalogue.needs_lookup(&Residue::new("A", 1, "ATP", " ", true)));
        assert!(!catalogue.needs_lookup(&Residue::new("A", 2, "GLY", " ", false)));
        assert!(catalogue.needs_lookup(&Residue::new("A", 3, "MSE", " ", false)));
    }

    #[test]
    fn pending_codes_are_distinct_and_sorted() {
        let catalogue = ResidueCatalogue::new();
        let residues = [
            Residue::new("A", 1, "SEP", " ", false),
            Residue::new("A", 2, "MSE", " ", false),
            Residue::new("A", 3, "SEP", " ", false),
            Residue::new("A", 4, "ALA", " ", false),
        ];
        assert_eq!(catalogue.pending_codes(&residues), vec!["MSE", "SEP"]);
    }

    #[test]
    fn inserted_codes_are_used_for_classification() {
        let mut catalogue = ResidueCatalogue::new();
        let code = ResidueCatalogue::parse_summary("MSE", r#"{"MSE": [{"one_letter_code": "M"}]}"#)
            .unwrap();
        catalogue.insert("MSE", code);
        assert_eq!(catalogue.abbreviation("MSE"), Some("M"));
        assert!(!catalogue.needs_lookup(&Residue::new("A", 2, "MSE", " ", false)));
    }

    #[test]
    fn summary_without_code_is_an_error() {
        assert!(matches!(
            ResidueCatalogue::parse_summary("XYZ", r#"{"XYZ": [{}]}"#),
            Err(CatalogueError::MissingCode(_))
        ));
        assert!(matches!(
            ResidueCatalogue::parse_summary("XYZ", "not json"),
            Err(CatalogueError::Payload { .. })
        ));
    }
}
