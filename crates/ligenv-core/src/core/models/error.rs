use crate::core::depiction::DepictionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Interaction type '{0}' does not exist")]
    UnknownInteractionType(String),

    #[error("Connection references residue '{0}' that is not part of the binding site")]
    UnknownResidue(String),

    #[error("Ligand interaction record carries no ligand atoms")]
    EmptyAtomSelection,

    #[error("Depiction error: {source}")]
    Depiction {
        #[from]
        source: DepictionError,
    },
}
