//! The fixed 2D depiction of a ligand.
//!
//! A [`Depiction`] is decoded from a ligand structural annotation and never changes shape
//! afterwards. It answers the geometric questions graph construction asks: where should a
//! partner touching a set of atoms start, what is the centroid of an atom group, which bonds
//! belong to a highlighted substructure. The [`weights`] submodule maps per-atom interaction
//! weights to visual radius and color scales.

mod structure;
pub mod weights;

pub use structure::{Atom, Bond, Depiction, Highlight, DEFAULT_HIGHLIGHT_COLOR, LABEL_PADDING};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DepictionError {
    #[error("Atom {0} is not a part of the bond")]
    AtomNotInBond(String),

    #[error("Atom {0} is not part of the depiction")]
    UnknownAtom(String),

    #[error("Bond references atom {atom} that is not part of the depiction of {ccd_id}")]
    DanglingBond { ccd_id: String, atom: String },

    #[error("Atom {0} is not bonded to any other atom")]
    UnbondedAtom(String),

    #[error("None of the atoms [{0}] is part of the depiction")]
    NoMatchingAtoms(String),

    #[error("Depiction of {0} has no atoms")]
    Empty(String),
}
