//! # Interaction Graph Models
//!
//! Data structures describing the interaction graph of one binding site.
//!
//! ## Key Components
//!
//! - [`residue`] - Residues, their derived identity and display classification
//! - [`node`] - Interaction nodes carrying layout state
//! - [`interaction`] - Interaction types, contact records and the link classification table
//! - [`link`] - Residue-residue and ligand-residue links
//! - [`registry`] - Identity-aware sets used while building a site
//! - [`site`] - The `BindingSite` aggregate and its construction from payloads
//! - [`ids`] - Stable node keys

pub mod error;
pub mod ids;
pub mod interaction;
pub mod link;
pub mod node;
pub mod registry;
pub mod residue;
pub mod site;
