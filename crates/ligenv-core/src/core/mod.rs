//! # Core Module
//!
//! This module provides the stateless building blocks of a binding-site diagram.
//!
//! ## Overview
//!
//! Everything in here is constructed once per query and never mutated afterwards, except for
//! the layout fields of interaction nodes which the [`crate::engine`] layer drives.
//!
//! ## Architecture
//!
//! - **Interaction Graph** ([`models`]) - Residues, interaction nodes, typed links and the
//!   `BindingSite` aggregate that deduplicates them
//! - **Ligand Depiction** ([`depiction`]) - The fixed 2D structure of the ligand, initial node
//!   placement heuristics and atom-weight scales
//! - **Payload Codecs** ([`io`]) - Serde models of the external JSON payloads
//! - **Residue Catalogue** ([`catalogue`]) - Single-letter code lookups with a seeded cache
//! - **Geometry** ([`geometry`]) - 2D points and bounding boxes
//! - **Resources** ([`resources`]) - Environments and the remote resources a scene needs

pub mod catalogue;
pub mod depiction;
pub mod geometry;
pub mod io;
pub mod models;
pub mod resources;
