//! # LigEnv Core Library
//!
//! Interaction-graph construction and 2D layout for ligand binding-site diagrams: the
//! residues and ligand atoms taking part in a contact become nodes, the contacts become typed
//! links, and a force simulation relaxes the graph around a fixed 2D depiction of the ligand.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so that each concern can be tested in
//! isolation.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Residue`, `InteractionNode`, `Link`,
//!   `BindingSite`), the ligand `Depiction` and its geometry, payload codecs, the residue
//!   catalogue and the remote resource descriptions.
//!
//! - **[`engine`]: The Layout Core.** The stateful force simulation (`Simulation` and its
//!   forces), viewport fitting, layout configuration, progress reporting and the semantic event
//!   stream consumed by an external UI.
//!
//! - **[`workflows`]: The Public API.** The `Visualization` orchestrator that sequences resource
//!   retrieval, graph construction, layout and viewport fitting for one scene.

pub mod core;
pub mod engine;
pub mod workflows;
