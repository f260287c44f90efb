//! # Workflows Module
//!
//! High-level entry points that turn a query (a ligand, a bound molecule, a carbohydrate
//! polymer or a bare chemical component) into a laid-out, interactive scene.
//!
//! ## Overview
//!
//! A query runs in three steps. Preparation fetches and decodes every document the scene
//! needs, including catalogue lookups, without touching the current scene. Installation swaps
//! the prepared scene in, unless a newer query has started meanwhile. Settling then steps the
//! layout until it comes to rest, after which the scene is fitted into the viewport.
//!
//! ## Architecture
//!
//! - **Resource Provider** ([`provider`]) - Injected source of the remote documents
//! - **Visualization** ([`visualization`]) - The scene orchestrator and its interaction handlers
//! - **Snapshot** ([`snapshot`]) - Serialisable view of the current scene

pub mod provider;
pub mod snapshot;
pub mod visualization;
