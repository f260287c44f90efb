//! # Engine Module
//!
//! The stateful half of the library: the force-directed layout that relaxes an interaction
//! graph around its ligand, and everything needed to present the result.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Scene presets, layout and visualization parameters
//! - **Simulation** ([`simulation`]) - Alpha-cooled velocity Verlet integration over the graph
//! - **Forces** ([`forces`]) - Link springs, many-body repulsion, collision and centering
//! - **Viewport** ([`viewport`]) - Fitting the laid-out scene into a display rectangle
//! - **Events** ([`events`]) - The semantic event stream consumed by an external UI
//! - **Progress Monitoring** ([`progress`]) - Progress callbacks for long-running phases
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod config;
pub mod error;
pub mod events;
pub mod forces;
pub mod progress;
pub mod simulation;
pub mod viewport;
