//! Forces acting on the bodies of a layout simulation.
//!
//! Each force reads positions and velocities of the whole body set and adjusts velocities
//! (or, for centering, positions) in place. Pair interactions are evaluated exactly; graphs
//! handled here are a few dozen nodes at most.

mod center;
mod collide;
mod link;
mod many_body;

pub use center::CenterForce;
pub use collide::CollideForce;
pub use link::{LinkForce, Spring};
pub use many_body::ManyBodyForce;

use rand::prelude::*;

/// Kinematic state of a single node during the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

impl Body {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

/// Tiny random displacement used to separate coincident bodies.
#[derive(Debug, Clone)]
pub struct Jiggle {
    rng: StdRng,
}

impl Jiggle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next(&mut self) -> f64 {
        (self.rng.r#gen::<f64>() - 0.5) * 1e-6
    }
}

pub trait Force: Send {
    /// Precomputes per-body state. Called whenever the body set changes.
    fn initialize(&mut self, _bodies: &[Body]) {}

    fn apply(&mut self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle);
}
