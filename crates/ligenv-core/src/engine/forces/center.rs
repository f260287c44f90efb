use super::{Body, Force, Jiggle};
use crate::core::geometry::Point;

/// Translates all bodies so that their mean position coincides with a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterForce {
    target: Point,
}

impl CenterForce {
    pub fn new(target: Point) -> Self {
        Self { target }
    }

    pub fn target(&self) -> Point {
        self.target
    }
}

impl Force for CenterForce {
    fn apply(&mut self, bodies: &mut [Body], _alpha: f64, _jiggle: &mut Jiggle) {
        if bodies.is_empty() {
            return;
        }
        let n = bodies.len() as f64;
        let sx = bodies.iter().map(|b| b.x).sum::<f64>() / n - self.target.x;
        let sy = bodies.iter().map(|b| b.y).sum::<f64>() / n - self.target.y;
        for body in bodies.iter_mut() {
            body.x -= sx;
            body.y -= sy;
        }
    }
}
