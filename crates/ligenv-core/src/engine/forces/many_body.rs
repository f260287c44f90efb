use super::{Body, Force, Jiggle};

/// Pairwise attraction (positive strength) or repulsion (negative strength) with an
/// inverse-distance falloff, limited to a distance band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManyBodyForce {
    strength: f64,
    distance_min2: f64,
    distance_max2: f64,
}

impl ManyBodyForce {
    pub fn new(strength: f64, distance_min: f64, distance_max: f64) -> Self {
        Self {
            strength,
            distance_min2: distance_min * distance_min,
            distance_max2: distance_max * distance_max,
        }
    }
}

impl Force for ManyBodyForce {
    fn apply(&mut self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle) {
        let n = bodies.len();
        for i in 0..n {
            let (xi, yi) = (bodies[i].x, bodies[i].y);
            let (mut dvx, mut dvy) = (0.0, 0.0);
            for (j, other) in bodies.iter().enumerate() {
                if j == i {
                    continue;
                }
                let mut x = other.x - xi;
                let mut y = other.y - yi;
                let mut l = x * x + y * y;
                if l >= self.distance_max2 {
                    continue;
                }
                if x == 0.0 {
                    x = jiggle.next();
                    l += x * x;
                }
                if y == 0.0 {
                    y = jiggle.next();
                    l += y * y;
                }
                if l < self.distance_min2 {
                    l = (self.distance_min2 * l).sqrt();
                }
                let w = self.strength * alpha / l;
                dvx += x * w;
                dvy += y * w;
            }
            bodies[i].vx += dvx;
            bodies[i].vy += dvy;
        }
    }
}
