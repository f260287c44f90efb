use super::{Body, Force, Jiggle};

/// Keeps bodies of a uniform radius from overlapping, using their predicted next positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollideForce {
    radius: f64,
    strength: f64,
    iterations: usize,
}

impl CollideForce {
    pub fn new(radius: f64, strength: f64, iterations: usize) -> Self {
        Self {
            radius,
            strength,
            iterations,
        }
    }
}

impl Force for CollideForce {
    fn apply(&mut self, bodies: &mut [Body], _alpha: f64, jiggle: &mut Jiggle) {
        let n = bodies.len();
        let r = 2.0 * self.radius;
        let ri2 = self.radius * self.radius;
        let share = ri2 / (ri2 + ri2);

        for _ in 0..self.iterations {
            for i in 0..n {
                let xi = bodies[i].x + bodies[i].vx;
                let yi = bodies[i].y + bodies[i].vy;
                for j in (i + 1)..n {
                    let other = bodies[j];
                    let mut x = xi - other.x - other.vx;
                    let mut y = yi - other.y - other.vy;
                    let mut l = x * x + y * y;
                    if l >= r * r {
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
                    let d = l.sqrt();
                    let l = (r - d) / d * self.strength;
                    let (x, y) = (x * l, y * l);

                    bodies[i].vx += x * share;
                    bodies[i].vy += y * share;
                    bodies[j].vx -= x * (1.0 - share);
                    bodies[j].vy -= y * (1.0 - share);
                }
            }
        }
    }
}
