use super::{Body, Force, Jiggle};

/// A link between two bodies, by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub source: usize,
    pub target: usize,
    pub distance: f64,
    /// `None` derives the stiffness from the endpoint degrees.
    pub strength: Option<f64>,
}

/// Pulls linked bodies toward their rest distance, splitting the correction by degree.
#[derive(Debug, Clone)]
pub struct LinkForce {
    springs: Vec<Spring>,
    strengths: Vec<f64>,
    biases: Vec<f64>,
    iterations: usize,
}

impl LinkForce {
    pub fn new(springs: Vec<Spring>, iterations: usize) -> Self {
        Self {
            springs,
            strengths: Vec::new(),
            biases: Vec::new(),
            iterations,
        }
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn strengths(&self) -> &[f64] {
        &self.strengths
    }
}

impl Force for LinkForce {
    fn initialize(&mut self, bodies: &[Body]) {
        let mut degree = vec![0usize; bodies.len()];
        for spring in &self.springs {
            degree[spring.source] += 1;
            degree[spring.target] += 1;
        }

        self.biases = self
            .springs
            .iter()
            .map(|s| {
                let (ds, dt) = (degree[s.source] as f64, degree[s.target] as f64);
                ds / (ds + dt)
            })
            .collect();
        self.strengths = self
            .springs
            .iter()
            .map(|s| {
                s.strength
                    .unwrap_or_else(|| 1.0 / degree[s.source].min(degree[s.target]) as f64)
            })
            .collect();
    }

    fn apply(&mut self, bodies: &mut [Body], alpha: f64, jiggle: &mut Jiggle) {
        for _ in 0..self.iterations {
            for (i, spring) in self.springs.iter().enumerate() {
                let (s, t) = (bodies[spring.source], bodies[spring.target]);
                let mut x = t.x + t.vx - s.x - s.vx;
                let mut y = t.y + t.vy - s.y - s.vy;
                if x == 0.0 {
                    x = jiggle.next();
                }
                if y == 0.0 {
                    y = jiggle.next();
                }
                let l = (x * x + y * y).sqrt();
                let l = (l - spring.distance) / l * alpha * self.strengths[i];
                let (x, y) = (x * l, y * l);
                let bias = self.biases[i];

                let target = &mut bodies[spring.target];
                target.vx -= x * bias;
                target.vy -= y * bias;
                let source = &mut bodies[spring.source];
                source.vx += x * (1.0 - bias);
                source.vy += y * (1.0 - bias);
            }
        }
    }
}
