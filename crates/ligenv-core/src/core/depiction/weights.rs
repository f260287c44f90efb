use crate::core::io::payload::AggregatedWeights;
use std::fmt;

/// Pixel band the square-root radius scale maps the positive weight range onto.
pub const RADIUS_BAND: (f64, f64) = (10.0, 25.0);
/// Radius of atoms without any recorded interaction.
pub const DEFAULT_RADIUS: f64 = 6.0;
/// Weight at which the color ramp reaches its middle stop.
pub const COLOR_EPSILON: f64 = 1e-3;

pub const DEFAULT_COLOR: Rgb = Rgb(255, 255, 255);
const COLOR_STOPS: [Rgb; 3] = [Rgb(255, 255, 255), Rgb(254, 227, 145), Rgb(204, 76, 2)];

pub const TOTAL_CONTACT_TYPE: &str = "TOTAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Visual scales derived from the current atom weights of a depiction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomWeightScale {
    min_positive: Option<f64>,
    max: f64,
}

impl AtomWeightScale {
    pub fn from_weights(weights: impl IntoIterator<Item = f64>) -> Self {
        let (min_positive, max) = weights.into_iter().fold((None, 0.0_f64), |(lo, hi), w| {
            let lo = if w > 0.0 {
                Some(lo.map_or(w, |l: f64| l.min(w)))
            } else {
                lo
            };
            (lo, hi.max(w))
        });
        Self { min_positive, max }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn radius(&self, weight: f64) -> f64 {
        let Some(lo) = self.min_positive.filter(|_| weight > 0.0) else {
            return DEFAULT_RADIUS;
        };
        let (lo, hi) = (lo.sqrt(), self.max.sqrt());
        let t = if hi > lo {
            ((weight.sqrt() - lo) / (hi - lo)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        RADIUS_BAND.0 + t * (RADIUS_BAND.1 - RADIUS_BAND.0)
    }

    /// Position of `weight` on the color ramp, in `[0, 2]`: the first unit spans
    /// `[0, COLOR_EPSILON]`, the second `[COLOR_EPSILON, max]`.
    pub fn color_position(&self, weight: f64) -> f64 {
        if weight <= 0.0 {
            return 0.0;
        }
        if weight < COLOR_EPSILON {
            return weight / COLOR_EPSILON;
        }
        if self.max > COLOR_EPSILON {
            1.0 + ((weight - COLOR_EPSILON) / (self.max - COLOR_EPSILON)).clamp(0.0, 1.0)
        } else {
            2.0
        }
    }

    pub fn color(&self, weight: f64) -> Rgb {
        if weight <= 0.0 {
            return DEFAULT_COLOR;
        }
        let t = self.color_position(weight);
        if t <= 1.0 {
            COLOR_STOPS[0].lerp(COLOR_STOPS[1], t)
        } else {
            COLOR_STOPS[1].lerp(COLOR_STOPS[2], t - 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomPropensity {
    pub atom: String,
    /// Share of all selected contacts, in percent.
    pub value: f64,
}

/// Per-atom share of contacts of the requested types; [`TOTAL_CONTACT_TYPE`] selects all.
///
/// Atoms are listed in the order they are first seen.
pub fn atom_propensity<S: AsRef<str>>(weights: &AggregatedWeights, contact_types: &[S]) -> Vec<AtomPropensity> {
    let all = contact_types
        .iter()
        .any(|t| t.as_ref() == TOTAL_CONTACT_TYPE);
    let groups: Vec<_> = if all {
        weights.0.iter().map(|(_, counts)| counts).collect()
    } else {
        contact_types
            .iter()
            .filter_map(|t| weights.0.get(t.as_ref()))
            .collect()
    };

    let mut totals: Vec<(String, f64)> = Vec::new();
    for entry in groups.into_iter().flatten() {
        match totals.iter_mut().find(|(atom, _)| *atom == entry.atom) {
            Some((_, count)) => *count += entry.count,
            None => totals.push((entry.atom.clone(), entry.count)),
        }
    }

    let sum: f64 = totals.iter().map(|(_, c)| c).sum();
    totals
        .into_iter()
        .map(|(atom, count)| AtomPropensity {
            atom,
            value: if sum > 0.0 { count / sum * 100.0 } else { 0.0 },
        })
        .collect()
}
