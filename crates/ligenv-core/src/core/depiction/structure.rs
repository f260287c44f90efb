use super::DepictionError;
use super::weights::AtomWeightScale;
use crate::core::geometry::{BoundingBox, Point, centroid};
use crate::core::io::payload::{LabelGlyph, LigandAnnotation};
use nalgebra::Vector2;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#BFBFBF";
/// Extra room kept around atoms that carry label glyphs.
pub const LABEL_PADDING: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub name: String,
    pub labels: Vec<LabelGlyph>,
    pub position: Point,
    /// Number of distinct atoms this one is bonded to.
    pub connectivity: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub bgn: String,
    pub end: String,
    pub coords: String,
    pub style: String,
}

impl Bond {
    fn new(bgn: &str, end: &str, coords: &str, style: &str) -> Self {
        Self {
            bgn: bgn.to_string(),
            end: end.to_string(),
            coords: coords.to_string(),
            style: style.replace("stroke-width:2px", "stroke-width:4px"),
        }
    }

    pub fn contains_atom(&self, name: &str) -> bool {
        self.bgn == name || self.end == name
    }

    pub fn other_atom(&self, name: &str) -> Result<&str, DepictionError> {
        if self.bgn == name {
            Ok(&self.end)
        } else if self.end == name {
            Ok(&self.bgn)
        } else {
            Err(DepictionError::AtomNotInBond(name.to_string()))
        }
    }
}

/// Atoms and bonds of a highlighted substructure.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub color: String,
    pub atoms: Vec<String>,
    pub bonds: Vec<Bond>,
}

#[derive(Debug, Clone)]
pub struct Depiction {
    pub ccd_id: String,
    pub resolution: Vector2<f64>,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    atom_index: HashMap<String, usize>,
}

impl Depiction {
    pub fn from_annotation(annotation: &LigandAnnotation) -> Result<Self, DepictionError> {
        if annotation.atoms.is_empty() {
            return Err(DepictionError::Empty(annotation.ccd_id.clone()));
        }

        let mut atoms: Vec<Atom> = annotation
            .atoms
            .iter()
            .map(|a| Atom {
                name: a.name.clone(),
                labels: a.labels.clone(),
                position: Point::new(a.x, a.y),
                connectivity: 0,
                weight: 0.0,
            })
            .collect();

        let mut atom_index = HashMap::with_capacity(atoms.len());
        for (i, atom) in atoms.iter().enumerate() {
            atom_index.entry(atom.name.clone()).or_insert(i);
        }

        let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
        let mut bonds = Vec::with_capacity(annotation.bonds.len());
        for raw in &annotation.bonds {
            let lookup = |name: &str| {
                atom_index
                    .get(name)
                    .copied()
                    .ok_or_else(|| DepictionError::DanglingBond {
                        ccd_id: annotation.ccd_id.clone(),
                        atom: name.to_string(),
                    })
            };
            let a = lookup(&raw.bgn)?;
            let b = lookup(&raw.end)?;

            // Several drawing primitives may describe one chemical bond.
            let pair = if raw.bgn <= raw.end {
                (raw.bgn.clone(), raw.end.clone())
            } else {
                (raw.end.clone(), raw.bgn.clone())
            };
            if seen_pairs.insert(pair) {
                atoms[a].connectivity += 1;
                atoms[b].connectivity += 1;
            }
            bonds.push(Bond::new(&raw.bgn, &raw.end, &raw.coords, &raw.style));
        }

        debug!(
            ccd_id = %annotation.ccd_id,
            atoms = atoms.len(),
            bonds = bonds.len(),
            "Constructed ligand depiction"
        );

        Ok(Self {
            ccd_id: annotation.ccd_id.clone(),
            resolution: Vector2::new(annotation.resolution.x, annotation.resolution.y),
            atoms,
            bonds,
            atom_index,
        })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atom_index.get(name).map(|&i| &self.atoms[i])
    }

    fn position_of(&self, name: &str) -> Result<Point, DepictionError> {
        self.atom(name)
            .map(|a| a.position)
            .ok_or_else(|| DepictionError::UnknownAtom(name.to_string()))
    }

    /// Starting point for a partner in contact with `atom_names`.
    ///
    /// The least connected contact atom (first one in depiction order on ties) is reflected
    /// through one of its bonded neighbours, which puts the partner roughly one bond length
    /// outside the ligand. A single-atom depiction returns the position of that atom.
    ///
    /// # Errors
    ///
    /// Returns an error if none of the atoms is part of the depiction, or if the chosen atom
    /// has no bond.
    pub fn initial_node_position<S: AsRef<str>>(&self, atom_names: &[S]) -> Result<Point, DepictionError> {
        if let [only] = self.atoms.as_slice() {
            return Ok(only.position);
        }

        let chosen = self
            .atoms
            .iter()
            .filter(|a| atom_names.iter().any(|n| n.as_ref() == a.name))
            .min_by_key(|a| a.connectivity)
            .ok_or_else(|| DepictionError::NoMatchingAtoms(join_names(atom_names)))?;

        let bond = self
            .bonds
            .iter()
            .find(|b| b.contains_atom(&chosen.name))
            .ok_or_else(|| DepictionError::UnbondedAtom(chosen.name.clone()))?;
        let neighbour = self.position_of(bond.other_atom(&chosen.name)?)?;

        Ok(neighbour - 2.0 * (neighbour - chosen.position))
    }

    /// Arithmetic mean of the named atom positions.
    pub fn center<S: AsRef<str>>(&self, atom_names: &[S]) -> Result<Point, DepictionError> {
        let positions = atom_names
            .iter()
            .map(|n| self.position_of(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        centroid(&positions).ok_or_else(|| DepictionError::NoMatchingAtoms(String::new()))
    }

    /// The named atoms and every bond whose both ends are among them.
    pub fn highlight<S: AsRef<str>>(&self, atom_names: &[S], color: Option<&str>) -> Highlight {
        let selected: HashSet<&str> = atom_names.iter().map(|n| n.as_ref()).collect();
        Highlight {
            color: color.unwrap_or(DEFAULT_HIGHLIGHT_COLOR).to_string(),
            atoms: self
                .atoms
                .iter()
                .filter(|a| selected.contains(a.name.as_str()))
                .map(|a| a.name.clone())
                .collect(),
            bonds: self
                .bonds
                .iter()
                .filter(|b| selected.contains(b.bgn.as_str()) && selected.contains(b.end.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Box around all atoms, grown by [`LABEL_PADDING`] around atoms that carry label glyphs.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let all = BoundingBox::from_points(self.atoms.iter().map(|a| &a.position))?;
        let labelled = BoundingBox::from_points(
            self.atoms
                .iter()
                .filter(|a| !a.labels.is_empty())
                .map(|a| &a.position),
        );
        Some(match labelled {
            Some(labelled) => all.union(&labelled.padded(LABEL_PADDING)),
            None => all,
        })
    }

    /// Replaces all atom weights; atoms missing from `weights` get weight 0.
    pub fn set_weights<'a, I>(&mut self, weights: I)
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        self.atoms.iter_mut().for_each(|a| a.weight = 0.0);
        for (name, weight) in weights {
            if let Some(&i) = self.atom_index.get(name) {
                self.atoms[i].weight = weight;
            } else {
                debug!(atom = name, ccd_id = %self.ccd_id, "Ignoring weight for unknown atom");
            }
        }
    }

    pub fn weight_scale(&self) -> AtomWeightScale {
        AtomWeightScale::from_weights(self.atoms.iter().map(|a| a.weight))
    }
}

fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names.iter().map(|n| n.as_ref()).collect::<Vec<_>>().join(", ")
}
