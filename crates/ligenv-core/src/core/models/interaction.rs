use super::error::ModelError;
use phf::{Set, phf_set};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionType {
    AtomAtom,
    AtomPlane,
    PlanePlane,
    GroupPlane,
    GroupGroup,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::AtomAtom => "atom_atom",
            InteractionType::AtomPlane => "atom_plane",
            InteractionType::PlanePlane => "plane_plane",
            InteractionType::GroupPlane => "group_plane",
            InteractionType::GroupGroup => "group_group",
        }
    }
}

impl FromStr for InteractionType {
    type Err = ModelError;

    /// Accepts both the underscore and the hyphenated spelling (`atom-atom`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "atom_atom" => Ok(InteractionType::AtomAtom),
            "atom_plane" => Ok(InteractionType::AtomPlane),
            "plane_plane" => Ok(InteractionType::PlanePlane),
            "group_plane" => Ok(InteractionType::GroupPlane),
            "group_group" => Ok(InteractionType::GroupGroup),
            _ => Err(ModelError::UnknownInteractionType(s.to_string())),
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ligand-to-partner contact record.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub source_atoms: Vec<String>,
    pub target_atoms: Vec<String>,
    pub interaction_type: InteractionType,
    pub details: Vec<String>,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    Covalent,
    Electrostatic,
    Amide,
    Vdw,
    Hydrophobic,
    Aromatic,
    AtomPi,
    Metal,
    Clashes,
    Ligand,
    Other,
}

/// Detail-tag categories, tried in order; the first category matching any tag wins.
pub static LINK_CLASS_TABLE: &[(LinkClass, &[&str])] = &[
    (LinkClass::Covalent, &["covalent"]),
    (
        LinkClass::Electrostatic,
        &["ionic", "hbond", "weak_hbond", "polar", "weak_polar", "xbond", "carbonyl"],
    ),
    (LinkClass::Amide, &["AMIDEAMIDE", "AMIDERING"]),
    (LinkClass::Vdw, &["vdw"]),
    (LinkClass::Hydrophobic, &["hydrophobic"]),
    (
        LinkClass::Aromatic,
        &["aromatic", "FF", "OF", "EE", "FT", "OT", "ET", "FE", "OE", "EF"],
    ),
    (
        LinkClass::AtomPi,
        &["CARBONPI", "CATIONPI", "DONORPI", "HALOGENPI", "METSULPHURPI"],
    ),
    (LinkClass::Metal, &["metal_complex"]),
    (LinkClass::Clashes, &["clash", "vdw_clash"]),
];

pub static BACKBONE_ATOMS: Set<&'static str> = phf_set! { "N", "CA", "C", "O" };

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOMS.contains(atom_name)
}

impl LinkClass {
    /// Classifies a bag of detail tags against [`LINK_CLASS_TABLE`].
    pub fn classify<'a, I>(tags: I) -> Self
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        LINK_CLASS_TABLE
            .iter()
            .find(|(_, members)| tags.clone().into_iter().any(|tag| members.contains(&tag)))
            .map_or(LinkClass::Other, |(class, _)| *class)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LinkClass::Covalent => "covalent",
            LinkClass::Electrostatic => "electrostatic",
            LinkClass::Amide => "amide",
            LinkClass::Vdw => "vdw",
            LinkClass::Hydrophobic => "hydrophobic",
            LinkClass::Aromatic => "aromatic",
            LinkClass::AtomPi => "atom-pi",
            LinkClass::Metal => "metal",
            LinkClass::Clashes => "clashes",
            LinkClass::Ligand => "ligand",
            LinkClass::Other => "other",
        }
    }
}

impl fmt::Display for LinkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
