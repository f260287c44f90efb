use super::error::ModelError;
use super::ids::NodeId;
use super::interaction::{Interaction, InteractionType, LinkClass, is_backbone_atom};
use super::registry::NodeSet;
use super::residue::Residue;
use crate::core::catalogue::ResidueCatalogue;
use indexmap::IndexMap;

const NON_RESIDUE_CODE: &str = "X";

/// Contact between two residues of a bound molecule or polymer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueResidueLink {
    pub source: NodeId,
    pub target: NodeId,
    pub interactions: Vec<(InteractionType, Vec<String>)>,
}

impl ResidueResidueLink {
    pub fn new(
        source: NodeId,
        target: NodeId,
        raw: &IndexMap<String, Vec<String>>,
    ) -> Result<Self, ModelError> {
        let mut interactions: Vec<(InteractionType, Vec<String>)> = Vec::with_capacity(raw.len());
        for (kind, tags) in raw {
            let kind: InteractionType = kind.parse()?;
            match interactions.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, existing)) => *existing = tags.clone(),
                None => interactions.push((kind, tags.clone())),
            }
        }
        Ok(Self {
            source,
            target,
            interactions,
        })
    }

    /// The implicit covalent bond of a composition connection.
    pub fn covalent(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            interactions: vec![(InteractionType::AtomAtom, vec!["covalent".to_string()])],
        }
    }

    fn tags(&self) -> impl Iterator<Item = &str> + Clone {
        self.interactions
            .iter()
            .flat_map(|(_, tags)| tags.iter().map(String::as_str))
    }

    /// Both endpoints belong to the bound molecule and are covalently bonded.
    pub fn is_bound_molecule_link(&self, nodes: &NodeSet) -> bool {
        let both_ligands = [self.source, self.target]
            .iter()
            .all(|&id| nodes.get(id).is_some_and(|n| n.residue.is_ligand));
        both_ligands
            && self.interactions.iter().any(|(kind, tags)| {
                *kind == InteractionType::AtomAtom && tags.iter().any(|t| t == "covalent")
            })
    }
}

/// Contact between an atom (group) of the ligand and a partner residue.
#[derive(Debug, Clone, PartialEq)]
pub struct LigandResidueLink {
    pub source: NodeId,
    pub target: NodeId,
    pub interactions: Vec<Interaction>,
}

impl LigandResidueLink {
    pub fn new(source: NodeId, target: NodeId, first: Interaction) -> Self {
        Self {
            source,
            target,
            interactions: vec![first],
        }
    }

    pub fn add_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    fn tags(&self) -> impl Iterator<Item = &str> + Clone {
        self.interactions
            .iter()
            .flat_map(|i| i.details.iter().map(String::as_str))
    }

    pub fn class(&self) -> LinkClass {
        LinkClass::classify(self.tags())
    }

    pub fn is_atom_atom_only(&self) -> bool {
        self.interactions
            .iter()
            .all(|i| i.interaction_type == InteractionType::AtomAtom)
    }

    pub fn target_atoms(&self) -> impl Iterator<Item = &str> {
        self.interactions
            .iter()
            .flat_map(|i| i.target_atoms.iter().map(String::as_str))
    }

    pub fn source_atoms(&self) -> impl Iterator<Item = &str> {
        self.interactions
            .iter()
            .flat_map(|i| i.source_atoms.iter().map(String::as_str))
    }

    fn contact_flag(&self, interaction: &Interaction, target: &Residue, catalogue: &ResidueCatalogue) -> &'static str {
        let is_main_chain = !target.is_ligand
            && interaction
                .target_atoms
                .iter()
                .all(|atom| is_backbone_atom(atom));
        let is_residue = catalogue.abbreviation(&target.chem_comp_id) != Some(NON_RESIDUE_CODE);
        match (is_main_chain, is_residue) {
            (true, true) => "backbone",
            (false, true) => "side chain",
            _ => "ligand",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    ResidueResidue(ResidueResidueLink),
    LigandResidue(LigandResidueLink),
}

impl Link {
    pub fn source(&self) -> NodeId {
        match self {
            Link::ResidueResidue(l) => l.source,
            Link::LigandResidue(l) => l.source,
        }
    }

    pub fn target(&self) -> NodeId {
        match self {
            Link::ResidueResidue(l) => l.target,
            Link::LigandResidue(l) => l.target,
        }
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.source() == node || self.target() == node
    }

    pub fn contains_both(&self, a: NodeId, b: NodeId) -> bool {
        (self.source() == a && self.target() == b) || (self.source() == b && self.target() == a)
    }

    pub fn contains_residue(&self, nodes: &NodeSet, residue: &Residue) -> bool {
        [self.source(), self.target()]
            .iter()
            .any(|&id| nodes.get(id).is_some_and(|n| *n.residue == *residue))
    }

    /// The endpoint opposite to `node`; the source when `node` is not the source.
    pub fn other_node(&self, node: NodeId) -> NodeId {
        if self.source() == node {
            self.target()
        } else {
            self.source()
        }
    }

    pub fn class(&self, nodes: &NodeSet) -> LinkClass {
        match self {
            Link::ResidueResidue(l) if l.is_bound_molecule_link(nodes) => LinkClass::Ligand,
            Link::ResidueResidue(l) => LinkClass::classify(l.tags()),
            Link::LigandResidue(l) => l.class(),
        }
    }

    pub fn has_clash(&self) -> bool {
        match self {
            Link::ResidueResidue(l) => l.tags().any(|t| t.contains("clash")),
            Link::LigandResidue(l) => l.tags().any(|t| t.contains("clash")),
        }
    }

    pub fn tooltip(&self, nodes: &NodeSet, catalogue: &ResidueCatalogue) -> String {
        match self {
            Link::ResidueResidue(l) => {
                format!("<ul>{}</ul>", l.tags().collect::<Vec<_>>().join(", "))
            }
            Link::LigandResidue(l) => {
                let Some(target) = nodes.get(l.target) else {
                    return String::from("<ul></ul>");
                };
                let mut lines: Vec<String> = Vec::new();
                for interaction in &l.interactions {
                    let line = format!(
                        "<li><span>{}</span> interaction (<b>{}</b> | {}): {}\u{212B}</li>",
                        l.contact_flag(interaction, &target.residue, catalogue),
                        interaction.target_atoms.join(","),
                        interaction.details.join(","),
                        interaction.distance
                    );
                    if !lines.contains(&line) {
                        lines.push(line);
                    }
                }
                format!("<ul>{}</ul>", lines.join("\n"))
            }
        }
    }

    /// Distinct ligand-side atoms in first-seen order; empty for residue-residue links.
    pub fn source_atoms(&self) -> Vec<String> {
        match self {
            Link::ResidueResidue(_) => Vec::new(),
            Link::LigandResidue(l) => distinct(l.source_atoms()),
        }
    }

    /// Distinct partner-side atoms in first-seen order; empty for residue-residue links.
    pub fn target_atoms(&self) -> Vec<String> {
        match self {
            Link::ResidueResidue(_) => Vec::new(),
            Link::LigandResidue(l) => distinct(l.target_atoms()),
        }
    }
}

fn distinct<'a>(atoms: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for atom in atoms {
        if !out.iter().any(|a| a == atom) {
            out.push(atom.to_string());
        }
    }
    out
}
