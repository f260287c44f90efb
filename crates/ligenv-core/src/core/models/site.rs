use super::error::ModelError;
use super::ids::NodeId;
use super::interaction::{Interaction, LinkClass};
use super::link::{LigandResidueLink, Link, ResidueResidueLink};
use super::node::InteractionNode;
use super::registry::{NodeSet, ResidueSet};
use super::residue::Residue;
use crate::core::depiction::Depiction;
use crate::core::io::payload::{BoundMoleculeEntry, LigandInteractionEntry, ResidueRecord};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Scale of residue-level nodes.
const RESIDUE_SCALE: f64 = 1.0;
/// Scale of ligand nodes standing for a group of atoms.
const ATOM_GROUP_SCALE: f64 = 0.5;
/// Scale of ligand nodes standing for a single atom; these are invisible anchors.
const SINGLE_ATOM_SCALE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// Residue-level graph of a bound molecule or bound polymer.
    BoundMolecule,
    /// Atom-level graph of a single ligand laid over its depiction.
    Ligand,
}

/// The interaction graph of one query: residues, nodes and links.
#[derive(Debug, Clone)]
pub struct BindingSite {
    pub pdb_id: String,
    pub bm_id: String,
    pub kind: SiteKind,
    residues: Vec<Arc<Residue>>,
    nodes: NodeSet,
    links: Vec<Link>,
}

fn residue_from(record: &ResidueRecord, is_ligand: bool) -> Residue {
    Residue::new(
        &record.chain_id,
        record.author_residue_number,
        &record.chem_comp_id,
        record.insertion_code(),
        is_ligand,
    )
}

#[derive(Default)]
struct SiteBuilder {
    residues: ResidueSet,
    nodes: NodeSet,
}

impl SiteBuilder {
    fn residue_partner(&mut self, record: &ResidueRecord) -> NodeId {
        let residue = self.residues.try_add(residue_from(record, false));
        let id = residue.id().to_string();
        self.nodes
            .try_add(InteractionNode::new(residue, RESIDUE_SCALE, id))
    }

    /// Node of a composition connection endpoint, created from the residue set when the
    /// residue takes part in no interaction record.
    fn connection_partner(&mut self, residue_id: &str) -> Result<NodeId, ModelError> {
        if let Some(node) = self.nodes.find_by_residue(residue_id) {
            return Ok(node);
        }
        let residue = self
            .residues
            .get(residue_id)
            .cloned()
            .ok_or_else(|| ModelError::UnknownResidue(residue_id.to_string()))?;
        Ok(self.nodes.try_add(InteractionNode::new(
            residue,
            RESIDUE_SCALE,
            residue_id,
        )))
    }

    fn ligand_partner(
        &mut self,
        residue: &Arc<Residue>,
        depiction: &Depiction,
        atom_names: &[String],
    ) -> Result<NodeId, ModelError> {
        if atom_names.is_empty() {
            return Err(ModelError::EmptyAtomSelection);
        }
        let scale = match (residue.is_ligand, atom_names.len() > 1) {
            (true, true) => ATOM_GROUP_SCALE,
            (true, false) => SINGLE_ATOM_SCALE,
            (false, _) => RESIDUE_SCALE,
        };
        let center = depiction.center(atom_names)?;
        let id = format!("{}_{}", residue.id(), sorted(atom_names).join("_"));
        Ok(self.nodes.try_add(InteractionNode::pinned(
            Arc::clone(residue),
            scale,
            id,
            center,
        )))
    }

    fn same_residue(&self, a: NodeId, b: NodeId) -> bool {
        match (self.nodes.get(a), self.nodes.get(b)) {
            (Some(a), Some(b)) => a.residue == b.residue,
            _ => false,
        }
    }
}

fn sorted(names: &[String]) -> Vec<String> {
    let mut names = names.to_vec();
    names.sort();
    names
}

impl BindingSite {
    /// Builds the residue-level graph of a bound molecule or bound polymer.
    ///
    /// One link is created per interaction record. Composition connections add a covalent link
    /// only between residues that are not linked yet.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownInteractionType`] for an unrecognised interaction type and
    /// [`ModelError::UnknownResidue`] for a connection to a residue outside the site.
    #[instrument(skip_all, name = "bound_molecule_site", fields(pdb_id = pdb_id, bm_id = %entry.bm_id))]
    pub fn from_bound_molecule(pdb_id: &str, entry: &BoundMoleculeEntry) -> Result<Self, ModelError> {
        let mut builder = SiteBuilder::default();
        for ligand in &entry.composition.ligands {
            builder.residues.try_add(residue_from(ligand, true));
        }

        let mut links: Vec<Link> = Vec::with_capacity(entry.interactions.len());
        for record in &entry.interactions {
            let bgn = builder.residue_partner(&record.begin);
            let end = builder.residue_partner(&record.end);
            if builder.same_residue(bgn, end) {
                debug!(residue = %builder.nodes[bgn].residue, "Skipping self contact");
                continue;
            }
            links.push(Link::ResidueResidue(ResidueResidueLink::new(
                bgn,
                end,
                &record.interactions,
            )?));
        }

        for (a, b) in &entry.composition.connections {
            let bgn = builder.connection_partner(a)?;
            let end = builder.connection_partner(b)?;
            if bgn == end || links.iter().any(|l| l.contains_both(bgn, end)) {
                continue;
            }
            links.push(Link::ResidueResidue(ResidueResidueLink::covalent(bgn, end)));
        }

        info!(
            residues = builder.residues.len(),
            nodes = builder.nodes.len(),
            links = links.len(),
            "Built bound molecule binding site"
        );

        Ok(Self {
            pdb_id: pdb_id.to_string(),
            bm_id: entry.bm_id.clone(),
            kind: SiteKind::BoundMolecule,
            residues: builder.residues.into_vec(),
            nodes: builder.nodes,
            links,
        })
    }

    /// Builds the atom-level graph of a single ligand over its depiction.
    ///
    /// Every depiction atom becomes a pinned anchor node. Records are grouped into one link per
    /// (ligand atom group, partner residue) pair, and redundant aromatic atom-atom links are
    /// dropped afterwards.
    ///
    /// # Errors
    ///
    /// Fails on an unknown interaction type, a record without ligand atoms, or ligand atoms
    /// missing from the depiction.
    #[instrument(skip_all, name = "ligand_site", fields(pdb_id = pdb_id, ligand = %entry.ligand.chem_comp_id))]
    pub fn from_ligand(
        pdb_id: &str,
        entry: &LigandInteractionEntry,
        depiction: &Depiction,
    ) -> Result<Self, ModelError> {
        let ligand = &entry.ligand;
        let bm_id = format!(
            "{}_{}_{}",
            ligand.chem_comp_id, ligand.chain_id, ligand.author_residue_number
        );

        let mut builder = SiteBuilder::default();
        let ligand_residue = builder.residues.try_add(residue_from(ligand, true));

        for atom in depiction.atoms() {
            builder.ligand_partner(&ligand_residue, depiction, std::slice::from_ref(&atom.name))?;
        }

        let mut links: Vec<LigandResidueLink> = Vec::new();
        for record in &entry.interactions {
            let bgn = builder.ligand_partner(&ligand_residue, depiction, &record.ligand_atoms)?;
            let end = builder.residue_partner(&record.end.residue);
            if builder.same_residue(bgn, end) {
                builder.nodes.remove(end);
                debug!(atoms = ?record.ligand_atoms, "Skipping ligand self contact");
                continue;
            }

            let interaction = Interaction {
                source_atoms: sorted(&record.ligand_atoms),
                target_atoms: record.end.atom_names.clone(),
                interaction_type: record.interaction_type.parse()?,
                details: record.interaction_details.clone(),
                distance: record.distance,
            };
            match links.iter_mut().find(|l| {
                (l.source == bgn && l.target == end) || (l.source == end && l.target == bgn)
            }) {
                Some(link) => link.add_interaction(interaction),
                None => links.push(LigandResidueLink::new(bgn, end, interaction)),
            }
        }

        let links: Vec<Link> = filter_aromatic_atom_atom(links)
            .into_iter()
            .map(Link::LigandResidue)
            .collect();

        info!(
            nodes = builder.nodes.len(),
            links = links.len(),
            "Built ligand binding site"
        );

        Ok(Self {
            pdb_id: pdb_id.to_string(),
            bm_id,
            kind: SiteKind::Ligand,
            residues: builder.residues.into_vec(),
            nodes: builder.nodes,
            links,
        })
    }

    pub fn residues(&self) -> &[Arc<Residue>] {
        &self.residues
    }

    pub fn ligand_residues(&self) -> impl Iterator<Item = &Arc<Residue>> {
        self.residues.iter().filter(|r| r.is_ligand)
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeSet {
        &mut self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&InteractionNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut InteractionNode> {
        self.nodes.get_mut(id)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_class(&self, link: &Link) -> LinkClass {
        link.class(&self.nodes)
    }

    /// Links touching `node`, in insertion order.
    pub fn links_of(&self, node: NodeId) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.contains_node(node))
    }

    /// `node` itself and every node linked to it.
    pub fn neighbourhood(&self, node: NodeId) -> Vec<NodeId> {
        std::iter::once(node)
            .chain(self.links_of(node).map(|l| l.other_node(node)))
            .collect()
    }

    /// Node of the residue with the given derived id (`chain + number + insertion code`).
    pub fn find_node_by_residue(&self, residue_id: &str) -> Option<NodeId> {
        self.nodes.find_by_residue(residue_id)
    }

    /// Releases the pins of every draggable node. Positions and velocities stay, so the next
    /// layout run starts from the current arrangement; static anchors keep their pins.
    pub fn reset_positions(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            if !node.is_static {
                node.unpin();
            }
        }
    }
}

/// Drops aromatic links made only of atom-atom contacts when another link to the same partner
/// already binds the first of their partner atoms. Siblings are looked up in the unfiltered
/// list; a link without siblings is always kept.
fn filter_aromatic_atom_atom(links: Vec<LigandResidueLink>) -> Vec<LigandResidueLink> {
    let redundant: Vec<bool> = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            if link.class() != LinkClass::Aromatic || !link.is_atom_atom_only() {
                return false;
            }
            let Some(first_target) = link.target_atoms().next() else {
                return false;
            };
            links
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.target == link.target)
                .flat_map(|(_, other)| other.target_atoms())
                .any(|atom| atom == first_target)
        })
        .collect();

    links
        .into_iter()
        .zip(redundant)
        .filter_map(|(link, drop)| {
            if drop {
                debug!(partner = ?link.target, "Dropping redundant aromatic atom-atom link");
                None
            } else {
                Some(link)
            }
        })
        .collect()
}
