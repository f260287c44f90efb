use super::ids::NodeId;
use super::node::InteractionNode;
use super::residue::Residue;
use slotmap::SlotMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Insertion-ordered residue set keyed by derived id.
#[derive(Debug, Clone, Default)]
pub struct ResidueSet {
    residues: Vec<Arc<Residue>>,
    index: HashMap<String, usize>,
}

impl ResidueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the already registered residue with the same id, or registers `residue`.
    pub fn try_add(&mut self, residue: Residue) -> Arc<Residue> {
        if let Some(&i) = self.index.get(residue.id()) {
            return Arc::clone(&self.residues[i]);
        }
        let residue = Arc::new(residue);
        self.index
            .insert(residue.id().to_string(), self.residues.len());
        self.residues.push(Arc::clone(&residue));
        residue
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Residue>> {
        self.index.get(id).map(|&i| &self.residues[i])
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Residue>> {
        self.residues.iter()
    }

    pub fn into_vec(self) -> Vec<Arc<Residue>> {
        self.residues
    }
}

/// Insertion-ordered node arena that deduplicates by [`InteractionNode`] equality.
///
/// Nodes sharing an id are bucketed together; a candidate is merged into an existing member
/// only when the pinned positions match as well.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: SlotMap<NodeId, InteractionNode>,
    order: Vec<NodeId>,
    index: HashMap<String, Vec<NodeId>>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_add(&mut self, node: InteractionNode) -> NodeId {
        if let Some(existing) = self
            .index
            .get(&node.id)
            .and_then(|bucket| bucket.iter().find(|&&id| self.nodes[id] == node))
        {
            return *existing;
        }
        let key = node.id.clone();
        let id = self.nodes.insert(node);
        self.order.push(id);
        self.index.entry(key).or_default().push(id);
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<InteractionNode> {
        let node = self.nodes.remove(id)?;
        self.order.retain(|&other| other != id);
        if let Some(bucket) = self.index.get_mut(&node.id) {
            bucket.retain(|&other| other != id);
            if bucket.is_empty() {
                self.index.remove(&node.id);
            }
        }
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&InteractionNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut InteractionNode> {
        self.nodes.get_mut(id)
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &InteractionNode)> {
        self.order.iter().map(|&id| (id, &self.nodes[id]))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut InteractionNode)> {
        self.nodes.iter_mut()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// First node (in insertion order) wrapping the residue with the given derived id.
    pub fn find_by_residue(&self, residue_id: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.residue.id() == residue_id)
            .map(|(id, _)| id)
    }
}

impl std::ops::Index<NodeId> for NodeSet {
    type Output = InteractionNode;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id]
    }
}
