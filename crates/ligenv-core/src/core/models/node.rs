use super::residue::Residue;
use crate::core::geometry::Point;
use std::sync::Arc;

/// Graph node wrapping one residue, or one atom (group) of the bound ligand.
///
/// Layout fields follow the usual force-simulation convention: `x`/`y` are unset until the
/// simulation places the node, `fx`/`fy` pin it.
#[derive(Debug, Clone)]
pub struct InteractionNode {
    pub id: String,
    pub residue: Arc<Residue>,
    pub scale: f64,
    pub is_static: bool,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

impl InteractionNode {
    pub fn new(residue: Arc<Residue>, scale: f64, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            residue,
            scale,
            is_static: scale < 1.0,
            x: None,
            y: None,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
        }
    }

    /// A node placed and pinned at `position`.
    pub fn pinned(residue: Arc<Residue>, scale: f64, id: impl Into<String>, position: Point) -> Self {
        let mut node = Self::new(residue, scale, id);
        node.pin(position);
        node.x = Some(position.x);
        node.y = Some(position.y);
        node
    }

    pub fn pin(&mut self, position: Point) {
        self.fx = Some(position.x);
        self.fy = Some(position.y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }

    pub fn position(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }

    pub fn pinned_position(&self) -> Option<Point> {
        Some(Point::new(self.fx?, self.fy?))
    }

    pub fn tooltip(&self) -> String {
        self.residue.tooltip()
    }
}

/// Same id and same pinned position. Moving a pin therefore changes the node's identity, which
/// matters for deduplication while the binding site is being built.
impl PartialEq for InteractionNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.fx == other.fx && self.fy == other.fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residue() -> Arc<Residue> {
        Arc::new(Residue::new("A", 10, "ATP", " ", true))
    }

    #[test]
    fn scale_below_one_makes_node_static() {
        assert!(InteractionNode::new(residue(), 0.5, "a").is_static);
        assert!(InteractionNode::new(residue(), 0.0, "a").is_static);
        assert!(!InteractionNode::new(residue(), 1.0, "a").is_static);
    }

    #[test]
    fn pinned_node_starts_at_its_pin() {
        let node = InteractionNode::pinned(residue(), 0.0, "a", Point::new(3.0, 4.0));
        assert_eq!(node.position(), Some(Point::new(3.0, 4.0)));
        assert_eq!(node.pinned_position(), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn node_equality_includes_pinned_position() {
        let a = InteractionNode::pinned(residue(), 0.0, "A10_C1", Point::new(1.0, 1.0));
        let same = InteractionNode::pinned(residue(), 0.0, "A10_C1", Point::new(1.0, 1.0));
        let moved = InteractionNode::pinned(residue(), 0.0, "A10_C1", Point::new(2.0, 1.0));
        let free = InteractionNode::new(residue(), 0.0, "A10_C1");
        assert_eq!(a, same);
        assert_ne!(a, moved);
        assert_ne!(a, free);
    }

    #[test]
    fn unpin_keeps_the_current_position() {
        let mut node = InteractionNode::pinned(residue(), 1.0, "A10", Point::new(1.0, 2.0));
        node.unpin();
        assert_eq!(node.pinned_position(), None);
        assert_eq!(node.position(), Some(Point::new(1.0, 2.0)));
    }
}
