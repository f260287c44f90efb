use super::config::{LayoutConfig, LinkDistance, LinkForceConfig};
use super::error::EngineError;
use super::forces::{Body, CenterForce, CollideForce, Force, Jiggle, LinkForce, ManyBodyForce, Spring};
use crate::core::geometry::Point;
use crate::core::models::ids::NodeId;
use crate::core::models::interaction::LinkClass;
use crate::core::models::node::InteractionNode;
use crate::core::models::site::BindingSite;
use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::PI;
use tracing::{debug, instrument, trace};

const INITIAL_RADIUS: f64 = 10.0;
/// Alpha target held while a node is dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

fn initial_angle() -> f64 {
    PI * (3.0 - 5f64.sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForceSlot {
    Link,
    Charge,
    Collision,
    Center,
}

/// Rendered position of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFrame {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl NodeFrame {
    pub fn transform(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.scale)
    }
}

/// Rendered endpoints of one link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkFrame {
    pub source: String,
    pub target: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Snapshot of the layout after a simulation step. Only placed nodes, and links between placed
/// nodes, are part of a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub alpha: f64,
    pub nodes: Vec<NodeFrame>,
    pub links: Vec<LinkFrame>,
}

impl Frame {
    pub fn capture(site: &BindingSite, alpha: f64) -> Self {
        let nodes = site
            .nodes()
            .iter()
            .filter_map(|(_, node)| {
                let p = node.position()?;
                Some(NodeFrame {
                    id: node.id.clone(),
                    x: p.x,
                    y: p.y,
                    scale: node.scale,
                })
            })
            .collect();
        let links = site
            .links()
            .iter()
            .filter_map(|link| {
                let source = site.node(link.source())?;
                let target = site.node(link.target())?;
                let (a, b) = (source.position()?, target.position()?);
                Some(LinkFrame {
                    source: source.id.clone(),
                    target: target.id.clone(),
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                })
            })
            .collect();
        Self { alpha, nodes, links }
    }

    /// Cooled below `threshold` with at least one node and one link on screen.
    pub fn is_settled(&self, threshold: f64) -> bool {
        self.alpha < threshold && !self.nodes.is_empty() && !self.links.is_empty()
    }
}

/// Alpha-cooled force simulation over the nodes of a [`BindingSite`].
///
/// The site stays the single owner of node state: every step reads bodies from the nodes,
/// applies the forces and writes the integrated positions back.
pub struct Simulation {
    config: LayoutConfig,
    alpha: f64,
    alpha_target: f64,
    running: bool,
    ticks: usize,
    order: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    forces: Vec<(ForceSlot, Box<dyn Force>)>,
    jiggle: Jiggle,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("alpha", &self.alpha)
            .field("alpha_target", &self.alpha_target)
            .field("running", &self.running)
            .field("ticks", &self.ticks)
            .field("nodes", &self.order.len())
            .finish()
    }
}

fn body_of(node: &InteractionNode) -> Body {
    Body {
        x: node.x.unwrap_or(0.0),
        y: node.y.unwrap_or(0.0),
        vx: node.vx,
        vy: node.vy,
        fx: node.fx,
        fy: node.fy,
    }
}

/// Places unplaced nodes on a phyllotaxis spiral and snaps pinned nodes onto their pins.
fn initialize_nodes(site: &mut BindingSite, order: &[NodeId]) {
    for (i, &id) in order.iter().enumerate() {
        let Some(node) = site.node_mut(id) else {
            continue;
        };
        if let Some(fx) = node.fx {
            node.x = Some(fx);
        }
        if let Some(fy) = node.fy {
            node.y = Some(fy);
        }
        if node.x.is_none() || node.y.is_none() {
            let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
            let angle = i as f64 * initial_angle();
            node.x = Some(radius * angle.cos());
            node.y = Some(radius * angle.sin());
        }
        if !node.vx.is_finite() || !node.vy.is_finite() {
            node.vx = 0.0;
            node.vy = 0.0;
        }
    }
}

fn springs_for(
    site: &BindingSite,
    config: &LinkForceConfig,
    index: &HashMap<NodeId, usize>,
) -> Vec<Spring> {
    site.links()
        .iter()
        .filter(|link| !(config.exclude_hydrophobic && site.link_class(link) == LinkClass::Hydrophobic))
        .filter_map(|link| {
            let (s, t) = (link.source(), link.target());
            let distance = match config.distance {
                LinkDistance::Fixed(d) => d,
                LinkDistance::LigandAware {
                    between_ligands,
                    default,
                } => {
                    let both_ligands = [s, t]
                        .iter()
                        .all(|&id| site.node(id).is_some_and(|n| n.residue.is_ligand));
                    if both_ligands { between_ligands } else { default }
                }
            };
            Some(Spring {
                source: *index.get(&s)?,
                target: *index.get(&t)?,
                distance,
                strength: config.strength,
            })
        })
        .collect()
}

impl Simulation {
    #[instrument(skip_all, name = "simulation_setup", fields(bm_id = %site.bm_id))]
    pub fn new(site: &mut BindingSite, config: LayoutConfig, seed: u64) -> Self {
        let order = site.nodes().ids().to_vec();
        let index: HashMap<NodeId, usize> = order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        initialize_nodes(site, &order);

        let springs = springs_for(site, &config.link, &index);
        debug!(nodes = order.len(), springs = springs.len(), "Initialised layout");

        let mut forces: Vec<(ForceSlot, Box<dyn Force>)> = vec![
            (
                ForceSlot::Link,
                Box::new(LinkForce::new(springs, config.link.iterations)),
            ),
            (
                ForceSlot::Charge,
                Box::new(ManyBodyForce::new(
                    config.many_body.strength,
                    config.many_body.distance_min,
                    config.many_body.distance_max,
                )),
            ),
            (
                ForceSlot::Collision,
                Box::new(CollideForce::new(
                    config.collide.radius,
                    config.collide.strength,
                    config.collide.iterations,
                )),
            ),
        ];
        if let Some(center) = config.center {
            forces.push((ForceSlot::Center, Box::new(CenterForce::new(center))));
        }

        let mut simulation = Self {
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            running: true,
            ticks: 0,
            order,
            index,
            forces,
            jiggle: Jiggle::new(seed),
        };
        let bodies = simulation.load(site);
        for (_, force) in &mut simulation.forces {
            force.initialize(&bodies);
        }
        simulation
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Resumes stepping without touching alpha.
    pub fn restart(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn center(&self) -> Option<Point> {
        self.config.center
    }

    /// Moves the centering force. Scenes without one are left unchanged.
    pub fn set_center(&mut self, center: Point) {
        if self.config.center.is_none() {
            return;
        }
        self.config.center = Some(center);
        for (slot, force) in &mut self.forces {
            if *slot == ForceSlot::Center {
                *force = Box::new(CenterForce::new(center));
            }
        }
    }

    fn load(&self, site: &BindingSite) -> Vec<Body> {
        self.order
            .iter()
            .map(|&id| site.node(id).map(body_of).unwrap_or_default())
            .collect()
    }

    fn store(&self, site: &mut BindingSite, bodies: &[Body]) {
        for (&id, body) in self.order.iter().zip(bodies) {
            if let Some(node) = site.node_mut(id) {
                node.x = Some(body.x);
                node.y = Some(body.y);
                node.vx = body.vx;
                node.vy = body.vy;
            }
        }
    }

    /// Advances the simulation by one step if it is running and returns the resulting frame.
    pub fn tick(&mut self, site: &mut BindingSite) -> Frame {
        if self.running {
            self.step(site);
        }
        Frame::capture(site, self.alpha)
    }

    fn step(&mut self, site: &mut BindingSite) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        let mut bodies = self.load(site);
        for (_, force) in &mut self.forces {
            force.apply(&mut bodies, self.alpha, &mut self.jiggle);
        }

        let damping = 1.0 - self.config.velocity_decay;
        for body in &mut bodies {
            match body.fx {
                Some(fx) => {
                    body.x = fx;
                    body.vx = 0.0;
                }
                None => {
                    body.vx *= damping;
                    body.x += body.vx;
                }
            }
            match body.fy {
                Some(fy) => {
                    body.y = fy;
                    body.vy = 0.0;
                }
                None => {
                    body.vy *= damping;
                    body.y += body.vy;
                }
            }
        }
        self.store(site, &bodies);

        self.ticks += 1;
        if self.alpha < self.config.alpha_min {
            self.running = false;
            trace!(ticks = self.ticks, "Simulation cooled down");
        }
    }

    fn draggable<'s>(&self, site: &'s mut BindingSite, node: NodeId) -> Result<&'s mut InteractionNode, EngineError> {
        if !self.index.contains_key(&node) {
            return Err(EngineError::NodeNotFound(format!("{node:?}")));
        }
        let node = site
            .node_mut(node)
            .ok_or_else(|| EngineError::NodeNotFound(format!("{node:?}")))?;
        if node.is_static {
            return Err(EngineError::StaticNode(node.id.clone()));
        }
        Ok(node)
    }

    /// Reheats the layout and pins the node where it currently is.
    pub fn drag_start(&mut self, site: &mut BindingSite, node: NodeId) -> Result<(), EngineError> {
        let node = self.draggable(site, node)?;
        let position = node
            .position()
            .ok_or_else(|| EngineError::UnplacedNode(node.id.clone()))?;
        node.pin(position);
        self.alpha_target = DRAG_ALPHA_TARGET;
        self.restart();
        Ok(())
    }

    pub fn drag(&mut self, site: &mut BindingSite, node: NodeId, to: Point) -> Result<(), EngineError> {
        self.draggable(site, node)?.pin(to);
        Ok(())
    }

    /// Lets the layout cool down again; the node stays pinned where it was dropped.
    pub fn drag_end(&mut self, site: &mut BindingSite, node: NodeId) -> Result<(), EngineError> {
        self.draggable(site, node)?;
        self.alpha_target = 0.0;
        Ok(())
    }
}
