use crate::core::catalogue::ResidueCatalogue;
use crate::core::depiction::Depiction;
use crate::core::models::ids::NodeId;
use crate::core::models::site::BindingSite;
use crate::engine::events::ResidueRef;
use crate::engine::viewport::{Viewport, ZoomTransform};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneKind {
    /// Residue-level graph of a bound molecule.
    Residues,
    /// Partners laid out around a ligand depiction.
    Ligand,
    /// A bare depiction without interactions.
    Depiction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub residue: ResidueRef,
    pub label: String,
    pub tooltip: String,
    pub class: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: f64,
    pub is_static: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSnapshot {
    pub source: String,
    pub target: String,
    pub class: &'static str,
    pub clash: bool,
    pub tooltip: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomSnapshot {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub labelled: bool,
    pub weight: f64,
    pub radius: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondSnapshot {
    pub bgn: String,
    pub end: String,
    pub coords: String,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepictionSnapshot {
    pub ccd_id: String,
    pub resolution: [f64; 2],
    pub atoms: Vec<AtomSnapshot>,
    pub bonds: Vec<BondSnapshot>,
}

impl DepictionSnapshot {
    pub fn of(depiction: &Depiction) -> Self {
        let scale = depiction.weight_scale();
        Self {
            ccd_id: depiction.ccd_id.clone(),
            resolution: [depiction.resolution.x, depiction.resolution.y],
            atoms: depiction
                .atoms()
                .iter()
                .map(|a| AtomSnapshot {
                    name: a.name.clone(),
                    x: a.position.x,
                    y: a.position.y,
                    labelled: !a.labels.is_empty(),
                    weight: a.weight,
                    radius: scale.radius(a.weight),
                    color: scale.color(a.weight).to_string(),
                })
                .collect(),
            bonds: depiction
                .bonds()
                .iter()
                .map(|b| BondSnapshot {
                    bgn: b.bgn.clone(),
                    end: b.end.clone(),
                    coords: b.coords.clone(),
                    style: b.style.clone(),
                })
                .collect(),
        }
    }
}

/// Serialisable state of the scene currently on display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    pub kind: Option<SceneKind>,
    pub pdb_id: Option<String>,
    pub bm_id: Option<String>,
    pub placeholder: Option<String>,
    pub viewport: Viewport,
    pub transform: ZoomTransform,
    pub alpha: Option<f64>,
    pub nodes: Vec<NodeSnapshot>,
    pub links: Vec<LinkSnapshot>,
    pub depiction: Option<DepictionSnapshot>,
}

/// Interactions document a binding site was built from, kept so that it can be exported.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionsPayload {
    pub pdb_id: String,
    pub bm_id: String,
    pub document: serde_json::Value,
}

impl InteractionsPayload {
    pub fn new(site: &BindingSite, document: serde_json::Value) -> Self {
        Self {
            pdb_id: site.pdb_id.clone(),
            bm_id: site.bm_id.clone(),
            document,
        }
    }

    /// `<pdb id>_<bm id>_interactions.json`
    pub fn file_name(&self) -> String {
        format!("{}_{}_interactions.json", self.pdb_id, self.bm_id)
    }

    /// The document in its original key order, indented by four spaces.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.document.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Graph part of a snapshot. `node_style` maps a node and its base scale to the displayed
/// scale and opacity, `link_opacity` gives the opacity per link index.
pub(crate) fn graph_snapshot(
    site: &BindingSite,
    catalogue: &ResidueCatalogue,
    node_style: impl Fn(NodeId, f64) -> (f64, f64),
    link_opacity: impl Fn(usize) -> f64,
) -> (Vec<NodeSnapshot>, Vec<LinkSnapshot>) {
    let nodes = site
        .nodes()
        .iter()
        .map(|(id, node)| {
            let (scale, opacity) = node_style(id, node.scale);
            NodeSnapshot {
                id: node.id.clone(),
                residue: ResidueRef::of(&site.pdb_id, &node.residue),
                label: node.residue.label(),
                tooltip: node.tooltip(),
                class: node.residue.residue_type(catalogue).css_class(),
                x: node.x,
                y: node.y,
                scale,
                is_static: node.is_static,
                opacity,
            }
        })
        .collect();

    let links = site
        .links()
        .iter()
        .enumerate()
        .filter_map(|(i, link)| {
            let source = site.node(link.source())?;
            let target = site.node(link.target())?;
            Some(LinkSnapshot {
                source: source.id.clone(),
                target: target.id.clone(),
                class: site.link_class(link).name(),
                clash: link.has_clash(),
                tooltip: link.tooltip(site.nodes(), catalogue),
                opacity: link_opacity(i),
            })
        })
        .collect();

    (nodes, links)
}
