use super::provider::{FetchError, ResourceProvider};
use super::snapshot::{DepictionSnapshot, InteractionsPayload, SceneKind, SceneSnapshot, graph_snapshot};
use crate::core::catalogue::ResidueCatalogue;
use crate::core::depiction::weights::{AtomPropensity, atom_propensity};
use crate::core::depiction::{Depiction, DepictionError};
use crate::core::geometry::{BoundingBox, Point};
use crate::core::io::PayloadError;
use crate::core::io::payload::{AggregatedWeights, BoundMoleculeEntry, LigandAnnotation, LigandInteractionEntry};
use crate::core::io::traits::JsonDocument;
use crate::core::models::error::ModelError;
use crate::core::models::ids::NodeId;
use crate::core::models::interaction::LinkClass;
use crate::core::models::link::Link;
use crate::core::models::residue::Residue;
use crate::core::models::site::BindingSite;
use crate::core::resources::Resource;
use crate::engine::config::{LayoutConfig, VisualizationConfig};
use crate::engine::error::EngineError;
use crate::engine::events::{EventDetail, EventDispatcher, EventKind, EventListener, ResidueRef, SceneEvent};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::simulation::{Frame, Simulation};
use crate::engine::viewport::{Viewport, ZoomState, ZoomTransform, fit};
use futures_util::future::join_all;
use rand::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const NO_INTERACTIONS_MESSAGE: &str = "No interactions data are available.";
const HIGHLIGHT_SCALE: f64 = 1.5;
const DIMMED_OPACITY: f64 = 0.4;

#[derive(Debug, Error)]
pub enum VisualizationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to decode {resource}: {source}")]
    Payload {
        resource: Resource,
        #[source]
        source: PayloadError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Depiction(#[from] DepictionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("No depiction is on display")]
    NoDepiction,

    #[error("No interaction graph is on display")]
    NoScene,

    #[error("Link #{0} is not part of the scene")]
    UnknownLink(usize),
}

impl VisualizationError {
    /// Message shown in place of the scene when the error means the data does not exist.
    fn placeholder(&self) -> Option<String> {
        match self {
            Self::Fetch(FetchError::NotFound(Resource::LigandAnnotation { ccd_id })) => {
                Some(format!("Component {ccd_id} was not found."))
            }
            Self::Fetch(FetchError::NotFound(_))
            | Self::Payload {
                source: PayloadError::Empty | PayloadError::EmptyEntry(_),
                ..
            } => Some(NO_INTERACTIONS_MESSAGE.to_string()),
            _ => None,
        }
    }
}

/// Identifies one query; only scenes prepared for the latest query can be installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryToken {
    epoch: u64,
}

impl QueryToken {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Debug)]
enum SceneContent {
    BoundMolecule {
        site: BindingSite,
        /// Environment of the only ligand, when the bound molecule has exactly one.
        ligand: Option<(BindingSite, Depiction)>,
    },
    Ligand {
        site: BindingSite,
        depiction: Depiction,
        /// Keeps the bound-molecule site underneath so that the scene can return to it.
        chained: bool,
    },
    Depiction(Depiction),
}

/// Fully fetched and decoded scene, ready to be installed.
#[derive(Debug)]
pub struct PreparedScene {
    epoch: u64,
    content: SceneContent,
    abbreviations: Vec<(String, String)>,
    /// Interactions document of the site that ends up on display.
    payload: Option<InteractionsPayload>,
}

impl PreparedScene {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn kind(&self) -> SceneKind {
        match &self.content {
            SceneContent::BoundMolecule { ligand: None, .. } => SceneKind::Residues,
            SceneContent::BoundMolecule { ligand: Some(_), .. } | SceneContent::Ligand { .. } => {
                SceneKind::Ligand
            }
            SceneContent::Depiction(_) => SceneKind::Depiction,
        }
    }

    /// Single-letter codes resolved for residues missing from the catalogue.
    pub fn abbreviations(&self) -> &[(String, String)] {
        &self.abbreviations
    }

    pub fn payload(&self) -> Option<&InteractionsPayload> {
        self.payload.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    /// A newer query started while this scene was being prepared.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOutcome {
    pub ticks: usize,
    pub settled: bool,
}

/// Hover styling layered over the node and link state.
#[derive(Debug, Default)]
struct Presentation {
    scales: HashMap<NodeId, f64>,
    dimmed_nodes: HashSet<NodeId>,
    dimmed_links: HashSet<usize>,
}

impl Presentation {
    fn node_style(&self, node: NodeId, base_scale: f64) -> (f64, f64) {
        let scale = self.scales.get(&node).copied().unwrap_or(base_scale);
        let opacity = if self.dimmed_nodes.contains(&node) {
            DIMMED_OPACITY
        } else {
            1.0
        };
        (scale, opacity)
    }

    fn link_opacity(&self, link: usize) -> f64 {
        if self.dimmed_links.contains(&link) {
            DIMMED_OPACITY
        } else {
            1.0
        }
    }

    fn restore_opacity(&mut self) {
        self.dimmed_nodes.clear();
        self.dimmed_links.clear();
    }
}

/// Places ligand-scene partners next to the ligand atoms they touch, preferring atoms of
/// non-hydrophobic contacts.
fn place_partners(
    site: &mut BindingSite,
    depiction: &Depiction,
    jitter: f64,
    rng: &mut StdRng,
) -> Result<(), DepictionError> {
    let partners: Vec<NodeId> = site
        .nodes()
        .iter()
        .filter(|(_, n)| !n.residue.is_ligand)
        .map(|(id, _)| id)
        .collect();

    for id in partners {
        let links: Vec<&Link> = site.links_of(id).collect();
        let polar: Vec<&Link> = links
            .iter()
            .copied()
            .filter(|l| site.link_class(l) != LinkClass::Hydrophobic)
            .collect();
        let chosen = if polar.is_empty() { &links } else { &polar };
        let atoms: Vec<String> = chosen.iter().flat_map(|l| l.source_atoms()).collect();
        if atoms.is_empty() {
            continue;
        }

        let base = depiction.initial_node_position(&atoms)?;
        let mut offset = || {
            if jitter > 0.0 {
                rng.gen_range(0.0..jitter)
            } else {
                0.0
            }
        };
        let (dx, dy) = (offset(), offset());
        if let Some(node) = site.node_mut(id) {
            node.x = Some(base.x + dx);
            node.y = Some(base.y + dy);
        }
    }
    Ok(())
}

fn node_detail(pdb_id: &str, residue: &Residue, tooltip: String) -> EventDetail {
    EventDetail::Node {
        selected_node: ResidueRef::of(pdb_id, residue),
        tooltip,
    }
}

/// Scene orchestrator: fetches documents through the injected provider, builds the binding
/// sites, runs the layout and translates user interaction into [`SceneEvent`]s.
///
/// The top of `sites` is the graph on display. A ligand scene reached from a bound molecule
/// keeps the bound-molecule site underneath it.
pub struct Visualization<P> {
    provider: P,
    catalogue: ResidueCatalogue,
    config: VisualizationConfig,
    epoch: u64,
    sites: Vec<BindingSite>,
    depiction: Option<Depiction>,
    simulation: Option<Simulation>,
    frame: Option<Frame>,
    zoom: ZoomState,
    placeholder: Option<String>,
    payload: Option<InteractionsPayload>,
    presentation: Presentation,
    dragging: Option<NodeId>,
    events: EventDispatcher,
    rng: StdRng,
}

impl<P> std::fmt::Debug for Visualization<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visualization")
            .field("epoch", &self.epoch)
            .field("sites", &self.sites.len())
            .field("depiction", &self.depiction.as_ref().map(|d| &d.ccd_id))
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

impl<P: ResourceProvider> Visualization<P> {
    pub fn new(provider: P, catalogue: ResidueCatalogue, config: VisualizationConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            provider,
            catalogue,
            config,
            epoch: 0,
            sites: Vec::new(),
            depiction: None,
            simulation: None,
            frame: None,
            zoom: ZoomState::default(),
            placeholder: None,
            payload: None,
            presentation: Presentation::default(),
            dragging: None,
            events: EventDispatcher::new(),
            rng,
        }
    }

    pub fn config(&self) -> &VisualizationConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &ResidueCatalogue {
        &self.catalogue
    }

    /// The binding site on display.
    pub fn site(&self) -> Option<&BindingSite> {
        self.sites.last()
    }

    pub fn sites(&self) -> &[BindingSite] {
        &self.sites
    }

    pub fn depiction(&self) -> Option<&Depiction> {
        self.depiction.as_ref()
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomState {
        &mut self.zoom
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Interactions document behind the graph on display.
    pub fn interactions_payload(&self) -> Option<&InteractionsPayload> {
        self.payload.as_ref()
    }

    pub fn kind(&self) -> Option<SceneKind> {
        match (self.sites.is_empty(), self.depiction.is_some()) {
            (false, true) => Some(SceneKind::Ligand),
            (false, false) => Some(SceneKind::Residues),
            (true, true) => Some(SceneKind::Depiction),
            (true, false) => None,
        }
    }

    pub fn subscribe(&mut self, listener: EventListener) {
        self.events.subscribe(listener);
    }

    fn emit(&self, event: SceneEvent) {
        debug!(event = event.name(), "Emitting scene event");
        self.events.dispatch(event);
    }

    /// Starts a new query; scenes prepared for earlier queries will be discarded.
    pub fn begin_query(&mut self) -> QueryToken {
        self.epoch += 1;
        QueryToken { epoch: self.epoch }
    }

    async fn fetch_document<T: JsonDocument>(&self, resource: Resource) -> Result<T, VisualizationError> {
        let text = self.provider.fetch(&resource, self.config.environment).await?;
        T::from_json(&text).map_err(|source| VisualizationError::Payload { resource, source })
    }

    /// Like `fetch_document`, also returning the raw document for export.
    async fn fetch_interactions<T: JsonDocument>(
        &self,
        resource: Resource,
    ) -> Result<(T, serde_json::Value), VisualizationError> {
        let text = self.provider.fetch(&resource, self.config.environment).await?;
        let parsed = T::from_json(&text).and_then(|document| {
            let raw: serde_json::Value = serde_json::from_str(&text).map_err(PayloadError::Json)?;
            Ok((document, raw))
        });
        parsed.map_err(|source| VisualizationError::Payload { resource, source })
    }

    /// Fetches the single-letter codes of all residues unknown to the catalogue. A failed
    /// lookup leaves the residue untyped.
    async fn resolve_abbreviations(&self, sites: &[&BindingSite]) -> Vec<(String, String)> {
        let pending = self.catalogue.pending_codes(
            sites
                .iter()
                .copied()
                .flat_map(BindingSite::residues)
                .map(|r| &**r),
        );
        if pending.is_empty() {
            return Vec::new();
        }
        debug!(codes = ?pending, "Looking up residue abbreviations");

        let lookups = pending.into_iter().map(|code| async move {
            let resource = Resource::CompoundSummary {
                chem_comp_id: code.clone(),
            };
            let result = match self.provider.fetch(&resource, self.config.environment).await {
                Ok(text) => ResidueCatalogue::parse_summary(&code, &text).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            (code, result)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(code, result)| match result {
                Ok(letter) => Some((code, letter)),
                Err(reason) => {
                    warn!(code = %code, %reason, "Residue lookup failed; it will be shown untyped");
                    None
                }
            })
            .collect()
    }

    async fn ligand_site(
        &self,
        pdb_id: &str,
        chain_id: &str,
        residue_number: i32,
    ) -> Result<(BindingSite, Depiction, InteractionsPayload), VisualizationError> {
        let (entry, raw): (LigandInteractionEntry, _) = self
            .fetch_interactions(Resource::LigandInteractions {
                pdb_id: pdb_id.to_string(),
                chain_id: chain_id.to_string(),
                residue_number,
            })
            .await?;
        let annotation: LigandAnnotation = self
            .fetch_document(Resource::LigandAnnotation {
                ccd_id: entry.ligand.chem_comp_id.clone(),
            })
            .await?;
        let depiction = Depiction::from_annotation(&annotation)?;
        let site = BindingSite::from_ligand(pdb_id, &entry, &depiction)?;
        let payload = InteractionsPayload::new(&site, raw);
        Ok((site, depiction, payload))
    }

    async fn prepare_bound_site(
        &self,
        token: QueryToken,
        pdb_id: &str,
        resource: Resource,
    ) -> Result<PreparedScene, VisualizationError> {
        let (entry, raw): (BoundMoleculeEntry, _) = self.fetch_interactions(resource).await?;
        let site = BindingSite::from_bound_molecule(pdb_id, &entry)?;
        let mut payload = InteractionsPayload::new(&site, raw);

        let single_ligand = {
            let mut ligands = site.ligand_residues();
            match (ligands.next(), ligands.next()) {
                (Some(only), None) => Some(Arc::clone(only)),
                _ => None,
            }
        };
        let ligand = match single_ligand {
            Some(residue) => {
                info!(ligand = %residue, "Single ligand in bound molecule; showing its environment");
                let (ligand_site, depiction, ligand_payload) = self
                    .ligand_site(pdb_id, &residue.chain_id, residue.author_residue_number)
                    .await?;
                payload = ligand_payload;
                Some((ligand_site, depiction))
            }
            None => None,
        };

        let mut sites = vec![&site];
        if let Some((ligand_site, _)) = &ligand {
            sites.push(ligand_site);
        }
        let abbreviations = self.resolve_abbreviations(&sites).await;

        Ok(PreparedScene {
            epoch: token.epoch,
            content: SceneContent::BoundMolecule { site, ligand },
            abbreviations,
            payload: Some(payload),
        })
    }

    #[instrument(skip(self), fields(epoch = token.epoch))]
    pub async fn prepare_bound_molecule(
        &self,
        token: QueryToken,
        pdb_id: &str,
        bm_id: &str,
    ) -> Result<PreparedScene, VisualizationError> {
        let resource = Resource::BoundMolecule {
            pdb_id: pdb_id.to_string(),
            bm_id: bm_id.to_string(),
        };
        self.prepare_bound_site(token, pdb_id, resource).await
    }

    #[instrument(skip(self), fields(epoch = token.epoch))]
    pub async fn prepare_carbohydrate_polymer(
        &self,
        token: QueryToken,
        pdb_id: &str,
        bm_id: &str,
        entity_id: &str,
    ) -> Result<PreparedScene, VisualizationError> {
        let resource = Resource::CarbohydratePolymer {
            pdb_id: pdb_id.to_string(),
            bm_id: bm_id.to_string(),
            entity_id: entity_id.to_string(),
        };
        self.prepare_bound_site(token, pdb_id, resource).await
    }

    async fn prepare_ligand_scene(
        &self,
        token: QueryToken,
        pdb_id: &str,
        chain_id: &str,
        residue_number: i32,
        chained: bool,
    ) -> Result<PreparedScene, VisualizationError> {
        let (site, depiction, payload) = self.ligand_site(pdb_id, chain_id, residue_number).await?;
        let abbreviations = self.resolve_abbreviations(&[&site]).await;
        Ok(PreparedScene {
            epoch: token.epoch,
            content: SceneContent::Ligand {
                site,
                depiction,
                chained,
            },
            abbreviations,
            payload: Some(payload),
        })
    }

    #[instrument(skip(self), fields(epoch = token.epoch))]
    pub async fn prepare_ligand(
        &self,
        token: QueryToken,
        pdb_id: &str,
        chain_id: &str,
        residue_number: i32,
    ) -> Result<PreparedScene, VisualizationError> {
        self.prepare_ligand_scene(token, pdb_id, chain_id, residue_number, false)
            .await
    }

    #[instrument(skip(self), fields(epoch = token.epoch))]
    pub async fn prepare_depiction(
        &self,
        token: QueryToken,
        ccd_id: &str,
    ) -> Result<PreparedScene, VisualizationError> {
        let annotation: LigandAnnotation = self
            .fetch_document(Resource::LigandAnnotation {
                ccd_id: ccd_id.to_string(),
            })
            .await?;
        Ok(PreparedScene {
            epoch: token.epoch,
            content: SceneContent::Depiction(Depiction::from_annotation(&annotation)?),
            abbreviations: Vec::new(),
            payload: None,
        })
    }

    /// Replaces the current scene with `prepared`, unless a newer query has started.
    pub fn install(&mut self, prepared: PreparedScene) -> Result<InstallStatus, VisualizationError> {
        if prepared.epoch != self.epoch {
            debug!(
                prepared = prepared.epoch,
                current = self.epoch,
                "Discarding scene of a superseded query"
            );
            return Ok(InstallStatus::Discarded);
        }

        for (code, letter) in prepared.abbreviations {
            self.catalogue.insert(code, letter);
        }
        self.presentation = Presentation::default();
        self.dragging = None;
        self.placeholder = None;
        self.frame = None;
        self.payload = prepared.payload;

        match prepared.content {
            SceneContent::BoundMolecule { site, ligand: None } => {
                self.sites = vec![site];
                self.depiction = None;
                self.run_residue_scene();
            }
            SceneContent::BoundMolecule {
                site,
                ligand: Some((ligand_site, depiction)),
            } => {
                self.sites = vec![site, ligand_site];
                self.depiction = Some(depiction);
                self.run_ligand_scene()?;
            }
            SceneContent::Ligand {
                site,
                depiction,
                chained,
            } => {
                if chained {
                    self.sites.truncate(1);
                } else {
                    self.sites.clear();
                }
                self.sites.push(site);
                self.depiction = Some(depiction);
                self.run_ligand_scene()?;
            }
            SceneContent::Depiction(depiction) => {
                self.sites.clear();
                self.simulation = None;
                self.depiction = Some(depiction);
            }
        }
        info!(kind = ?self.kind(), "Installed scene");
        Ok(InstallStatus::Installed)
    }

    fn run_residue_scene(&mut self) {
        let seed: u64 = self.rng.r#gen();
        let center = self.config.viewport.center();
        let Some(site) = self.sites.last_mut() else {
            self.simulation = None;
            return;
        };
        self.simulation = Some(Simulation::new(site, LayoutConfig::residue_scene(center), seed));
        self.frame = None;
    }

    fn run_ligand_scene(&mut self) -> Result<(), VisualizationError> {
        let seed: u64 = self.rng.r#gen();
        let Some(site) = self.sites.last_mut() else {
            self.simulation = None;
            return Ok(());
        };
        let depiction = self.depiction.as_ref().ok_or(VisualizationError::NoDepiction)?;
        place_partners(site, depiction, self.config.jitter, &mut self.rng)?;
        self.simulation = Some(Simulation::new(site, LayoutConfig::ligand_scene(), seed));
        self.frame = None;
        Ok(())
    }

    /// Steps the layout until it settles, stops, or `max_ticks` steps have run.
    pub fn settle(&mut self, max_ticks: usize, reporter: &ProgressReporter<'_>) -> SettleOutcome {
        let threshold = self.config.settle_threshold;
        let (Some(simulation), Some(site)) = (self.simulation.as_mut(), self.sites.last_mut()) else {
            return SettleOutcome {
                ticks: 0,
                settled: false,
            };
        };

        reporter.report(Progress::TaskStart {
            total_steps: max_ticks as u64,
        });
        let mut outcome = SettleOutcome {
            ticks: 0,
            settled: false,
        };
        while outcome.ticks < max_ticks {
            let frame = simulation.tick(site);
            outcome.ticks += 1;
            reporter.report(Progress::TaskIncrement);
            outcome.settled = frame.is_settled(threshold);
            self.frame = Some(frame);
            if outcome.settled || !simulation.is_running() {
                break;
            }
        }
        reporter.report(Progress::TaskFinish);

        if outcome.settled {
            info!(ticks = outcome.ticks, "Layout settled");
        } else {
            warn!(ticks = outcome.ticks, "Layout did not settle");
        }
        outcome
    }

    /// Fits the placed nodes, or the depiction when no node is placed, into the viewport.
    pub fn center_scene(&mut self) -> Option<ZoomTransform> {
        let positions: Vec<Point> = self
            .site()
            .map(|site| site.nodes().iter().filter_map(|(_, n)| n.position()).collect())
            .unwrap_or_default();
        let bbox = BoundingBox::from_points(&positions)
            .or_else(|| self.depiction.as_ref().and_then(Depiction::bounding_box))?;

        let transform = fit(&bbox, &self.config.viewport);
        self.zoom.set_transform(transform);
        debug!(?transform, "Centered scene");
        Some(transform)
    }

    /// Lays the scene out again from scratch. A ligand scene reached from a bound molecule
    /// returns to the bound molecule.
    pub fn reinitialize(&mut self) -> Result<(), VisualizationError> {
        self.presentation = Presentation::default();
        self.dragging = None;

        let result = if self.sites.len() > 1 && self.depiction.is_some() {
            self.sites.truncate(1);
            self.depiction = None;
            self.reset_current_site();
            self.run_residue_scene();
            Ok(())
        } else if self.depiction.is_none() {
            self.reset_current_site();
            self.run_residue_scene();
            Ok(())
        } else {
            self.reset_current_site();
            self.run_ligand_scene()
        };

        self.emit(SceneEvent::cleared(EventKind::HideLabel));
        result
    }

    fn reset_current_site(&mut self) {
        if let Some(site) = self.sites.last_mut() {
            site.reset_positions();
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.viewport = Viewport::new(width, height);
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.set_center(self.config.viewport.center());
            simulation.restart();
        }
    }

    /// Weights depiction atoms by their share of the selected contact types.
    pub fn apply_atom_weights<S: AsRef<str>>(
        &mut self,
        weights: &AggregatedWeights,
        contact_types: &[S],
    ) -> Result<Vec<AtomPropensity>, VisualizationError> {
        let depiction = self
            .depiction
            .as_mut()
            .ok_or(VisualizationError::NoDepiction)?;
        let propensities = atom_propensity(weights, contact_types);
        depiction.set_weights(propensities.iter().map(|p| (p.atom.as_str(), p.value)));
        Ok(propensities)
    }

    fn current_node(&self, node: NodeId) -> Result<(&BindingSite, Arc<Residue>), VisualizationError> {
        let site = self.site().ok_or(VisualizationError::NoScene)?;
        let residue = site
            .node(node)
            .map(|n| Arc::clone(&n.residue))
            .ok_or_else(|| EngineError::NodeNotFound(format!("{node:?}")))?;
        Ok((site, residue))
    }

    /// Enlarges `node` and dims everything outside its neighbourhood.
    fn highlight_node(&mut self, node: NodeId) -> Result<(), VisualizationError> {
        let (site, _) = self.current_node(node)?;
        let neighbours: HashSet<NodeId> = site.neighbourhood(node).into_iter().collect();
        let dimmed_nodes: HashSet<NodeId> = site
            .nodes()
            .ids()
            .iter()
            .copied()
            .filter(|id| !neighbours.contains(id))
            .collect();
        let dimmed_links: HashSet<usize> = site
            .links()
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.contains_node(node))
            .map(|(i, _)| i)
            .collect();

        self.presentation.scales.insert(node, HIGHLIGHT_SCALE);
        self.presentation.dimmed_nodes = dimmed_nodes;
        self.presentation.dimmed_links = dimmed_links;
        Ok(())
    }

    fn dim_node(&mut self, node: NodeId) {
        let is_static = self
            .site()
            .and_then(|s| s.node(node))
            .is_some_and(|n| n.is_static);
        if !is_static {
            self.presentation.scales.remove(&node);
        }
    }

    /// Ignored while a node is being dragged.
    pub fn hover_node(&mut self, node: NodeId) -> Result<(), VisualizationError> {
        if self.dragging.is_some() {
            return Ok(());
        }
        self.highlight_node(node)?;
        let (site, residue) = self.current_node(node)?;
        let tooltip = site.node(node).map(|n| n.tooltip()).unwrap_or_default();
        let detail = node_detail(&site.pdb_id, &residue, tooltip);
        self.emit(SceneEvent::new(EventKind::Mouseover, detail));
        Ok(())
    }

    pub fn leave_node(&mut self, node: NodeId) {
        if self.dragging.is_some() {
            return;
        }
        self.dim_node(node);
        self.presentation.restore_opacity();
        self.emit(SceneEvent::cleared(EventKind::Mouseout));
    }

    pub fn hover_link(&mut self, link: usize) -> Result<(), VisualizationError> {
        if self.dragging.is_some() {
            return Ok(());
        }
        let site = self.site().ok_or(VisualizationError::NoScene)?;
        let found = site.links().get(link).ok_or(VisualizationError::UnknownLink(link))?;
        let (Some(source), Some(target)) = (site.node(found.source()), site.node(found.target())) else {
            return Err(VisualizationError::UnknownLink(link));
        };
        let detail = EventDetail::Link {
            interacting_nodes: [
                ResidueRef::of(&site.pdb_id, &source.residue).with_atoms(found.source_atoms()),
                ResidueRef::of(&site.pdb_id, &target.residue).with_atoms(found.target_atoms()),
            ],
            tooltip: found.tooltip(site.nodes(), &self.catalogue),
        };
        self.emit(SceneEvent::new(EventKind::Mouseover, detail));
        Ok(())
    }

    pub fn leave_link(&mut self) {
        if self.dragging.is_none() {
            self.emit(SceneEvent::cleared(EventKind::Mouseout));
        }
    }

    /// Emits a click for `node`. Clicking a ligand of a bound-molecule scene also opens the
    /// environment of that ligand, which is returned as the install status.
    pub async fn click_node(&mut self, node: NodeId) -> Result<Option<InstallStatus>, VisualizationError> {
        let (site, residue) = self.current_node(node)?;
        let pdb_id = site.pdb_id.clone();
        let tooltip = residue.tooltip();
        self.emit(SceneEvent::new(EventKind::Click, node_detail(&pdb_id, &residue, tooltip.clone())));

        if !(residue.is_ligand && self.kind() == Some(SceneKind::Residues)) {
            return Ok(None);
        }

        self.dim_node(node);
        self.emit(SceneEvent::cleared(EventKind::Mouseout));
        self.emit(SceneEvent::new(
            EventKind::ShowLabel,
            EventDetail::Label { label: tooltip },
        ));

        let token = self.begin_query();
        let prepared = self
            .prepare_ligand_scene(
                token,
                &pdb_id,
                &residue.chain_id,
                residue.author_residue_number,
                true,
            )
            .await;
        let prepared = prepared.map_err(|e| self.fail(e))?;
        self.install(prepared).map(Some)
    }

    /// Highlights the node of the residue `chain + number + insertion code`, as requested by
    /// an external structure viewer. Returns whether such a node is on display.
    pub fn highlight_residue(&mut self, chain_id: &str, residue_number: i32, insertion_code: &str) -> bool {
        let hash = format!("{chain_id}{residue_number}{insertion_code}");
        let found = self
            .site()
            .and_then(|site| site.nodes().iter().find(|(_, n)| n.id == hash).map(|(id, _)| id));
        match found {
            Some(node) => self.highlight_node(node).is_ok(),
            None => false,
        }
    }

    pub fn clear_highlight(&mut self) {
        let highlighted: Vec<NodeId> = self.presentation.scales.keys().copied().collect();
        for node in highlighted {
            self.dim_node(node);
        }
        self.presentation.restore_opacity();
    }

    pub fn drag_start(&mut self, node: NodeId) -> Result<(), VisualizationError> {
        let (Some(simulation), Some(site)) = (self.simulation.as_mut(), self.sites.last_mut()) else {
            return Err(VisualizationError::NoScene);
        };
        simulation.drag_start(site, node)?;
        self.dragging = Some(node);
        Ok(())
    }

    pub fn drag(&mut self, node: NodeId, to: Point) -> Result<(), VisualizationError> {
        let (Some(simulation), Some(site)) = (self.simulation.as_mut(), self.sites.last_mut()) else {
            return Err(VisualizationError::NoScene);
        };
        simulation.drag(site, node, to)?;
        Ok(())
    }

    pub fn drag_end(&mut self, node: NodeId) -> Result<(), VisualizationError> {
        let (Some(simulation), Some(site)) = (self.simulation.as_mut(), self.sites.last_mut()) else {
            return Err(VisualizationError::NoScene);
        };
        simulation.drag_end(site, node)?;
        self.dragging = None;
        Ok(())
    }

    /// Advances the layout by one step, as an animation frame would.
    pub fn tick(&mut self) -> Option<&Frame> {
        let (Some(simulation), Some(site)) = (self.simulation.as_mut(), self.sites.last_mut()) else {
            return None;
        };
        self.frame = Some(simulation.tick(site));
        self.frame.as_ref()
    }

    fn fail(&mut self, err: VisualizationError) -> VisualizationError {
        if let Some(message) = err.placeholder() {
            warn!(error = %err, "Showing placeholder instead of the scene");
            self.sites.clear();
            self.depiction = None;
            self.simulation = None;
            self.frame = None;
            self.presentation = Presentation::default();
            self.payload = None;
            self.placeholder = Some(message);
        }
        err
    }

    fn present(
        &mut self,
        prepared: Result<PreparedScene, VisualizationError>,
        reporter: &ProgressReporter<'_>,
    ) -> Result<InstallStatus, VisualizationError> {
        let prepared = prepared.map_err(|e| self.fail(e))?;
        let status = self.install(prepared)?;
        if status == InstallStatus::Installed {
            let max_ticks = self.config.max_ticks;
            reporter.phase("Layout", || self.settle(max_ticks, reporter));
            self.center_scene();
        }
        Ok(status)
    }

    pub async fn show_bound_molecule(
        &mut self,
        pdb_id: &str,
        bm_id: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<InstallStatus, VisualizationError> {
        let token = self.begin_query();
        let prepared = self.prepare_bound_molecule(token, pdb_id, bm_id).await;
        self.present(prepared, reporter)
    }

    pub async fn show_carbohydrate_polymer(
        &mut self,
        pdb_id: &str,
        bm_id: &str,
        entity_id: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<InstallStatus, VisualizationError> {
        let token = self.begin_query();
        let prepared = self
            .prepare_carbohydrate_polymer(token, pdb_id, bm_id, entity_id)
            .await;
        self.present(prepared, reporter)
    }

    pub async fn show_ligand(
        &mut self,
        pdb_id: &str,
        chain_id: &str,
        residue_number: i32,
        reporter: &ProgressReporter<'_>,
    ) -> Result<InstallStatus, VisualizationError> {
        let token = self.begin_query();
        let prepared = self
            .prepare_ligand(token, pdb_id, chain_id, residue_number)
            .await;
        self.present(prepared, reporter)
    }

    pub async fn show_depiction(
        &mut self,
        ccd_id: &str,
        reporter: &ProgressReporter<'_>,
    ) -> Result<InstallStatus, VisualizationError> {
        let token = self.begin_query();
        let prepared = self.prepare_depiction(token, ccd_id).await;
        self.present(prepared, reporter)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let site = self.site();
        let (nodes, links) = site
            .map(|s| {
                graph_snapshot(
                    s,
                    &self.catalogue,
                    |id, base| self.presentation.node_style(id, base),
                    |i| self.presentation.link_opacity(i),
                )
            })
            .unwrap_or_default();

        SceneSnapshot {
            kind: self.kind(),
            pdb_id: site.map(|s| s.pdb_id.clone()),
            bm_id: site.map(|s| s.bm_id.clone()),
            placeholder: self.placeholder.clone(),
            viewport: self.config.viewport,
            transform: self.zoom.transform(),
            alpha: self.simulation.as_ref().map(Simulation::alpha),
            nodes,
            links,
            depiction: self.depiction.as_ref().map(DepictionSnapshot::of),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::VisualizationConfigBuilder;
    use crate::workflows::provider::MemoryProvider;
    use std::sync::Mutex;

    const PDB: &str = "1abc";

    fn residue(chain: &str, number: i32, code: &str) -> String {
        format!(r#"{{"chain_id": "{chain}", "author_residue_number": {number}, "chem_comp_id": "{code}"}}"#)
    }

    fn contact(begin: &str, end: &str, tags: &str) -> String {
        format!(r#"{{"begin": {begin}, "end": {end}, "interactions": {{"atom_atom": [{tags}]}}}}"#)
    }

    fn bound_molecule(bm_id: &str, ligands: &[&str], connections: &str, contacts: &[String]) -> String {
        format!(
            r#"{{"{bm_id}": [{{"bm_id": "{bm_id}", "composition": {{"ligands": [{}], "connections": {connections}}}, "interactions": [{}]}}]}}"#,
            ligands.join(","),
            contacts.join(",")
        )
    }

    fn annotation(ccd_id: &str) -> String {
        format!(
            r#"{{"ccd_id": "{ccd_id}", "resolution": {{"x": 120, "y": 80}},
                "atoms": [
                    {{"name": "C1", "x": 0, "y": 0}},
                    {{"name": "C2", "x": 10, "y": 0}},
                    {{"name": "O1", "x": 20, "y": 0, "labels": [{{"d": "M0 0", "fill": "red"}}]}}
                ],
                "bonds": [
                    {{"bgn": "C1", "end": "C2", "coords": "M0 0L10 0", "style": "stroke-width:2px"}},
                    {{"bgn": "C2", "end": "O1", "coords": "M10 0L20 0", "style": ""}}
                ]}}"#
        )
    }

    fn ligand_contact(atom: &str, number: i32, code: &str, target: &str, detail: &str) -> String {
        format!(
            r#"{{"ligand_atoms": ["{atom}"], "end": {{"chain_id": "A", "author_residue_number": {number}, "chem_comp_id": "{code}", "atom_names": ["{target}"]}}, "interaction_type": "atom-atom", "interaction_details": ["{detail}"], "distance": 3.1}}"#
        )
    }

    fn ligand_interactions(code: &str, number: i32) -> String {
        format!(
            r#"{{"{PDB}": [{{"ligand": {}, "interactions": [{}, {}]}}]}}"#,
            residue("A", number, code),
            ligand_contact("C1", 50, "SER", "OG", "hbond"),
            ligand_contact("C2", 60, "LEU", "CD1", "hydrophobic"),
        )
    }

    /// Two sugars (one chained to a protein asparagine), one selenomethionine and one residue
    /// whose compound summary is unavailable.
    fn glycan() -> String {
        let (nag1, nag2) = (residue("A", 1, "NAG"), residue("A", 2, "NAG"));
        bound_molecule(
            "bm1",
            &[&nag1, &nag2],
            r#"[["A1", "A2"]]"#,
            &[
                contact(&nag1, &residue("A", 20, "ASN"), r#""covalent""#),
                contact(&nag2, &residue("A", 30, "MSE"), r#""hydrophobic""#),
                contact(&nag2, &residue("A", 40, "XYZ"), r#""vdw""#),
            ],
        )
    }

    fn provider() -> MemoryProvider {
        let lig = residue("A", 900, "LIG");
        MemoryProvider::new()
            .with(
                Resource::BoundMolecule { pdb_id: PDB.into(), bm_id: "bm1".into() },
                glycan(),
            )
            .with(
                Resource::BoundMolecule { pdb_id: PDB.into(), bm_id: "bm2".into() },
                bound_molecule("bm2", &[&lig], "[]", &[contact(&lig, &residue("A", 50, "SER"), r#""hbond""#)]),
            )
            .with(
                Resource::CompoundSummary { chem_comp_id: "MSE".into() },
                r#"{"MSE": [{"one_letter_code": "M"}]}"#,
            )
            .with(
                Resource::LigandInteractions { pdb_id: PDB.into(), chain_id: "A".into(), residue_number: 900 },
                ligand_interactions("LIG", 900),
            )
            .with(
                Resource::LigandInteractions { pdb_id: PDB.into(), chain_id: "A".into(), residue_number: 1 },
                ligand_interactions("NAG", 1),
            )
            .with(Resource::LigandAnnotation { ccd_id: "LIG".into() }, annotation("LIG"))
            .with(Resource::LigandAnnotation { ccd_id: "NAG".into() }, annotation("NAG"))
    }

    fn visualization(jitter: f64) -> Visualization<MemoryProvider> {
        let config = VisualizationConfigBuilder::new()
            .viewport(Viewport::new(800.0, 600.0))
            .jitter(jitter)
            .seed(42)
            .build()
            .unwrap();
        Visualization::new(provider(), ResidueCatalogue::new(), config)
    }

    fn record_events(vis: &mut Visualization<MemoryProvider>) -> Arc<Mutex<Vec<SceneEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        vis.subscribe(Box::new(move |e: &SceneEvent| sink.lock().unwrap().push(e.clone())));
        log
    }

    fn node_of(vis: &Visualization<MemoryProvider>, residue_id: &str) -> NodeId {
        vis.site().unwrap().find_node_by_residue(residue_id).unwrap()
    }

    #[tokio::test]
    async fn bound_molecule_scene_settles_and_is_fitted_into_view() {
        let mut vis = visualization(55.0);
        let status = vis
            .show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();

        assert_eq!(status, InstallStatus::Installed);
        assert_eq!(vis.kind(), Some(SceneKind::Residues));
        assert!(vis.frame().unwrap().is_settled(vis.config().settle_threshold));
        assert_ne!(vis.zoom().transform(), ZoomTransform::IDENTITY);

        let snapshot = vis.snapshot();
        assert_eq!(snapshot.nodes.len(), 5);
        assert_eq!(snapshot.links.len(), 4);
        assert!(snapshot.nodes.iter().all(|n| n.x.is_some() && n.y.is_some()));
        assert!(snapshot.depiction.is_none());
        assert_eq!(snapshot.bm_id.as_deref(), Some("bm1"));
    }

    #[tokio::test]
    async fn interactions_payload_follows_the_site_on_display() {
        let mut vis = visualization(55.0);
        vis.show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();
        let payload = vis.interactions_payload().unwrap();
        assert_eq!(payload.file_name(), "1abc_bm1_interactions.json");
        assert_eq!(payload.document["bm1"][0]["bm_id"], "bm1");

        vis.show_bound_molecule(PDB, "bm2", &ProgressReporter::new())
            .await
            .unwrap();
        let payload = vis.interactions_payload().unwrap();
        assert_eq!(payload.file_name(), "1abc_LIG_A_900_interactions.json");
        assert!(payload.document.get(PDB).is_some());

        vis.show_depiction("LIG", &ProgressReporter::new())
            .await
            .unwrap();
        assert!(vis.interactions_payload().is_none());

        vis.show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();
        vis.show_bound_molecule(PDB, "bm9", &ProgressReporter::new())
            .await
            .unwrap_err();
        assert!(vis.interactions_payload().is_none());
    }

    #[tokio::test]
    async fn catalogue_lookups_resolve_codes_and_tolerate_failures() {
        let mut vis = visualization(55.0);
        let token = vis.begin_query();
        let prepared = vis.prepare_bound_molecule(token, PDB, "bm1").await.unwrap();
        assert_eq!(prepared.abbreviations(), &[("MSE".to_string(), "M".to_string())]);
        assert_eq!(prepared.kind(), SceneKind::Residues);

        vis.install(prepared).unwrap();
        let snapshot = vis.snapshot();
        let class_of = |id: &str| {
            snapshot
                .nodes
                .iter()
                .find(|n| n.id == id)
                .map(|n| n.class.clone())
                .unwrap()
        };
        assert_eq!(class_of("A30"), "pdb-lig-env-svg-hydrophobic-res");
        assert_eq!(class_of("A40"), "pdb-lig-env-svg-other-res");
        assert_eq!(class_of("A1"), "pdb-lig-env-svg-ligand-res");
    }

    #[tokio::test]
    async fn scene_prepared_for_an_older_query_is_discarded() {
        let mut vis = visualization(55.0);
        let stale = vis.begin_query();
        let prepared = vis.prepare_bound_molecule(stale, PDB, "bm1").await.unwrap();
        let fresh = vis.begin_query();
        assert!(fresh.epoch() > stale.epoch());

        assert_eq!(vis.install(prepared).unwrap(), InstallStatus::Discarded);
        assert!(vis.site().is_none());
        assert_eq!(vis.kind(), None);
    }

    #[tokio::test]
    async fn missing_interactions_render_a_placeholder() {
        let mut vis = visualization(55.0);
        let err = vis
            .show_bound_molecule(PDB, "bm9", &ProgressReporter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VisualizationError::Fetch(FetchError::NotFound(_))));
        assert_eq!(vis.placeholder(), Some(NO_INTERACTIONS_MESSAGE));
        assert_eq!(vis.snapshot().placeholder.as_deref(), Some(NO_INTERACTIONS_MESSAGE));

        vis.show_depiction("HEM", &ProgressReporter::new())
            .await
            .unwrap_err();
        assert_eq!(vis.placeholder(), Some("Component HEM was not found."));
    }

    #[tokio::test]
    async fn depiction_scene_is_centered_on_atoms_and_labels() {
        let mut vis = visualization(55.0);
        vis.show_depiction("LIG", &ProgressReporter::new())
            .await
            .unwrap();
        assert_eq!(vis.kind(), Some(SceneKind::Depiction));
        assert!(vis.placeholder().is_none());

        let bbox = vis.depiction().unwrap().bounding_box().unwrap();
        let expected = fit(&bbox, &vis.config().viewport);
        assert_eq!(vis.zoom().transform(), expected);

        let snapshot = vis.snapshot();
        let depiction = snapshot.depiction.unwrap();
        assert_eq!(depiction.atoms.len(), 3);
        assert_eq!(depiction.bonds[0].style, "stroke-width:4px");
    }

    #[tokio::test]
    async fn single_ligand_bound_molecule_opens_the_ligand_scene() {
        let mut vis = visualization(0.0);
        let token = vis.begin_query();
        let prepared = vis.prepare_bound_molecule(token, PDB, "bm2").await.unwrap();
        assert_eq!(prepared.kind(), SceneKind::Ligand);
        vis.install(prepared).unwrap();

        assert_eq!(vis.sites().len(), 2);
        assert_eq!(vis.kind(), Some(SceneKind::Ligand));
        assert_eq!(vis.site().unwrap().bm_id, "LIG_A_900");

        // Partners start one bond length outside the atom they touch.
        let site = vis.site().unwrap();
        let ser = site.node(node_of(&vis, "A50")).unwrap();
        assert_eq!(ser.position(), Some(Point::new(-10.0, 0.0)));
        let leu = site.node(node_of(&vis, "A60")).unwrap();
        assert_eq!(leu.position(), Some(Point::new(20.0, 0.0)));
    }

    #[tokio::test]
    async fn reinitialize_returns_from_ligand_to_bound_molecule() {
        let mut vis = visualization(55.0);
        let events = record_events(&mut vis);
        vis.show_bound_molecule(PDB, "bm2", &ProgressReporter::new())
            .await
            .unwrap();
        assert_eq!(vis.kind(), Some(SceneKind::Ligand));

        vis.reinitialize().unwrap();
        assert_eq!(vis.kind(), Some(SceneKind::Residues));
        assert_eq!(vis.sites().len(), 1);
        assert!(vis.depiction().is_none());
        assert_eq!(
            events.lock().unwrap().last().map(|e| e.kind),
            Some(EventKind::HideLabel)
        );
    }

    #[tokio::test]
    async fn reinitialize_releases_pins_and_keeps_the_layout() {
        let mut vis = visualization(55.0);
        vis.show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();
        let asn = node_of(&vis, "A20");
        let sugar = node_of(&vis, "A2");
        vis.drag_start(asn).unwrap();
        vis.drag(asn, Point::new(1000.0, 1000.0)).unwrap();
        vis.tick();
        vis.drag_end(asn).unwrap();
        let site = vis.site().unwrap();
        assert_eq!(
            site.node(asn).unwrap().pinned_position(),
            Some(Point::new(1000.0, 1000.0))
        );
        let sugar_position = site.node(sugar).unwrap().position();

        vis.reinitialize().unwrap();
        let site = vis.site().unwrap();
        let node = site.node(asn).unwrap();
        assert!(node.pinned_position().is_none());
        assert_eq!(node.position(), Some(Point::new(1000.0, 1000.0)));
        assert_eq!(site.node(sugar).unwrap().position(), sugar_position);
        assert!(vis.simulation().unwrap().is_running());
    }

    #[tokio::test]
    async fn hovering_a_node_dims_everything_but_its_neighbourhood() {
        let mut vis = visualization(55.0);
        let events = record_events(&mut vis);
        vis.show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();

        let asn = node_of(&vis, "A20");
        vis.hover_node(asn).unwrap();
        let snapshot = vis.snapshot();
        for node in &snapshot.nodes {
            let expected = if node.id == "A20" || node.id == "A1" { 1.0 } else { DIMMED_OPACITY };
            assert_eq!(node.opacity, expected, "opacity of {}", node.id);
        }
        let asn_snapshot = snapshot.nodes.iter().find(|n| n.id == "A20").unwrap();
        assert_eq!(asn_snapshot.scale, HIGHLIGHT_SCALE);
        assert_eq!(snapshot.links.iter().filter(|l| l.opacity == 1.0).count(), 1);

        vis.leave_node(asn);
        let snapshot = vis.snapshot();
        assert!(snapshot.nodes.iter().all(|n| n.opacity == 1.0));
        assert!(snapshot.links.iter().all(|l| l.opacity == 1.0));

        let kinds: Vec<EventKind> = events.lock().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Mouseover, EventKind::Mouseout]);
    }

    #[tokio::test]
    async fn hover_is_ignored_while_dragging() {
        let mut vis = visualization(55.0);
        let events = record_events(&mut vis);
        vis.show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();
        let asn = node_of(&vis, "A20");
        vis.drag_start(asn).unwrap();
        vis.hover_node(node_of(&vis, "A30")).unwrap();
        vis.leave_link();
        assert!(events.lock().unwrap().is_empty());
        vis.drag_end(asn).unwrap();
        vis.leave_link();
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn hovering_a_ligand_link_reports_both_atom_lists() {
        let mut vis = visualization(55.0);
        let events = record_events(&mut vis);
        vis.show_ligand(PDB, "A", 900, &ProgressReporter::new())
            .await
            .unwrap();
        let site = vis.site().unwrap();
        let ser = node_of(&vis, "A50");
        let index = site
            .links()
            .iter()
            .position(|l| l.contains_node(ser))
            .unwrap();

        vis.hover_link(index).unwrap();
        let events = events.lock().unwrap();
        let EventDetail::Link { interacting_nodes, tooltip } = &events[0].detail else {
            panic!("expected a link event, got {:?}", events[0]);
        };
        assert_eq!(interacting_nodes[0].atoms.as_deref(), Some(&["C1".to_string()][..]));
        assert_eq!(interacting_nodes[1].atoms.as_deref(), Some(&["OG".to_string()][..]));
        assert_eq!(interacting_nodes[1].pdb_res_id, PDB);
        assert_eq!(interacting_nodes[1].auth_seq_id, 50);
        assert!(tooltip.contains("side chain"));
        assert!(matches!(vis.hover_link(99), Err(VisualizationError::UnknownLink(99))));
    }

    #[tokio::test]
    async fn clicking_a_ligand_opens_its_environment() {
        let mut vis = visualization(55.0);
        let events = record_events(&mut vis);
        vis.show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();

        let protein = node_of(&vis, "A20");
        assert_eq!(vis.click_node(protein).await.unwrap(), None);

        let sugar = node_of(&vis, "A1");
        let status = vis.click_node(sugar).await.unwrap();
        assert_eq!(status, Some(InstallStatus::Installed));
        assert_eq!(vis.kind(), Some(SceneKind::Ligand));
        assert_eq!(vis.sites().len(), 2);
        assert_eq!(vis.sites()[0].bm_id, "bm1");

        let kinds: Vec<EventKind> = events.lock().unwrap().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Click,
                EventKind::Click,
                EventKind::Mouseout,
                EventKind::ShowLabel
            ]
        );
        let events = events.lock().unwrap();
        let EventDetail::Node { selected_node, .. } = &events[1].detail else {
            panic!("expected a node event, got {:?}", events[1]);
        };
        assert_eq!(selected_node.pdb_res_id, PDB);
        assert_eq!(selected_node.auth_seq_id, 1);
    }

    #[tokio::test]
    async fn external_highlight_matches_residue_hash() {
        let mut vis = visualization(55.0);
        vis.show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();
        assert!(vis.highlight_residue("A", 30, ""));
        assert!(!vis.highlight_residue("B", 30, ""));

        let dimmed = vis.snapshot().nodes.iter().filter(|n| n.opacity < 1.0).count();
        assert_eq!(dimmed, 3);
        vis.clear_highlight();
        assert!(vis.snapshot().nodes.iter().all(|n| n.opacity == 1.0 && n.scale == 1.0));
    }

    #[tokio::test]
    async fn resize_recenters_residue_scene() {
        let mut vis = visualization(55.0);
        vis.show_bound_molecule(PDB, "bm1", &ProgressReporter::new())
            .await
            .unwrap();
        vis.resize(1000.0, 200.0);
        let simulation = vis.simulation().unwrap();
        assert_eq!(simulation.center(), Some(Point::new(500.0, 100.0)));
        assert!(simulation.is_running());
    }

    #[tokio::test]
    async fn atom_weights_need_a_depiction() {
        let weights = AggregatedWeights::from_json(
            r#"{"hbond": [{"atom": "O1", "residue": "SER", "count": 3}], "vdw": [{"atom": "C1", "residue": "LEU", "count": 1}]}"#,
        )
        .unwrap();
        let mut vis = visualization(55.0);
        assert!(matches!(
            vis.apply_atom_weights(&weights, &["TOTAL"]),
            Err(VisualizationError::NoDepiction)
        ));

        vis.show_depiction("LIG", &ProgressReporter::new())
            .await
            .unwrap();
        let propensities = vis.apply_atom_weights(&weights, &["TOTAL"]).unwrap();
        assert_eq!(propensities.len(), 2);
        let depiction = vis.snapshot().depiction.unwrap();
        let weight_of = |name: &str| depiction.atoms.iter().find(|a| a.name == name).unwrap().weight;
        assert_eq!(weight_of("O1"), 75.0);
        assert_eq!(weight_of("C1"), 25.0);
        assert_eq!(weight_of("C2"), 0.0);
    }

    #[tokio::test]
    async fn settle_reports_one_increment_per_tick() {
        let mut vis = visualization(55.0);
        let token = vis.begin_query();
        let prepared = vis.prepare_bound_molecule(token, PDB, "bm1").await.unwrap();
        vis.install(prepared).unwrap();

        let increments = Mutex::new(0u64);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if event == Progress::TaskIncrement {
                *increments.lock().unwrap() += 1;
            }
        }));
        let outcome = vis.settle(25, &reporter);
        drop(reporter);
        assert_eq!(outcome.ticks, 25);
        assert!(!outcome.settled);
        assert_eq!(increments.into_inner().unwrap(), 25);
    }
}
