use crate::cli::{RenderArgs, SceneTarget};
use crate::commands::weights::read_document;
use crate::config::{AppConfig, build_config};
use crate::data::DataManager;
use crate::error::{CliError, Result};
use crate::provider::CliProvider;
use crate::utils::progress::CliProgressHandler;
use ligenv::core::catalogue::ResidueCatalogue;
use ligenv::core::io::payload::AggregatedWeights;
use ligenv::engine::events::SceneEvent;
use ligenv::engine::progress::ProgressReporter;
use ligenv::workflows::snapshot::{InteractionsPayload, SceneSnapshot};
use ligenv::workflows::visualization::{InstallStatus, Visualization};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

pub async fn run(args: RenderArgs) -> Result<()> {
    let data_manager = match &args.data_dir {
        Some(dir) => DataManager::with_custom_path(dir.clone()),
        None => DataManager::new()?,
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args, &data_manager)?;
    let provider = CliProvider::from_config(&config.source)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.callback());
    let RenderedScene { snapshot, payload } =
        render_scene(&args.scene, provider, &config, &reporter).await?;

    let json = serde_json::to_string_pretty(&snapshot)?;
    match &config.output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Scene snapshot written to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }

    if let Some(target) = &args.export_payload {
        match &payload {
            Some(payload) => {
                let path = export_payload(payload, target)?;
                println!("Interactions payload written to: {}", path.display());
            }
            None => warn!("Scene has no interactions payload; nothing exported to {:?}", target),
        }
    }
    Ok(())
}

/// A laid-out scene and the interactions document it was built from.
#[derive(Debug)]
pub struct RenderedScene {
    pub snapshot: SceneSnapshot,
    pub payload: Option<InteractionsPayload>,
}

/// Writes `payload` to `target`, or into it under the payload's own file name when `target`
/// is a directory. Returns the written path.
pub fn export_payload(payload: &InteractionsPayload, target: &Path) -> Result<std::path::PathBuf> {
    let path = if target.is_dir() {
        target.join(payload.file_name())
    } else {
        target.to_path_buf()
    };
    std::fs::write(&path, payload.to_pretty_json()?)?;
    info!("Exported interactions of {}/{}", payload.pdb_id, payload.bm_id);
    Ok(path)
}

/// Builds `scene`, lays it out and returns its snapshot with the interactions document.
///
/// Missing data is not an error: the snapshot then carries the placeholder message instead of a
/// graph.
pub async fn render_scene(
    scene: &SceneTarget,
    provider: CliProvider,
    config: &AppConfig,
    reporter: &ProgressReporter<'_>,
) -> Result<RenderedScene> {
    let mut visualization = Visualization::new(
        provider,
        ResidueCatalogue::new(),
        config.visualization.clone(),
    );
    visualization.subscribe(Box::new(|event: &SceneEvent| {
        debug!(event = event.name(), "Scene event");
    }));

    println!("Building {} scene...", describe(scene));
    let outcome = match scene {
        SceneTarget::Ligand {
            pdb_id,
            chain_id,
            residue_number,
        } => {
            visualization
                .show_ligand(pdb_id, chain_id, *residue_number, reporter)
                .await
        }
        SceneTarget::BoundMolecule { pdb_id, bm_id } => {
            visualization
                .show_bound_molecule(pdb_id, bm_id, reporter)
                .await
        }
        SceneTarget::Carbohydrate {
            pdb_id,
            bm_id,
            entity_id,
        } => {
            visualization
                .show_carbohydrate_polymer(pdb_id, bm_id, entity_id, reporter)
                .await
        }
        SceneTarget::Depiction { ccd_id } => visualization.show_depiction(ccd_id, reporter).await,
    };

    match outcome {
        Ok(InstallStatus::Installed) => {
            if let Some(simulation) = visualization.simulation() {
                info!(
                    "Layout finished after {} tick(s) at alpha {:.4}",
                    simulation.ticks(),
                    simulation.alpha()
                );
            }
        }
        Ok(InstallStatus::Discarded) => warn!("Scene was superseded before it could be shown."),
        Err(e) => match visualization.placeholder() {
            Some(message) => {
                warn!("{}", e);
                println!("{message}");
            }
            None => return Err(CliError::from(e)),
        },
    }

    if let Some(path) = &config.weights {
        if visualization.depiction().is_some() {
            let weights: AggregatedWeights = read_document(path)?;
            let propensities = visualization.apply_atom_weights(&weights, &config.contact_types)?;
            info!(
                "Applied weights of {} atom(s) from {:?}",
                propensities.len(),
                path
            );
        } else {
            warn!("Scene has no ligand depiction; ignoring atom weights from {:?}", path);
        }
    }

    Ok(RenderedScene {
        snapshot: visualization.snapshot(),
        payload: visualization.interactions_payload().cloned(),
    })
}

fn describe(scene: &SceneTarget) -> String {
    match scene {
        SceneTarget::Ligand {
            pdb_id,
            chain_id,
            residue_number,
        } => format!("ligand {pdb_id} {chain_id}{residue_number}"),
        SceneTarget::BoundMolecule { pdb_id, bm_id } => format!("bound molecule {pdb_id}/{bm_id}"),
        SceneTarget::Carbohydrate {
            pdb_id,
            bm_id,
            entity_id,
        } => format!("carbohydrate polymer {pdb_id}/{bm_id}/{entity_id}"),
        SceneTarget::Depiction { ccd_id } => format!("depiction {ccd_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SourceKind;
    use ligenv::core::resources::Resource;
    use serde_json::Value;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::{TempDir, tempdir};

    const ANNOTATION: &str = r#"{"ccd_id": "LIG", "resolution": {"x": 120, "y": 80},
        "atoms": [{"name": "C1", "x": 0, "y": 0}, {"name": "C2", "x": 10, "y": 0},
                  {"name": "O1", "x": 20, "y": 0}],
        "bonds": [{"bgn": "C1", "end": "C2"}, {"bgn": "C2", "end": "O1"}]}"#;

    const LIGAND_INTERACTIONS: &str = r#"{"1abc": [{
        "ligand": {"chain_id": "A", "author_residue_number": 900, "chem_comp_id": "LIG"},
        "interactions": [
            {"ligand_atoms": ["C1"], "end": {"chain_id": "A", "author_residue_number": 50, "chem_comp_id": "SER", "atom_names": ["OG"]},
             "interaction_type": "atom-atom", "interaction_details": ["hbond"], "distance": 3.1},
            {"ligand_atoms": ["O1"], "end": {"chain_id": "A", "author_residue_number": 60, "chem_comp_id": "LEU", "atom_names": ["CD1"]},
             "interaction_type": "atom-atom", "interaction_details": ["vdw"], "distance": 3.8}
        ]}]}"#;

    fn put(root: &Path, resource: Resource, body: &str) {
        let path = root.join(resource.local_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn payload_tree() -> TempDir {
        let root = tempdir().unwrap();
        put(
            root.path(),
            Resource::LigandAnnotation {
                ccd_id: "LIG".into(),
            },
            ANNOTATION,
        );
        put(
            root.path(),
            Resource::LigandInteractions {
                pdb_id: "1abc".into(),
                chain_id: "A".into(),
                residue_number: 900,
            },
            LIGAND_INTERACTIONS,
        );
        root
    }

    fn args(scene: SceneTarget, root: &Path, output: PathBuf) -> RenderArgs {
        RenderArgs {
            scene,
            output: Some(output),
            config: None,
            width: Some(400.0),
            height: Some(300.0),
            environment: None,
            source: Some(SourceKind::Dir),
            data_dir: Some(root.to_path_buf()),
            offline: false,
            seed: Some(1),
            max_ticks: Some(300),
            weights: None,
            contact_types: vec![],
            set_values: vec![],
            export_payload: None,
        }
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn depiction_scene_is_written_as_json() {
        let root = payload_tree();
        let out = root.path().join("out.json");
        run(args(
            SceneTarget::Depiction {
                ccd_id: "LIG".into(),
            },
            root.path(),
            out.clone(),
        ))
        .await
        .unwrap();

        let json = read_json(&out);
        assert_eq!(json["kind"], "depiction");
        assert_eq!(json["depiction"]["atoms"].as_array().unwrap().len(), 3);
        assert_eq!(json["viewport"]["width"], 400.0);
        assert!(json["placeholder"].is_null());
    }

    #[tokio::test]
    async fn missing_component_renders_a_placeholder() {
        let root = payload_tree();
        let out = root.path().join("out.json");
        run(args(
            SceneTarget::Depiction {
                ccd_id: "ZZZ".into(),
            },
            root.path(),
            out.clone(),
        ))
        .await
        .unwrap();

        let json = read_json(&out);
        assert_eq!(json["placeholder"], "Component ZZZ was not found.");
        assert!(json["nodes"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ligand_scene_places_partners_and_applies_weights() {
        let root = payload_tree();
        let weights = root.path().join("weights.json");
        fs::write(&weights, r#"{"hbond": [{"atom": "C1", "count": 2}]}"#).unwrap();
        let out = root.path().join("out.json");

        let mut render = args(
            SceneTarget::Ligand {
                pdb_id: "1abc".into(),
                chain_id: "A".into(),
                residue_number: 900,
            },
            root.path(),
            out.clone(),
        );
        render.weights = Some(weights);
        run(render).await.unwrap();

        let json = read_json(&out);
        assert_eq!(json["kind"], "ligand");
        let nodes = json["nodes"].as_array().unwrap();
        assert!(nodes.iter().any(|n| n["residue"]["auth_seq_id"] == 50));
        assert!(nodes.iter().all(|n| n["x"].is_number() && n["y"].is_number()));
        assert!(!json["links"].as_array().unwrap().is_empty());

        let atoms = json["depiction"]["atoms"].as_array().unwrap();
        let c1 = atoms.iter().find(|a| a["name"] == "C1").unwrap();
        assert_eq!(c1["weight"], 100.0);
    }

    #[tokio::test]
    async fn ligand_interactions_are_exported_next_to_the_snapshot() {
        let root = payload_tree();
        let exports = root.path().join("exports");
        fs::create_dir(&exports).unwrap();
        let mut render = args(
            SceneTarget::Ligand {
                pdb_id: "1abc".into(),
                chain_id: "A".into(),
                residue_number: 900,
            },
            root.path(),
            root.path().join("out.json"),
        );
        render.export_payload = Some(exports.clone());
        run(render).await.unwrap();

        let exported = exports.join("1abc_LIG_A_900_interactions.json");
        let text = fs::read_to_string(&exported).unwrap();
        assert!(text.starts_with("{\n    \"1abc\": ["));
        let json: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json, serde_json::from_str::<Value>(LIGAND_INTERACTIONS).unwrap());
    }

    #[tokio::test]
    async fn depiction_scene_has_no_payload_to_export() {
        let root = payload_tree();
        let target = root.path().join("payload.json");
        let mut render = args(
            SceneTarget::Depiction {
                ccd_id: "LIG".into(),
            },
            root.path(),
            root.path().join("out.json"),
        );
        render.export_payload = Some(target.clone());
        run(render).await.unwrap();
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn unreadable_payload_is_an_error() {
        let root = payload_tree();
        put(
            root.path(),
            Resource::LigandAnnotation {
                ccd_id: "BAD".into(),
            },
            "{ not json",
        );
        let out = root.path().join("out.json");
        let result = run(args(
            SceneTarget::Depiction {
                ccd_id: "BAD".into(),
            },
            root.path(),
            out.clone(),
        ))
        .await;
        assert!(matches!(result, Err(CliError::Visualization(_))));
        assert!(!out.exists());
    }
}
