use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const PRODUCTION_API: &str = "https://www.ebi.ac.uk/pdbe";
pub const DEVELOPMENT_API: &str = "https://wwwdev.ebi.ac.uk/pdbe";
pub const INTERNAL_API: &str = "https://wwwint.ebi.ac.uk/pdbe";

const BOUND_MOLECULE_PATH: &str = "graph-api/pdb/bound_molecule_interactions";
const CARBOHYDRATE_PATH: &str = "graph-api/pdb/carbohydrate_polymer_interactions";
const BOUND_LIGAND_PATH: &str = "graph-api/pdb/bound_ligand_interactions";
const COMPOUND_SUMMARY_PATH: &str = "api/pdb/compound/summary";
const STATIC_FILES_PATH: &str = "static/files/pdbechem_v2";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown environment '{0}'")]
pub struct UnknownEnvironment(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    #[default]
    Production,
    Development,
    Internal,
}

impl Environment {
    /// Parses a selector, falling back to production with a diagnostic when it is unknown.
    pub fn parse_or_default(selector: Option<&str>) -> Self {
        match selector {
            None => Environment::Production,
            Some(s) => s.parse().unwrap_or_else(|err: UnknownEnvironment| {
                warn!("{err}. Using production instead.");
                Environment::Production
            }),
        }
    }

    fn api_host(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_API,
            Environment::Development => DEVELOPMENT_API,
            Environment::Internal => INTERNAL_API,
        }
    }

    /// Static files are only mirrored on production and development.
    fn static_host(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_API,
            Environment::Development | Environment::Internal => DEVELOPMENT_API,
        }
    }
}

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "internal" | "int" => Ok(Environment::Internal),
            _ => Err(UnknownEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Internal => "internal",
        })
    }
}

/// A remote document the diagram can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    LigandAnnotation {
        ccd_id: String,
    },
    BoundMolecule {
        pdb_id: String,
        bm_id: String,
    },
    CarbohydratePolymer {
        pdb_id: String,
        bm_id: String,
        entity_id: String,
    },
    LigandInteractions {
        pdb_id: String,
        chain_id: String,
        residue_number: i32,
    },
    CompoundSummary {
        chem_comp_id: String,
    },
}

impl Resource {
    pub fn url(&self, env: Environment) -> String {
        match self {
            Resource::LigandAnnotation { ccd_id } => {
                format!("{}/{STATIC_FILES_PATH}/{ccd_id}/annotation", env.static_host())
            }
            Resource::BoundMolecule { pdb_id, bm_id } => {
                format!("{}/{BOUND_MOLECULE_PATH}/{pdb_id}/{bm_id}", env.api_host())
            }
            Resource::CarbohydratePolymer {
                pdb_id,
                bm_id,
                entity_id,
            } => format!(
                "{}/{CARBOHYDRATE_PATH}/{pdb_id}/{bm_id}/{entity_id}",
                env.api_host()
            ),
            Resource::LigandInteractions {
                pdb_id,
                chain_id,
                residue_number,
            } => format!(
                "{}/{BOUND_LIGAND_PATH}/{pdb_id}/{chain_id}/{residue_number}",
                env.api_host()
            ),
            Resource::CompoundSummary { chem_comp_id } => {
                format!("{}/{COMPOUND_SUMMARY_PATH}/{chem_comp_id}", env.api_host())
            }
        }
    }

    /// Relative location of the document in a local payload directory.
    pub fn local_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        match self {
            Resource::LigandAnnotation { ccd_id } => {
                path.push("annotation");
                path.push(format!("{ccd_id}.json"));
            }
            Resource::BoundMolecule { pdb_id, bm_id } => {
                path.push("bound_molecule");
                path.push(pdb_id);
                path.push(format!("{bm_id}.json"));
            }
            Resource::CarbohydratePolymer {
                pdb_id,
                bm_id,
                entity_id,
            } => {
                path.push("carbohydrate_polymer");
                path.push(pdb_id);
                path.push(format!("{bm_id}_{entity_id}.json"));
            }
            Resource::LigandInteractions {
                pdb_id,
                chain_id,
                residue_number,
            } => {
                path.push("bound_ligand");
                path.push(pdb_id);
                path.push(format!("{chain_id}_{residue_number}.json"));
            }
            Resource::CompoundSummary { chem_comp_id } => {
                path.push("compound_summary");
                path.push(format!("{chem_comp_id}.json"));
            }
        }
        path
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::LigandAnnotation { ccd_id } => write!(f, "annotation of {ccd_id}"),
            Resource::BoundMolecule { pdb_id, bm_id } => {
                write!(f, "bound molecule {bm_id} of {pdb_id}")
            }
            Resource::CarbohydratePolymer {
                pdb_id,
                bm_id,
                entity_id,
            } => write!(f, "carbohydrate polymer {bm_id}/{entity_id} of {pdb_id}"),
            Resource::LigandInteractions {
                pdb_id,
                chain_id,
                residue_number,
            } => write!(f, "ligand {chain_id}{residue_number} of {pdb_id}"),
            Resource::CompoundSummary { chem_comp_id } => {
                write!(f, "compound summary of {chem_comp_id}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_selectors_are_case_insensitive_with_aliases() {
        assert_eq!("PROD".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Development));
        assert_eq!("Internal".parse::<Environment>(), Ok(Environment::Internal));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn unknown_environment_falls_back_to_production() {
        assert_eq!(
            Environment::parse_or_default(Some("staging")),
            Environment::Production
        );
        assert_eq!(Environment::parse_or_default(None), Environment::Production);
        assert_eq!(
            Environment::parse_or_default(Some("int")),
            Environment::Internal
        );
    }

    #[test]
    fn interaction_urls_use_internal_host_on_internal() {
        let r = Resource::BoundMolecule {
            pdb_id: "3d12".to_string(),
            bm_id: "bm1".to_string(),
        };
        assert_eq!(
            r.url(Environment::Internal),
            "https://wwwint.ebi.ac.uk/pdbe/graph-api/pdb/bound_molecule_interactions/3d12/bm1"
        );
        let r = Resource::LigandInteractions {
            pdb_id: "1cbs".to_string(),
            chain_id: "A".to_string(),
            residue_number: 200,
        };
        assert_eq!(
            r.url(Environment::Production),
            "https://www.ebi.ac.uk/pdbe/graph-api/pdb/bound_ligand_interactions/1cbs/A/200"
        );
    }

    #[test]
    fn annotation_url_uses_development_host_off_production() {
        let r = Resource::LigandAnnotation {
            ccd_id: "ATP".to_string(),
        };
        assert_eq!(
            r.url(Environment::Internal),
            "https://wwwdev.ebi.ac.uk/pdbe/static/files/pdbechem_v2/ATP/annotation"
        );
        assert_eq!(
            r.url(Environment::Production),
            "https://www.ebi.ac.uk/pdbe/static/files/pdbechem_v2/ATP/annotation"
        );
    }

    #[test]
    fn carbohydrate_and_summary_urls_follow_path_rules() {
        let r = Resource::CarbohydratePolymer {
            pdb_id: "5e98".to_string(),
            bm_id: "bm2".to_string(),
            entity_id: "3".to_string(),
        };
        assert_eq!(
            r.url(Environment::Development),
            "https://wwwdev.ebi.ac.uk/pdbe/graph-api/pdb/carbohydrate_polymer_interactions/5e98/bm2/3"
        );
        let r = Resource::CompoundSummary {
            chem_comp_id: "MSE".to_string(),
        };
        assert_eq!(
            r.url(Environment::Production),
            "https://www.ebi.ac.uk/pdbe/api/pdb/compound/summary/MSE"
        );
    }

    #[test]
    fn local_paths_are_distinct_per_resource() {
        let a = Resource::LigandInteractions {
            pdb_id: "1cbs".to_string(),
            chain_id: "A".to_string(),
            residue_number: 200,
        };
        assert_eq!(a.local_path(), PathBuf::from("bound_ligand/1cbs/A_200.json"));
    }
}
