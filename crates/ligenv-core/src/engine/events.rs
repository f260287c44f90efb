//! Semantic events emitted towards an embedding UI.
//!
//! Names and payload shapes are stable: an event serialises as
//! `{"name": "PDB.interactions.click", "detail": {...}}`.

use crate::core::models::residue::Residue;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Mouseover,
    Mouseout,
    ShowLabel,
    HideLabel,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "PDB.interactions.click",
            Self::Mouseover => "PDB.interactions.mouseover",
            Self::Mouseout => "PDB.interactions.mouseout",
            Self::ShowLabel => "PDB.interactions.showLabel",
            Self::HideLabel => "PDB.interactions.hideLabel",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Identity of a residue as seen by structure viewers. `pdb_res_id` names the entry the
/// residue belongs to, so that a listener can find the structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueRef {
    pub pdb_res_id: String,
    pub auth_asym_id: String,
    pub auth_seq_id: i32,
    pub auth_ins_code_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atoms: Option<Vec<String>>,
}

impl ResidueRef {
    pub fn of(pdb_id: &str, residue: &Residue) -> Self {
        Self {
            pdb_res_id: pdb_id.to_string(),
            auth_asym_id: residue.chain_id.clone(),
            auth_seq_id: residue.author_residue_number,
            auth_ins_code_id: residue.author_insertion_code.clone(),
            atoms: None,
        }
    }

    pub fn with_atoms(mut self, atoms: Vec<String>) -> Self {
        self.atoms = Some(atoms);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventDetail {
    Node {
        selected_node: ResidueRef,
        tooltip: String,
    },
    Link {
        interacting_nodes: [ResidueRef; 2],
        tooltip: String,
    },
    Label {
        label: String,
    },
    Empty {},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneEvent {
    #[serde(rename = "name")]
    pub kind: EventKind,
    pub detail: EventDetail,
}

impl SceneEvent {
    pub fn new(kind: EventKind, detail: EventDetail) -> Self {
        Self { kind, detail }
    }

    /// Event carrying no detail, used to clear a previous selection.
    pub fn cleared(kind: EventKind) -> Self {
        Self::new(kind, EventDetail::Empty {})
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

pub type EventListener = Box<dyn Fn(&SceneEvent) + Send + Sync>;

/// Fans events out to every subscribed listener, in subscription order.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<EventListener>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: EventListener) {
        self.listeners.push(listener);
    }

    pub fn dispatch(&self, event: SceneEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
