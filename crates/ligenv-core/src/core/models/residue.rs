use crate::core::catalogue::ResidueCatalogue;
use phf::{Map, phf_map};
use std::fmt;

/// Display category of a residue, used to pick its node aesthetics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueType {
    Ligand,
    Water,
    Hydrophobic,
    Positive,
    Negative,
    Polar,
    Cystein,
    Glycine,
    Proline,
    Aromatic,
    Other,
}

static SINGLE_LETTER_GROUPS: Map<&'static str, ResidueType> = phf_map! {
    "A" => ResidueType::Hydrophobic, "I" => ResidueType::Hydrophobic, "L" => ResidueType::Hydrophobic,
    "M" => ResidueType::Hydrophobic, "F" => ResidueType::Hydrophobic, "W" => ResidueType::Hydrophobic,
    "V" => ResidueType::Hydrophobic,
    "K" => ResidueType::Positive, "R" => ResidueType::Positive, "O" => ResidueType::Positive,
    "E" => ResidueType::Negative, "D" => ResidueType::Negative,
    "N" => ResidueType::Polar, "Q" => ResidueType::Polar, "S" => ResidueType::Polar, "T" => ResidueType::Polar,
    "C" => ResidueType::Cystein, "U" => ResidueType::Cystein,
    "G" => ResidueType::Glycine,
    "P" => ResidueType::Proline,
    "H" => ResidueType::Aromatic, "Y" => ResidueType::Aromatic,
};

const WATER_CODE: &str = "HOH";

impl ResidueType {
    pub fn from_single_letter(code: &str) -> Self {
        SINGLE_LETTER_GROUPS
            .get(code)
            .copied()
            .unwrap_or(ResidueType::Other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResidueType::Ligand => "ligand",
            ResidueType::Water => "water",
            ResidueType::Hydrophobic => "hydrophobic",
            ResidueType::Positive => "positive",
            ResidueType::Negative => "negative",
            ResidueType::Polar => "polar",
            ResidueType::Cystein => "cystein",
            ResidueType::Glycine => "glycine",
            ResidueType::Proline => "proline",
            ResidueType::Aromatic => "aromatic",
            ResidueType::Other => "other",
        }
    }

    pub fn css_class(&self) -> String {
        format!("pdb-lig-env-svg-{}-res", self.name())
    }
}

impl fmt::Display for ResidueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A residue taking part in the binding site, unique within it by [`Residue::id`].
#[derive(Debug, Clone)]
pub struct Residue {
    id: String,
    pub chain_id: String,
    pub author_residue_number: i32,
    pub chem_comp_id: String,
    pub author_insertion_code: String,
    pub is_ligand: bool,
}

impl Residue {
    pub fn new(
        chain_id: &str,
        author_residue_number: i32,
        chem_comp_id: &str,
        author_insertion_code: &str,
        is_ligand: bool,
    ) -> Self {
        let id = Self::derive_id(chain_id, author_residue_number, author_insertion_code);
        Self {
            id,
            chain_id: chain_id.to_string(),
            author_residue_number,
            chem_comp_id: chem_comp_id.to_string(),
            author_insertion_code: author_insertion_code.to_string(),
            is_ligand,
        }
    }

    /// Chain, number and insertion code concatenated; a blank insertion code is omitted.
    pub fn derive_id(chain_id: &str, author_residue_number: i32, insertion_code: &str) -> String {
        let insertion = if insertion_code.trim().is_empty() {
            ""
        } else {
            insertion_code
        };
        format!("{chain_id}{author_residue_number}{insertion}")
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn residue_type(&self, catalogue: &ResidueCatalogue) -> ResidueType {
        if self.is_ligand {
            return ResidueType::Ligand;
        }
        if self.chem_comp_id == WATER_CODE {
            return ResidueType::Water;
        }
        catalogue
            .abbreviation(&self.chem_comp_id)
            .map_or(ResidueType::Other, ResidueType::from_single_letter)
    }

    /// `"<chem> | <chain><sym> | <number><ins>"`, where the symmetry operator suffix of the
    /// chain (`A_2`) renders as `[2]` and the identity operator (`A_1`) is hidden.
    pub fn display_name(&self) -> String {
        let mut parts = self.chain_id.splitn(2, '_');
        let chain = parts.next().unwrap_or_default();
        let symmetry = match parts.next() {
            Some(op) if op != "1" => format!("[{op}]"),
            _ => String::new(),
        };
        format!(
            "{} | {}{} | {}{}",
            self.chem_comp_id,
            chain,
            symmetry,
            self.author_residue_number,
            self.author_insertion_code.trim()
        )
    }

    pub fn tooltip(&self) -> String {
        format!("<span>{}</span>", self.display_name())
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.chem_comp_id, self.author_residue_number)
    }
}

impl PartialEq for Residue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Residue {}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_id_omits_blank_insertion_code() {
        let residue = Residue::new("A", 42, "ALA", " ", false);
        assert_eq!(residue.id(), "A42");
        let empty = Residue::new("A", 42, "ALA", "", false);
        assert_eq!(empty.id(), "A42");
    }

    #[test]
    fn derived_id_keeps_real_insertion_code() {
        let residue = Residue::new("B", 7, "GLY", "A", false);
        assert_eq!(residue.id(), "B7A");
    }

    #[test]
    fn residues_with_same_derived_id_are_equal_regardless_of_other_fields() {
        let a = Residue::new("A", 1, "ALA", " ", false);
        let b = Residue::new("A", 1, "GLY", "", true);
        assert_eq!(a, b);
        assert_ne!(a, Residue::new("A", 2, "ALA", " ", false));
    }

    #[test]
    fn residue_type_prefers_ligand_then_water_then_catalogue() {
        let catalogue = ResidueCatalogue::new();
        assert_eq!(
            Residue::new("A", 1, "ALA", " ", true).residue_type(&catalogue),
            ResidueType::Ligand
        );
        assert_eq!(
            Residue::new("A", 1, "HOH", " ", false).residue_type(&catalogue),
            ResidueType::Water
        );
        assert_eq!(
            Residue::new("A", 1, "LYS", " ", false).residue_type(&catalogue),
            ResidueType::Positive
        );
        assert_eq!(
            Residue::new("A", 1, "HIS", " ", false).residue_type(&catalogue),
            ResidueType::Aromatic
        );
        assert_eq!(
            Residue::new("A", 1, "ZZZ", " ", false).residue_type(&catalogue),
            ResidueType::Other
        );
    }

    #[test]
    fn residue_type_css_class_follows_naming_scheme() {
        assert_eq!(
            ResidueType::Glycine.css_class(),
            "pdb-lig-env-svg-glycine-res"
        );
    }

    #[test]
    fn display_name_renders_symmetry_operator_except_identity() {
        let sym = Residue::new("A_2", 15, "SER", " ", false);
        assert_eq!(sym.display_name(), "SER | A[2] | 15");
        let identity = Residue::new("A_1", 15, "SER", "B", false);
        assert_eq!(identity.display_name(), "SER | A | 15B");
        let plain = Residue::new("C", 3, "HEM", " ", true);
        assert_eq!(plain.tooltip(), "<span>HEM | C | 3</span>");
    }
}
