use phf::{Map, phf_map};

/// Single-letter codes of the twenty standard amino acids.
pub static STANDARD_AMINO_ACIDS: Map<&'static str, &'static str> = phf_map! {
    "ALA" => "A", "ARG" => "R", "ASN" => "N", "ASP" => "D", "CYS" => "C",
    "GLU" => "E", "GLN" => "Q", "GLY" => "G", "HIS" => "H", "ILE" => "I",
    "LEU" => "L", "LYS" => "K", "MET" => "M", "PHE" => "F", "PRO" => "P",
    "SER" => "S", "THR" => "T", "TRP" => "W", "TYR" => "Y", "VAL" => "V",
};
