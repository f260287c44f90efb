use super::payload::PayloadError;
use serde::de::DeserializeOwned;
use std::io::Read;

/// Uniform decoding entry point for the payload documents.
pub trait JsonDocument: Sized {
    /// Decodes a document from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Json`] on malformed JSON or a shape mismatch, or a more specific
    /// variant when the document is well formed but unusable.
    fn from_json(text: &str) -> Result<Self, PayloadError>;

    /// Reads the whole stream and decodes it with [`JsonDocument::from_json`].
    fn read_from(reader: &mut impl Read) -> Result<Self, PayloadError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_json(&text)
    }
}

/// Plain serde decoding for documents without envelope rules.
pub(crate) fn decode<T: DeserializeOwned>(text: &str) -> Result<T, PayloadError> {
    Ok(serde_json::from_str(text)?)
}
