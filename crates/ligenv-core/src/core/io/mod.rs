//! Serde models of the JSON payloads consumed by the diagram.
//!
//! Payloads arrive as text from an external resource provider; this module only decodes them.
//! Every document type implements [`traits::JsonDocument`], which gives a uniform `from_json`
//! and `read_from` entry point and a single [`PayloadError`] type.

pub mod payload;
pub mod traits;

pub use payload::PayloadError;
