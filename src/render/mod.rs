//! Serialization of reconstructed documents.

mod json;

pub use json::{page_to_json, to_json, to_writer, JsonFormat};
