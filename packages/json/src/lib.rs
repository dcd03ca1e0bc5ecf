//! JSON bridge for fieldpath graphs.
//!
//! JSON documents load as *unstructured* graphs: objects become
//! `map[string]any`, arrays become `[]any`, and every nested value is boxed
//! in the interface. Any value graph, structured or not, can be printed back
//! to JSON.

mod convert;
mod error;

pub use convert::{from_json, read_json, to_json, unstructured, write_json};
pub use error::Error;
