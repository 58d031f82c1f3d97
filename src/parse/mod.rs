pub mod document;

pub use document::{NodeDoc, from_doc, parse_document, serialize_document, to_doc};
