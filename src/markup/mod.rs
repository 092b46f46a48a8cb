//! Markup front end: recursive-descent parser and entity decoding.

pub mod entities;
pub mod parser;

pub use entities::decode_entities;
pub use parser::{extract_section, find_section, for_each, parse, ParsedElement};
