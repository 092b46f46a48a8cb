//! CSS engine: tokenizer, parser, specificity, properties, cascade.

pub mod color;
pub mod model;
pub mod parser;
pub mod properties;
pub mod specificity;
pub mod styles;
pub mod stylesheet;
pub mod tokenizer;

pub use model::{CssRule, Selector};
pub use specificity::SelectorType;
pub use styles::{Font, LongMode, Side, Style, StyleProp, TextAlign};
pub use stylesheet::Stylesheet;
