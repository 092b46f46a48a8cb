//! Stylesheet: ordered rule list plus the cascade.
//!
//! Rules are kept in declaration order. [`Stylesheet::apply_matching`] walks
//! the specificity levels from lowest to highest and, within a level, applies
//! matching rules in declaration order. Every rule mutates the same widget,
//! so the last write for a property wins and higher levels always beat lower
//! ones.

use crate::backend::{Backend, WidgetId};
use crate::css::model::CssRule;
use crate::css::parser::parse_rules;
use crate::css::properties::apply_properties;
use crate::css::specificity::SelectorType;
use crate::geometry::Size;

/// Ordered collection of parsed rules.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<CssRule>,
}

impl Stylesheet {
    /// Create an empty stylesheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `css` and append its rules after the existing ones.
    pub fn parse(&mut self, css: &str) {
        self.rules.extend(parse_rules(css));
    }

    /// Drop every rule.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Matching rules in cascade order: specificity level, then declaration
    /// order.
    pub fn matching<'a>(
        &'a self,
        tag: &'a str,
        id: &'a str,
        class_names: &'a str,
    ) -> impl Iterator<Item = &'a CssRule> + 'a {
        SelectorType::CASCADE_ORDER.into_iter().flat_map(move |level| {
            self.rules.iter().filter(move |rule| {
                rule.selector_type() == level && rule.selector.matches(tag, id, class_names)
            })
        })
    }

    /// Last value of `property` in cascade order, if any rule sets it.
    pub fn resolve<'a>(
        &'a self,
        tag: &'a str,
        id: &'a str,
        class_names: &'a str,
        property: &str,
    ) -> Option<&'a str> {
        self.matching(tag, id, class_names)
            .filter_map(|rule| rule.get(property))
            .last()
    }

    /// Apply every matching rule to `widget`.
    ///
    /// Returns the winning `z-index` declaration, if any. The caller owns
    /// z-ordering because the widget may not be registered yet.
    pub fn apply_matching<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        widget: WidgetId,
        tag: &str,
        id: &str,
        class_names: &str,
        screen: Size,
    ) -> Option<i32> {
        let mut z_index = None;
        for rule in self.matching(tag, id, class_names) {
            if let Some(z) = apply_properties(backend, widget, &rule.properties, screen) {
                z_index = Some(z);
            }
        }
        z_index
    }
}
