//! CSS AST: selectors and rules.

use std::collections::BTreeMap;

use crate::css::specificity::SelectorType;

/// One parsed selector. Which of `tag`, `class_name` and `id` are meaningful
/// depends on `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub kind: SelectorType,
    pub tag: String,
    pub class_name: String,
    pub id: String,
}

impl Selector {
    /// Classify a trimmed selector string.
    ///
    /// `#x` is an id, `.x` a class, `t.x` a tag with class, anything else a
    /// bare tag. No combinators or pseudo-classes are recognised; such
    /// selectors parse as tags that never match.
    pub fn parse(s: &str) -> Self {
        let mut sel = Selector {
            kind: SelectorType::Tag,
            tag: String::new(),
            class_name: String::new(),
            id: String::new(),
        };
        if let Some(id) = s.strip_prefix('#') {
            sel.kind = SelectorType::Id;
            sel.id = id.to_string();
        } else if let Some(class) = s.strip_prefix('.') {
            sel.kind = SelectorType::Class;
            sel.class_name = class.to_string();
        } else if let Some((tag, class)) = s.split_once('.') {
            sel.kind = SelectorType::TagClass;
            sel.tag = tag.to_string();
            sel.class_name = class.to_string();
        } else {
            sel.tag = s.to_string();
        }
        sel
    }

    /// Whether an element with this identity matches.
    ///
    /// `class_names` is a whitespace-separated list.
    pub fn matches(&self, tag: &str, id: &str, class_names: &str) -> bool {
        match self.kind {
            SelectorType::Tag => !tag.is_empty() && self.tag == tag,
            SelectorType::Class => has_class(class_names, &self.class_name),
            SelectorType::TagClass => {
                !tag.is_empty() && self.tag == tag && has_class(class_names, &self.class_name)
            }
            SelectorType::Id => !id.is_empty() && self.id == id,
        }
    }
}

/// Whether the whitespace-separated `class_names` contains `class`.
pub fn has_class(class_names: &str, class: &str) -> bool {
    !class.is_empty() && class_names.split_ascii_whitespace().any(|c| c == class)
}

/// A selector with its declarations. Properties are kept sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: Selector,
    pub properties: BTreeMap<String, String>,
}

impl CssRule {
    pub fn selector_type(&self) -> SelectorType {
        self.selector.kind
    }

    /// Raw value of a property, if declared.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_kinds() {
        assert_eq!(Selector::parse("#main").kind, SelectorType::Id);
        assert_eq!(Selector::parse("#main").id, "main");
        assert_eq!(Selector::parse(".big").kind, SelectorType::Class);
        assert_eq!(Selector::parse(".big").class_name, "big");
        let tc = Selector::parse("button.primary");
        assert_eq!(tc.kind, SelectorType::TagClass);
        assert_eq!(tc.tag, "button");
        assert_eq!(tc.class_name, "primary");
        assert_eq!(Selector::parse("label").kind, SelectorType::Tag);
    }

    #[test]
    fn test_tag_match_requires_tag() {
        let sel = Selector::parse("label");
        assert!(sel.matches("label", "", ""));
        assert!(!sel.matches("", "", ""));
        assert!(!sel.matches("button", "", ""));
    }

    #[test]
    fn test_class_match_tokenizes() {
        let sel = Selector::parse(".on");
        assert!(sel.matches("label", "", "big  on"));
        assert!(!sel.matches("label", "", "online"));
        assert!(!sel.matches("label", "", ""));
    }

    #[test]
    fn test_tag_class_needs_both() {
        let sel = Selector::parse("button.primary");
        assert!(sel.matches("button", "", "primary"));
        assert!(!sel.matches("label", "", "primary"));
        assert!(!sel.matches("button", "", "secondary"));
    }

    #[test]
    fn test_id_match_requires_id() {
        let sel = Selector::parse("#x");
        assert!(sel.matches("label", "x", ""));
        assert!(!sel.matches("label", "", ""));
        assert!(!sel.matches("label", "y", ""));
    }

    #[test]
    fn test_has_class() {
        assert!(has_class("a b c", "b"));
        assert!(!has_class("a b c", ""));
        assert!(!has_class("", "a"));
    }
}
