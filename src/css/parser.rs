//! CSS rule parser.
//!
//! Parses `selector { name: value; ... }` blocks into [`CssRule`]s using the
//! logos tokenizer from [`crate::css::tokenizer`]. Parsing is total: broken
//! input yields fewer rules, never an error.
//!
//! - Comments (`/* ... */`) are stripped before lexing.
//! - Selector text is everything before `{`, trimmed.
//! - The block runs to the matching `}` (nested braces are skipped).
//! - A declaration is `name: value` terminated by `;` or the end of the
//!   block. The value may itself contain `:`.
//! - Declarations with an empty name or value are dropped, and so are rules
//!   with an empty selector or no declarations.

use std::collections::BTreeMap;
use std::ops::Range;

use tracing::debug;

use crate::css::model::{CssRule, Selector};
use crate::css::tokenizer::{tokenize, Token};

/// Strip CSS block comments (`/* ... */`), replacing each with a space.
/// An unterminated comment swallows the rest of the input.
pub(crate) fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("/*") {
        result.push_str(&rest[..start]);
        result.push(' ');
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Parse CSS text into rules, in declaration order.
pub fn parse_rules(css: &str) -> Vec<CssRule> {
    let src = strip_comments(css);
    let tokens = tokenize(&src);
    let mut rules = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let selector_start = tokens[i].1.start;
        let Some(open) = (i..tokens.len()).find(|&k| tokens[k].0 == Token::BraceOpen) else {
            break;
        };
        let selector = src[selector_start..tokens[open].1.start].trim();

        let close = matching_close(&tokens, open);
        let body_end = close.map_or(src.len(), |c| tokens[c].1.start);
        let body = &tokens[open + 1..close.unwrap_or(tokens.len())];
        let properties = parse_declarations(&src, body, body_end);

        i = close.map_or(tokens.len(), |c| c + 1);

        if selector.is_empty() || properties.is_empty() {
            continue;
        }
        debug!(selector, props = properties.len(), "css rule");
        rules.push(CssRule {
            selector: Selector::parse(selector),
            properties,
        });
    }

    rules
}

/// Index of the `}` closing the block opened at `open`, if any.
fn matching_close(tokens: &[(Token, Range<usize>)], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (k, (tok, _)) in tokens.iter().enumerate().skip(open) {
        match tok {
            Token::BraceOpen => depth += 1,
            Token::BraceClose => {
                depth -= 1;
                if depth == 0 {
                    return Some(k);
                }
            }
            _ => {}
        }
    }
    None
}

/// Declarations of one block. `body_end` is where the block text stops.
fn parse_declarations(
    src: &str,
    body: &[(Token, Range<usize>)],
    body_end: usize,
) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();
    let mut depth = 0usize;
    let mut name_start: Option<usize> = None;
    let mut name: Option<&str> = None;
    let mut value_start = 0usize;

    for (tok, span) in body {
        if depth > 0 {
            match tok {
                Token::BraceOpen => depth += 1,
                Token::BraceClose => depth -= 1,
                _ => {}
            }
            continue;
        }
        match (tok, name) {
            (Token::BraceOpen, _) => {
                depth += 1;
                name_start = None;
                name = None;
            }
            (Token::Colon, None) => {
                let start = name_start.unwrap_or(span.start);
                name = Some(src[start..span.start].trim());
                value_start = span.end;
            }
            (Token::Semicolon, Some(n)) => {
                insert_declaration(&mut props, n, &src[value_start..span.start]);
                name_start = None;
                name = None;
            }
            (Token::Semicolon, None) => {
                // A bare `name;` has no value; drop it.
                name_start = None;
            }
            (_, None) => {
                name_start.get_or_insert(span.start);
            }
            _ => {}
        }
    }
    if let Some(n) = name {
        insert_declaration(&mut props, n, &src[value_start..body_end.max(value_start)]);
    }
    props
}

fn insert_declaration(props: &mut BTreeMap<String, String>, name: &str, value: &str) {
    let value = value.trim();
    if !name.is_empty() && !value.is_empty() {
        props.insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::specificity::SelectorType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("a/* x */b"), "a b");
        assert_eq!(strip_comments("a /* open"), "a  ");
        assert_eq!(strip_comments("é/**/ü"), "é ü");
    }

    #[test]
    fn test_single_rule() {
        let rules = parse_rules(".primary { background: #0066ff; color: white; }");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector_type(), SelectorType::Class);
        assert_eq!(rules[0].get("background"), Some("#0066ff"));
        assert_eq!(rules[0].get("color"), Some("white"));
    }

    #[test]
    fn test_multiple_rules_keep_order() {
        let rules = parse_rules("label{color:red} #x{color:blue} button.big{font-size:48}");
        let kinds: Vec<_> = rules.iter().map(|r| r.selector_type()).collect();
        assert_eq!(
            kinds,
            vec![SelectorType::Tag, SelectorType::Id, SelectorType::TagClass]
        );
    }

    #[test]
    fn test_last_declaration_without_semicolon() {
        let rules = parse_rules("label { color: red; font-size: 32 }");
        assert_eq!(rules[0].get("font-size"), Some("32"));
    }

    #[test]
    fn test_value_may_contain_colon() {
        let rules = parse_rules("image { src: a:b; }");
        assert_eq!(rules[0].get("src"), Some("a:b"));
    }

    #[test]
    fn test_empty_parts_are_dropped() {
        let rules = parse_rules("label { color: ; : red; bare; width: 10 } { color: red } .empty { }");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].properties.len(), 1);
        assert_eq!(rules[0].get("width"), Some("10"));
    }

    #[test]
    fn test_comments_anywhere() {
        let rules = parse_rules("/* head */ .a { /* inner */ color: red; /* tail */ }");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].get("color"), Some("red"));
    }

    #[test]
    fn test_compound_value_whitespace_preserved() {
        let rules = parse_rules("label { text-align: center   bottom; }");
        assert_eq!(rules[0].get("text-align"), Some("center   bottom"));
    }

    #[test]
    fn test_nested_braces_skipped() {
        let rules = parse_rules(".a { color: red; inner { x: 1; } width: 5; } .b { color: blue; }");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].get("x"), None);
        assert_eq!(rules[0].get("width"), Some("5"));
        assert_eq!(rules[1].get("color"), Some("blue"));
    }

    #[test]
    fn test_unterminated_block_still_parsed() {
        let rules = parse_rules(".a { color: red");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].get("color"), Some("red"));
    }
}
