//! `{var}` templates.
//!
//! A template is plain text with `{name}` placeholders. There is no compiled
//! form and no dependency graph: a template depends on `name` exactly when it
//! contains the literal token `{name}`.

use crate::markup::decode_entities;
use crate::reactive::store::Store;

/// Longest distance from `{` to its `}` for the pair to count as a
/// placeholder. Longer spans are copied literally.
const MAX_PLACEHOLDER_SPAN: usize = 32;

/// Substitute every placeholder from the store, then decode HTML entities.
/// Unknown variables render as the empty string.
pub fn render_template(template: &str, store: &Store) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close + 1 < MAX_PLACEHOLDER_SPAN => {
                out.push_str(&store.get_as_string(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    decode_entities(&out)
}

/// Whether `template` references `name`.
pub fn template_has_var(template: &str, name: &str) -> bool {
    if template.is_empty() || name.is_empty() {
        return false;
    }
    template.contains(&format!("{{{name}}}"))
}

/// Whether the text contains any placeholder opener.
pub fn is_dynamic(text: &str) -> bool {
    text.contains('{')
}

/// Variable name of a binding attribute: `"{x}"` → `"x"`. A plain name is
/// accepted as-is.
pub fn extract_bind_var(binding: &str) -> &str {
    if binding.len() > 2 && binding.starts_with('{') && binding.ends_with('}') {
        &binding[1..binding.len() - 1]
    } else {
        binding
    }
}

/// Every distinct variable referenced by a template, in order of first use.
pub fn template_vars(template: &str) -> Vec<&str> {
    let mut vars: Vec<&str> = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if close + 1 < MAX_PLACEHOLDER_SPAN => {
                let name = &after[..close];
                if !name.is_empty() && !vars.contains(&name) {
                    vars.push(name);
                }
                rest = &after[close + 1..];
            }
            _ => rest = after,
        }
    }
    vars
}
