//! Reactive state: typed variable store, `{var}` templates, binding updates.
//!
//! - [`Store`]: ordered, typed variables with a single change callback.
//! - [`render_template`]: placeholder substitution plus entity decoding.
//! - [`binding`]: pushes a variable change into every dependent widget.

pub mod binding;
pub mod store;
pub mod template;

pub use store::{parse_bool, ChangeCallback, Store, Value, VarType, Variable};
pub use template::{extract_bind_var, is_dynamic, render_template, template_has_var, template_vars};
