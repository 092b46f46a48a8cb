//! Typed, ordered, observable variable store.
//!
//! Variables are keyed by name and remember the order in which they were
//! first declared, so collaborators can be synchronised at startup by index.
//! A single change callback observes every notifying write.

use std::collections::HashMap;
use std::fmt;

use crate::geometry::{leading_float, leading_int};

// ---------------------------------------------------------------------------
// Types and values
// ---------------------------------------------------------------------------

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VarType {
    #[default]
    String,
    Int,
    Bool,
    Float,
}

impl VarType {
    /// Canonical name: `string`, `int`, `bool` or `float`.
    pub fn as_str(self) -> &'static str {
        match self {
            VarType::String => "string",
            VarType::Int => "int",
            VarType::Bool => "bool",
            VarType::Float => "float",
        }
    }

    /// Parse a type name. Unknown names are `String`.
    pub fn from_name(s: &str) -> Self {
        match s {
            "int" => VarType::Int,
            "bool" => VarType::Bool,
            "float" => VarType::Float,
            _ => VarType::String,
        }
    }

    /// Whether `s` names one of the four types.
    pub fn is_known(s: &str) -> bool {
        matches!(s, "string" | "int" | "bool" | "float")
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable's value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i32),
    Bool(bool),
    Float(f32),
}

impl Value {
    /// Convert `s` according to `ty`: integers and floats default to zero on
    /// bad input, booleans are true only for `"true"` and `"1"`.
    pub fn parse(ty: VarType, s: &str) -> Self {
        match ty {
            VarType::String => Value::String(s.to_string()),
            VarType::Int => Value::Int(leading_int(s)),
            VarType::Bool => Value::Bool(parse_bool(s)),
            VarType::Float => Value::Float(leading_float(s).0.unwrap_or(0.0)),
        }
    }

    pub fn var_type(&self) -> VarType {
        match self {
            Value::String(_) => VarType::String,
            Value::Int(_) => VarType::Int,
            Value::Bool(_) => VarType::Bool,
            Value::Float(_) => VarType::Float,
        }
    }

    fn as_int(&self) -> i32 {
        match self {
            Value::String(s) => leading_int(s),
            Value::Int(i) => *i,
            Value::Bool(b) => i32::from(*b),
            Value::Float(f) => *f as i32,
        }
    }

    fn as_bool(&self) -> bool {
        match self {
            Value::String(s) => parse_bool(s),
            Value::Int(i) => *i != 0,
            Value::Bool(b) => *b,
            Value::Float(f) => *f != 0.0,
        }
    }

    fn as_float(&self) -> f32 {
        match self {
            Value::String(s) => leading_float(s).0.unwrap_or(0.0),
            Value::Int(i) => *i as f32,
            Value::Bool(b) => f32::from(u8::from(*b)),
            Value::Float(f) => *f,
        }
    }
}

/// Canonical string form: decimal integers, `true`/`false`, two-decimal floats.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Float(v) => write!(f, "{v:.2}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

/// `"true"` and `"1"` are true; everything else is false.
pub fn parse_bool(s: &str) -> bool {
    s == "true" || s == "1"
}

/// One declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub var_type: VarType,
    pub value: Value,
    pub default: Value,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Callback fired on notifying writes with the variable name and new value.
pub type ChangeCallback = Box<dyn FnMut(&str, &Value)>;

/// The variable store.
#[derive(Default)]
pub struct Store {
    vars: HashMap<String, Variable>,
    names: Vec<String>,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("names", &self.names)
            .field("vars", &self.vars)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the change callback, replacing any previous one.
    pub fn on_change(&mut self, callback: impl FnMut(&str, &Value) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Declare a variable. Re-declaring resets type, value and default but
    /// keeps the original position in the declaration order.
    pub fn define(&mut self, name: &str, var_type: VarType, default: Value) {
        if !self.vars.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.vars.insert(
            name.to_string(),
            Variable {
                var_type,
                value: default.clone(),
                default,
            },
        );
    }

    /// Declare a variable whose default is given as a string.
    pub fn define_str(&mut self, name: &str, var_type: VarType, default: &str) {
        self.define(name, var_type, Value::parse(var_type, default));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    /// Declared type, `String` for unknown names.
    pub fn var_type(&self, name: &str) -> VarType {
        self.vars.get(name).map_or(VarType::String, |v| v.var_type)
    }

    /// Write a value.
    ///
    /// An undeclared name is created as a `String` variable whose default is
    /// the written value. Writing a value equal to the current one does
    /// nothing. Returns whether the value changed; the callback fires only
    /// when it did and `notify` is set.
    pub fn set(&mut self, name: &str, value: impl Into<Value>, notify: bool) -> bool {
        let value = value.into();
        match self.vars.get_mut(name) {
            Some(var) => {
                if var.value == value {
                    return false;
                }
                var.value = value;
            }
            None => {
                self.names.push(name.to_string());
                self.vars.insert(
                    name.to_string(),
                    Variable {
                        var_type: VarType::String,
                        value: value.clone(),
                        default: value,
                    },
                );
            }
        }
        if notify {
            self.notify(name);
        }
        true
    }

    /// Write a string, converting it to the variable's declared type.
    /// Undeclared names are stored as strings.
    pub fn set_from_string(&mut self, name: &str, value: &str, notify: bool) -> bool {
        let ty = self.var_type(name);
        self.set(name, Value::parse(ty, value), notify)
    }

    /// String value; non-string variables use their canonical form. Missing
    /// variables are `""`.
    pub fn get_string(&self, name: &str) -> String {
        self.get_as_string(name)
    }

    /// Canonical string form of the current value (`""` when missing).
    pub fn get_as_string(&self, name: &str) -> String {
        self.vars.get(name).map(|v| v.value.to_string()).unwrap_or_default()
    }

    pub fn get_int(&self, name: &str) -> i32 {
        self.vars.get(name).map_or(0, |v| v.value.as_int())
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.vars.get(name).is_some_and(|v| v.value.as_bool())
    }

    pub fn get_float(&self, name: &str) -> f32 {
        self.vars.get(name).map_or(0.0, |v| v.value.as_float())
    }

    /// Restore one variable's default and fire the callback. Returns whether
    /// the variable exists.
    pub fn reset(&mut self, name: &str) -> bool {
        let Some(var) = self.vars.get_mut(name) else {
            return false;
        };
        var.value = var.default.clone();
        self.notify(name);
        true
    }

    /// Restore every default without notifying.
    pub fn reset_all(&mut self) {
        for var in self.vars.values_mut() {
            var.value = var.default.clone();
        }
    }

    /// Forget every variable. The callback stays registered.
    pub fn clear(&mut self) {
        self.vars.clear();
        self.names.clear();
    }

    // ── Index access (declaration order) ─────────────────────────────

    pub fn count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name at `index`, `""` when out of range.
    pub fn name_at(&self, index: usize) -> &str {
        self.names.get(index).map_or("", String::as_str)
    }

    /// Type at `index`, `String` when out of range.
    pub fn type_at(&self, index: usize) -> VarType {
        self.names
            .get(index)
            .and_then(|n| self.vars.get(n))
            .map_or(VarType::String, |v| v.var_type)
    }

    /// Canonical default at `index`, `""` when out of range.
    pub fn default_at(&self, index: usize) -> String {
        self.names
            .get(index)
            .and_then(|n| self.vars.get(n))
            .map(|v| v.default.to_string())
            .unwrap_or_default()
    }

    /// Names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    fn notify(&mut self, name: &str) {
        let Some(var) = self.vars.get(name) else {
            return;
        };
        if let Some(cb) = self.on_change.as_mut() {
            cb(name, &var.value);
        }
    }
}
