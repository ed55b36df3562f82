//! Named variable bindings visible in the current debugger frame.

use serde::{Deserialize, Serialize};

/// Where a binding lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    #[serde(alias = "arg")]
    Argument,
    Local,
    Static,
}

/// A named variable with its type classification and current value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Type as the debugger spells it (e.g. `const void *`)
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_pointer: bool,
    /// Current value; the pointee address for pointer bindings
    pub value: u64,
    #[serde(default = "default_true")]
    pub in_scope: bool,
}

fn default_true() -> bool {
    true
}

impl Binding {
    /// A pointer-typed binding
    pub fn pointer(
        name: impl Into<String>,
        kind: BindingKind,
        type_name: impl Into<String>,
        value: u64,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: type_name.into(),
            is_pointer: true,
            value,
            in_scope: true,
        }
    }

    /// A non-pointer binding
    pub fn value(
        name: impl Into<String>,
        kind: BindingKind,
        type_name: impl Into<String>,
        value: u64,
    ) -> Self {
        Self {
            is_pointer: false,
            ..Self::pointer(name, kind, type_name, value)
        }
    }

    pub fn out_of_scope(mut self) -> Self {
        self.in_scope = false;
        self
    }
}

/// Which binding categories a lookup considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ScopeFilter {
    pub include_arguments: bool,
    pub include_locals: bool,
    pub include_statics: bool,
    pub in_scope_only: bool,
}

impl Default for ScopeFilter {
    fn default() -> Self {
        Self {
            include_arguments: true,
            include_locals: true,
            include_statics: true,
            in_scope_only: true,
        }
    }
}

impl ScopeFilter {
    pub fn accepts(&self, binding: &Binding) -> bool {
        let kind_ok = match binding.kind {
            BindingKind::Argument => self.include_arguments,
            BindingKind::Local => self.include_locals,
            BindingKind::Static => self.include_statics,
        };
        kind_ok && (binding.in_scope || !self.in_scope_only)
    }
}

/// Scope lookup supplied by the host debugger
pub trait Scope {
    /// Bindings matching `filter`, in frame order
    fn variables(&self, filter: &ScopeFilter) -> Vec<Binding>;
}

/// A fixed list of bindings
#[derive(Debug, Clone, Default)]
pub struct StaticScope {
    bindings: Vec<Binding>,
}

impl StaticScope {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn push(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Scope for StaticScope {
    fn variables(&self, filter: &ScopeFilter) -> Vec<Binding> {
        self.bindings
            .iter()
            .filter(|b| filter.accepts(b))
            .cloned()
            .collect()
    }
}
