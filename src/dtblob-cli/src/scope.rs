//! Frame variables supplied by the user or exported from a debugger.
//!
//! Command-line form: `name=kind:type:value`, where `kind` is `arg`, `local`
//! or `static` (suffix `!` marks the variable as out of scope), `type` is the
//! C type name (a trailing `*` makes it a pointer) and `value` is hex or
//! decimal.
//!
//! File form (TOML or JSON, chosen by extension):
//!
//! ```toml
//! [[variables]]
//! name = "dtb"
//! kind = "local"
//! type = "const void *"
//! value = "0x40000000"
//! ```

use crate::cli::parse_address;
use anyhow::{bail, Context, Result};
use dtblob::{Binding, BindingKind, StaticScope};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parse a `name=kind:type:value` spec
pub fn parse_binding_spec(spec: &str) -> Result<Binding> {
    let (name, rest) = spec
        .split_once('=')
        .with_context(|| format!("Variable spec \"{}\" is missing '='", spec))?;
    let (kind, rest) = rest
        .split_once(':')
        .with_context(|| format!("Variable spec \"{}\" is missing a kind", spec))?;
    let (type_name, value) = rest
        .rsplit_once(':')
        .with_context(|| format!("Variable spec \"{}\" is missing a type or value", spec))?;

    let name = name.trim();
    if name.is_empty() {
        bail!("Variable spec \"{}\" has an empty name", spec);
    }

    let (kind, in_scope) = match kind.trim().strip_suffix('!') {
        Some(kind) => (parse_kind(kind)?, false),
        None => (parse_kind(kind)?, true),
    };

    let value = parse_address(value)
        .with_context(|| format!("Variable spec \"{}\" has a bad value", spec))?;

    Ok(make_binding(name, kind, type_name.trim(), None, value, in_scope))
}

fn parse_kind(kind: &str) -> Result<BindingKind> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "arg" | "argument" => Ok(BindingKind::Argument),
        "local" => Ok(BindingKind::Local),
        "static" | "global" => Ok(BindingKind::Static),
        other => bail!("Unknown variable kind \"{}\" (expected arg, local or static)", other),
    }
}

fn is_pointer_type(type_name: &str) -> bool {
    type_name.trim_end().ends_with('*')
}

fn make_binding(
    name: &str,
    kind: BindingKind,
    type_name: &str,
    is_pointer: Option<bool>,
    value: u64,
    in_scope: bool,
) -> Binding {
    let mut binding = Binding::pointer(name, kind, type_name, value);
    binding.is_pointer = is_pointer.unwrap_or_else(|| is_pointer_type(type_name));
    binding.in_scope = in_scope;
    binding
}

#[derive(Debug, Deserialize)]
struct ScopeFile {
    #[serde(default)]
    variables: Vec<VariableEntry>,
}

#[derive(Debug, Deserialize)]
struct VariableEntry {
    name: String,
    kind: BindingKind,
    #[serde(rename = "type")]
    type_name: String,
    is_pointer: Option<bool>,
    value: ValueRepr,
    #[serde(default = "default_in_scope")]
    in_scope: bool,
}

fn default_in_scope() -> bool {
    true
}

/// Numbers may be written natively or as strings (for hex in JSON)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Number(u64),
    Text(String),
}

impl ValueRepr {
    fn resolve(&self) -> Result<u64> {
        match self {
            ValueRepr::Number(n) => Ok(*n),
            ValueRepr::Text(s) => parse_address(s),
        }
    }
}

/// Load variables from a TOML or JSON scope file
pub fn load_scope_file(path: &Path) -> Result<Vec<Binding>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scope file {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let file: ScopeFile = if is_json {
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON scope file {}", path.display()))?
    } else {
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML scope file {}", path.display()))?
    };

    file.variables
        .iter()
        .map(|v| {
            let value = v
                .value
                .resolve()
                .with_context(|| format!("Bad value for variable \"{}\"", v.name))?;
            Ok(make_binding(
                &v.name,
                v.kind,
                &v.type_name,
                v.is_pointer,
                value,
                v.in_scope,
            ))
        })
        .collect()
}

/// Assemble the frame from a scope file and command-line specs, file first
pub fn build_scope(scope_file: Option<&Path>, specs: &[String]) -> Result<StaticScope> {
    let mut scope = StaticScope::default();

    if let Some(path) = scope_file {
        for binding in load_scope_file(path)? {
            scope.push(binding);
        }
    }
    for spec in specs {
        scope.push(parse_binding_spec(spec)?);
    }

    if scope.is_empty() {
        tracing::warn!("No frame variables supplied; use --var or --scope-file");
    }
    Ok(scope)
}
