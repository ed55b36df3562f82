//! Resolve a named pointer variable to the blob address it holds.

use crate::error::{Error, Result};
use crate::scope::{Scope, ScopeFilter};

/// Look up `name` among the bindings selected by `filter`.
///
/// Only the scope is consulted; no process memory is read.
pub fn locate(name: &str, scope: &dyn Scope, filter: &ScopeFilter) -> Result<u64> {
    let binding = scope
        .variables(filter)
        .into_iter()
        .find(|b| b.name == name)
        .ok_or_else(|| Error::VariableNotFound {
            name: name.to_string(),
        })?;

    if !binding.is_pointer {
        return Err(Error::TypeMismatch {
            name: binding.name,
            type_name: binding.type_name,
        });
    }

    tracing::debug!("Located {:?} pointer {} = {:#x}", binding.kind, name, binding.value);
    Ok(binding.value)
}
