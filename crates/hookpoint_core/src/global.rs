//! Process-wide registry for boundary code that cannot thread a `Registry`
//! through its call graph.
//!
//! Prefer owning a [`Registry`] in the application; this exists for glue
//! layers only. The context type is fixed to `serde_json::Value`.

use crate::registry::Registry;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::{Mutex, PoisonError};

static GLOBAL_REGISTRY: Lazy<Mutex<Registry<Value>>> = Lazy::new(|| Mutex::new(Registry::new()));

/// Runs `f` with exclusive access to the global registry.
///
/// The lock is held for the whole closure, covering registration, sorting and
/// dispatch. Do not call `with_global` again from inside `f`.
pub fn with_global<R>(f: impl FnOnce(&mut Registry<Value>) -> R) -> R {
    let mut registry = GLOBAL_REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut registry)
}
