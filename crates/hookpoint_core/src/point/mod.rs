//! Extension point: one named hook and the extensions contributed to it.
//!
//! # Responsibility
//! - Admit extensions, keep them in a resolved order and expose the enabled
//!   view of that order.
//! - Park anchored extensions whose target is not resolved yet.
//!
//! # Invariants
//! - Ids are unique across resolved and pending extensions.
//! - Every structural change re-sorts; a failed re-sort leaves the point as it
//!   was before the change.
//! - Enable/disable never touches ordering or pending state.

mod dispatch;
mod error;
mod sort;

pub use error::{DispatchError, PointError};

use crate::config::PointConfig;
use crate::extension::Extension;
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};

/// Disables every extension of a point when passed to `disable`.
pub const WILDCARD: &str = "*";

/// Anchored extensions waiting for their target, keyed by target id.
pub(crate) struct Orphans<C> {
    pub(crate) before: BTreeMap<String, Vec<Extension<C>>>,
    pub(crate) after: BTreeMap<String, Vec<Extension<C>>>,
}

impl<C> Orphans<C> {
    fn new() -> Self {
        Self {
            before: BTreeMap::new(),
            after: BTreeMap::new(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Extension<C>> {
        self.before
            .values()
            .chain(self.after.values())
            .flat_map(|pending| pending.iter())
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Extension<C>> {
        self.before
            .values_mut()
            .chain(self.after.values_mut())
            .flat_map(|pending| pending.iter_mut())
    }

    pub(crate) fn len(&self) -> usize {
        self.iter().count()
    }
}

/// Named collection of extensions with a deterministic execution order.
pub struct Point<C> {
    id: String,
    config: PointConfig,
    extensions: Vec<Extension<C>>,
    orphans: Orphans<C>,
    disabled: BTreeSet<String>,
}

impl<C> Point<C> {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_config(id, PointConfig::default())
    }

    pub fn with_config(id: impl Into<String>, config: PointConfig) -> Self {
        Self {
            id: id.into(),
            config,
            extensions: Vec::new(),
            orphans: Orphans::new(),
            disabled: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &PointConfig {
        &self.config
    }

    /// Whether an extension with `id` is resolved or pending on an anchor.
    pub fn has(&self, id: &str) -> bool {
        self.extensions.iter().any(|ext| ext.id() == id)
            || self.orphans.iter().any(|ext| ext.id() == id)
    }

    /// Registers one extension and re-sorts.
    ///
    /// A second extension with an id that is already present is ignored.
    ///
    /// # Errors
    /// - `PointError::ReservedInvoke` when the extension defines `invoke` as a
    ///   method or data field.
    /// - `PointError::CircularReference` when its anchor closes a loop; the
    ///   extension is not kept.
    pub fn extend(&mut self, extension: Extension<C>) -> Result<&mut Self, PointError> {
        if extension.claims_reserved_name() {
            warn!(
                "event=extension_rejected module=point status=error point={} extension={} reason=reserved_invoke",
                self.id,
                extension.id()
            );
            return Err(PointError::ReservedInvoke {
                point: self.id.clone(),
                extension: extension.id().to_string(),
            });
        }

        let id = extension.id().to_string();
        if self.has(&id) {
            debug!(
                "event=extension_duplicate_ignored module=point status=ok point={} extension={}",
                self.id, id
            );
            return Ok(self);
        }

        self.extensions.push(extension);
        if let Err(err) = self.resort() {
            self.extensions.pop();
            return Err(err);
        }

        info!(
            "event=extension_registered module=point status=ok point={} extension={} pending={}",
            self.id,
            id,
            !self.extensions.iter().any(|ext| ext.id() == id)
        );
        Ok(self)
    }

    /// Hands the extension with `id` to `callback` for in-place changes, then
    /// re-sorts. Unknown ids are a no-op.
    ///
    /// Resolved extensions are searched first, then pending ones.
    ///
    /// # Errors
    /// - `PointError::ReservedInvoke` when the callback adds an `invoke`
    ///   method or data field.
    /// - `PointError::CircularReference` when the new anchor closes a loop.
    ///
    /// Both errors restore the extension to its state before the callback.
    pub fn get<F>(&mut self, id: &str, callback: F) -> Result<&mut Self, PointError>
    where
        F: FnOnce(&mut Extension<C>),
    {
        let Some(ext) = self.find_mut(id) else {
            return Ok(self);
        };
        let backup = ext.clone();
        callback(ext);

        if ext.claims_reserved_name() {
            *ext = backup;
            return Err(PointError::ReservedInvoke {
                point: self.id.clone(),
                extension: id.to_string(),
            });
        }

        if let Err(err) = self.resort() {
            if let Some(ext) = self.find_mut(id) {
                *ext = backup;
            }
            return Err(err);
        }
        Ok(self)
    }

    /// Excludes `id` (or every extension for `"*"`) from the enabled view.
    pub fn disable(&mut self, id: &str) -> &mut Self {
        self.disabled.insert(id.to_string());
        self
    }

    pub fn enable(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        !self.disabled.contains(id) && !self.disabled.contains(WILDCARD)
    }

    /// Enabled extensions in resolved order.
    pub fn list(&self) -> Vec<&Extension<C>> {
        self.extensions
            .iter()
            .filter(|ext| self.is_enabled(ext.id()))
            .collect()
    }

    /// All resolved extensions, including disabled ones.
    pub fn extensions(&self) -> &[Extension<C>] {
        &self.extensions
    }

    /// Ids parked on an anchor that has not resolved yet.
    pub fn pending_ids(&self) -> Vec<&str> {
        self.orphans.iter().map(Extension::id).collect()
    }

    pub fn each<F>(&self, mut callback: F) -> &Self
    where
        F: FnMut(&Extension<C>),
    {
        for ext in self.list() {
            callback(ext);
        }
        self
    }

    pub fn map<T, F>(&self, callback: F) -> Vec<T>
    where
        F: FnMut(&Extension<C>) -> T,
    {
        self.list().into_iter().map(callback).collect()
    }

    pub fn filter<F>(&self, mut predicate: F) -> Vec<&Extension<C>>
    where
        F: FnMut(&Extension<C>) -> bool,
    {
        self.list().into_iter().filter(|ext| predicate(ext)).collect()
    }

    pub fn reduce<T, F>(&self, callback: F, memo: T) -> T
    where
        F: FnMut(T, &Extension<C>) -> T,
    {
        self.list().into_iter().fold(memo, callback)
    }

    /// Reads one named value per enabled extension.
    ///
    /// `id`, `index`, `before` and `after` come from ordering metadata; other
    /// names are looked up in the extension's data fields.
    pub fn pluck(&self, field: &str) -> Vec<Option<Value>> {
        self.map(|ext| ext.pluck_value(field))
    }

    pub fn count(&self) -> usize {
        self.list().len()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Extension<C>> {
        if let Some(position) = self.extensions.iter().position(|ext| ext.id() == id) {
            return self.extensions.get_mut(position);
        }
        self.orphans.iter_mut().find(|ext| ext.id() == id)
    }
}

impl<C> Debug for Point<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Point")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("extensions", &self.extensions)
            .field("pending", &self.pending_ids())
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Point;
    use crate::extension::{Anchor, Extension, ExtensionIndex};
    use crate::point::PointError;
    use serde_json::json;

    #[test]
    fn extend_rejects_reserved_invoke_method() {
        let mut point = Point::<()>::new("render");
        let err = point
            .extend(Extension::new("sneaky").with_method("invoke", |_, _| Ok(None)))
            .expect_err("reserved method must be rejected");
        assert!(matches!(err, PointError::ReservedInvoke { .. }));
        assert_eq!(point.count(), 0);
    }

    #[test]
    fn duplicate_id_is_ignored_even_while_pending() {
        let mut point = Point::<()>::new("render");
        point
            .extend(Extension::new("child").after("parent").with_field("rev", 1))
            .and_then(|p| p.extend(Extension::new("child").with_field("rev", 2)))
            .and_then(|p| p.extend(Extension::new("parent")))
            .expect("extend chain should succeed");

        assert_eq!(point.count(), 2);
        assert_eq!(point.pluck("rev"), vec![None, Some(json!(1))]);
    }

    #[test]
    fn get_mutates_and_resorts() {
        let mut point = Point::<()>::new("render");
        point
            .extend(Extension::new("a").with_index(1))
            .and_then(|p| p.extend(Extension::new("b").with_index(2)))
            .and_then(|p| p.get("b", |ext| ext.set_index(ExtensionIndex::First)))
            .expect("get should succeed");

        assert_eq!(point.pluck("id"), vec![Some(json!("b")), Some(json!("a"))]);
    }

    #[test]
    fn get_reaches_pending_extensions() {
        let mut point = Point::<()>::new("render");
        point
            .extend(Extension::new("a"))
            .and_then(|p| p.extend(Extension::new("b").after("missing")))
            .and_then(|p| p.get("b", |ext| ext.set_anchor(Some(Anchor::After("a".into())))))
            .expect("re-anchoring should succeed");

        assert_eq!(point.pluck("id"), vec![Some(json!("a")), Some(json!("b"))]);
        assert!(point.pending_ids().is_empty());
    }

    #[test]
    fn get_rolls_back_when_callback_creates_cycle() {
        let mut point = Point::<()>::new("render");
        point
            .extend(Extension::new("a").before("b"))
            .and_then(|p| p.extend(Extension::new("b")))
            .expect("extend chain should succeed");

        let err = point
            .get("b", |ext| ext.set_anchor(Some(Anchor::Before("a".into()))))
            .expect_err("cycle must be rejected");
        assert!(matches!(err, PointError::CircularReference { .. }));
        assert_eq!(point.pluck("id"), vec![Some(json!("a")), Some(json!("b"))]);
    }

    #[test]
    fn get_rejects_reserved_method_added_by_callback() {
        let mut point = Point::<()>::new("render");
        point
            .extend(Extension::new("a"))
            .expect("extend should succeed");

        let err = point
            .get("a", |ext| ext.insert_method("invoke", |_, _| Ok(None)))
            .expect_err("reserved method must be rejected");
        assert!(matches!(err, PointError::ReservedInvoke { .. }));
        assert!(!point.extensions()[0].has_method("invoke"));

        let err = point
            .get("a", |ext| ext.set_field("invoke", "mine"))
            .expect_err("reserved field must be rejected");
        assert!(matches!(err, PointError::ReservedInvoke { .. }));
        assert_eq!(point.pluck("invoke"), vec![None]);
    }

    #[test]
    fn get_unknown_id_is_noop() {
        let mut point = Point::<()>::new("render");
        let mut called = false;
        point
            .get("ghost", |_| called = true)
            .expect("unknown id is not an error");
        assert!(!called);
    }

    #[test]
    fn iteration_helpers_use_enabled_view() {
        let mut point = Point::<()>::new("render");
        for (id, weight) in [("a", 1), ("b", 2), ("c", 3)] {
            point
                .extend(Extension::new(id).with_index(weight).with_field("weight", weight))
                .expect("extend should succeed");
        }
        point.disable("b");

        let mut visited = Vec::new();
        point.each(|ext| visited.push(ext.id().to_string()));
        assert_eq!(visited, vec!["a", "c"]);

        let total = point.reduce(
            |sum, ext| sum + ext.field("weight").and_then(|v| v.as_i64()).unwrap_or(0),
            0,
        );
        assert_eq!(total, 4);

        let heavy = point.filter(|ext| ext.index() > ExtensionIndex::At(1));
        assert_eq!(heavy.len(), 1);
        assert_eq!(heavy[0].id(), "c");

        assert_eq!(point.map(|ext| ext.id().len()), vec![1, 1]);
    }
}
