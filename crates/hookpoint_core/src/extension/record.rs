//! Extension record and its dispatch adapter.
//!
//! # Responsibility
//! - Hold contributed metadata (`id`, `index`, anchor) and named capabilities.
//! - Resolve methods by name at dispatch time.
//!
//! # Invariants
//! - A missing or empty id resolves to `"default"`.
//! - At most one anchor is set; setting one side replaces the other.
//! - The name `invoke` is reserved for the dispatch adapter; a method or data
//!   field with that name is rejected at registration time.

use crate::extension::index::{ExtensionIndex, ANONYMOUS_DEFAULT_INDEX, NAMED_DEFAULT_INDEX};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Id assigned to extensions registered without one.
pub const DEFAULT_EXTENSION_ID: &str = "default";
/// Method name owned by the dispatch adapter.
pub const RESERVED_METHOD_NAME: &str = "invoke";

/// Return type of every extension method. `Ok(None)` means "no value".
pub type MethodResult = Result<Option<Value>, MethodError>;

/// Callable capability stored on an extension.
///
/// The first argument is the dispatch context (the receiver), followed by
/// the positional arguments passed to `invoke`/`exec`.
pub type Method<C> = Arc<dyn Fn(&mut C, &[Value]) -> MethodResult + Send + Sync>;

/// Relative ordering constraint naming another extension id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Anchor {
    Before(String),
    After(String),
}

impl Anchor {
    /// Id of the extension this anchor points at.
    pub fn target(&self) -> &str {
        match self {
            Self::Before(id) | Self::After(id) => id,
        }
    }
}

/// Failure raised from inside an extension method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodError {
    message: String,
}

impl MethodError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for MethodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for MethodError {}

impl From<serde_json::Error> for MethodError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("invalid method payload: {err}"))
    }
}

/// Contributed unit of behavior registered against one point.
///
/// `C` is the context type handed to every method as its receiver.
pub struct Extension<C> {
    id: Option<String>,
    index: Option<ExtensionIndex>,
    anchor: Option<Anchor>,
    methods: BTreeMap<String, Method<C>>,
    fields: BTreeMap<String, Value>,
}

impl<C> Extension<C> {
    /// Creates a named extension. An empty id falls back to `"default"`.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            id: if id.is_empty() { None } else { Some(id) },
            index: None,
            anchor: None,
            methods: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Creates an extension without an id; it registers as `"default"`.
    pub fn anonymous() -> Self {
        Self::new(String::new())
    }

    pub fn with_index(mut self, index: impl Into<ExtensionIndex>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Places this extension immediately before `id` once `id` resolves.
    pub fn before(mut self, id: impl Into<String>) -> Self {
        self.anchor = Some(Anchor::Before(id.into()));
        self
    }

    /// Places this extension immediately after `id` once `id` resolves.
    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.anchor = Some(Anchor::After(id.into()));
        self
    }

    pub fn with_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut C, &[Value]) -> MethodResult + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Resolved id.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(DEFAULT_EXTENSION_ID)
    }

    /// Whether the contributor supplied its own id.
    pub fn has_explicit_id(&self) -> bool {
        self.id.is_some()
    }

    /// Resolved ordering key, applying the id-dependent default.
    pub fn index(&self) -> ExtensionIndex {
        match self.index {
            Some(index) => index,
            None if self.has_explicit_id() => ExtensionIndex::At(NAMED_DEFAULT_INDEX),
            None => ExtensionIndex::At(ANONYMOUS_DEFAULT_INDEX),
        }
    }

    pub fn set_index(&mut self, index: impl Into<ExtensionIndex>) {
        self.index = Some(index.into());
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    pub fn set_anchor(&mut self, anchor: Option<Anchor>) {
        self.anchor = anchor;
    }

    pub fn before_id(&self) -> Option<&str> {
        match &self.anchor {
            Some(Anchor::Before(id)) => Some(id),
            _ => None,
        }
    }

    pub fn after_id(&self) -> Option<&str> {
        match &self.anchor {
            Some(Anchor::After(id)) => Some(id),
            _ => None,
        }
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Whether the contributor claimed the adapter's `invoke` name, either as
    /// a method or as a data field.
    pub fn claims_reserved_name(&self) -> bool {
        self.methods.contains_key(RESERVED_METHOD_NAME)
            || self.fields.contains_key(RESERVED_METHOD_NAME)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn insert_method<F>(&mut self, name: impl Into<String>, method: F)
    where
        F: Fn(&mut C, &[Value]) -> MethodResult + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Dispatch adapter: calls `method` with `context` as receiver.
    ///
    /// A method this extension does not define resolves to `Ok(None)`.
    pub fn try_invoke(&self, method: &str, context: &mut C, args: &[Value]) -> MethodResult {
        match self.methods.get(method) {
            Some(callable) => callable(context, args),
            None => Ok(None),
        }
    }

    /// Metadata first, then data fields.
    pub(crate) fn pluck_value(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id())),
            "index" => Some(self.index().to_value()),
            "before" => self.before_id().map(Value::from),
            "after" => self.after_id().map(Value::from),
            _ => self.fields.get(name).cloned(),
        }
    }
}

impl<C> Clone for Extension<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            index: self.index,
            anchor: self.anchor.clone(),
            methods: self.methods.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<C> Debug for Extension<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("id", &self.id())
            .field("index", &self.index())
            .field("anchor", &self.anchor)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("fields", &self.fields)
            .finish()
    }
}
