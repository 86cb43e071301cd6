//! Extension contracts.
//!
//! An extension is a bag of named methods plus ordering metadata. Points own
//! extensions and call into them through [`Extension::try_invoke`].

pub mod index;
pub mod record;

pub use index::{ExtensionIndex, ANONYMOUS_DEFAULT_INDEX, NAMED_DEFAULT_INDEX};
pub use record::{
    Anchor, Extension, Method, MethodError, MethodResult, DEFAULT_EXTENSION_ID,
    RESERVED_METHOD_NAME,
};
