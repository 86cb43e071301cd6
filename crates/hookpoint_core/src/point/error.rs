//! Point registration and dispatch errors.

use crate::extension::MethodError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Programmer errors raised while registering or ordering extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    /// The extension defines a method named `invoke`, which is reserved for
    /// the dispatch adapter.
    ReservedInvoke { point: String, extension: String },
    /// An anchor chain loops back onto an extension still being placed, or
    /// pending anchors form a loop that can never resolve.
    CircularReference { point: String, extension: String },
}

impl PointError {
    /// Extension id the error is about.
    pub fn extension_id(&self) -> &str {
        match self {
            Self::ReservedInvoke { extension, .. }
            | Self::CircularReference { extension, .. } => extension,
        }
    }
}

impl Display for PointError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReservedInvoke { point, extension } => write!(
                f,
                "extension `{extension}` on point `{point}` must not define its own invoke method"
            ),
            Self::CircularReference { point, extension } => write!(
                f,
                "circular reference detected for extension point `{point}` and extension `{extension}`"
            ),
        }
    }
}

impl Error for PointError {}

/// Failure of one extension method during `Point::exec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    pub point: String,
    pub extension: String,
    pub method: String,
    pub source: MethodError,
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "extension `{}` on point `{}` failed in `{}`: {}",
            self.extension, self.point, self.method, self.source
        )
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
