//! In-process extension points.
//!
//! Independent parts of a program contribute extensions to named points; a
//! point orders them by index and `before`/`after` anchors and dispatches
//! calls across the enabled ones.

pub mod config;
pub mod extension;
pub mod global;
pub mod logging;
pub mod point;
pub mod registry;

pub use config::{ConfigError, FanOutPolicy, PointConfig, RegistryConfig};
pub use extension::{
    Anchor, Extension, ExtensionIndex, Method, MethodError, MethodResult, DEFAULT_EXTENSION_ID,
};
pub use global::with_global;
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use point::{DispatchError, Point, PointError, WILDCARD};
pub use registry::{Registry, DEFAULT_POINT_ID};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
