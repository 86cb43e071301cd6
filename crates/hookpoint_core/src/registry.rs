//! Point registry.
//!
//! # Responsibility
//! - Map point ids to points, creating a point on first access.
//!
//! # Invariants
//! - Points are never removed.
//! - New points inherit the registry's `PointConfig`.

use crate::config::RegistryConfig;
use crate::point::Point;
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// Id of the unnamed point.
pub const DEFAULT_POINT_ID: &str = "";

/// Owner of every point created through it.
pub struct Registry<C> {
    points: BTreeMap<String, Point<C>>,
    config: RegistryConfig,
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            points: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the point for `id`, creating it when absent.
    pub fn point(&mut self, id: impl Into<String>) -> &mut Point<C> {
        let point_config = &self.config.point;
        self.points.entry(id.into()).or_insert_with_key(|id| {
            info!(
                "event=point_created module=registry status=ok point={:?}",
                id
            );
            Point::with_config(id.clone(), point_config.clone())
        })
    }

    /// Returns the unnamed point.
    pub fn point_default(&mut self) -> &mut Point<C> {
        self.point(DEFAULT_POINT_ID)
    }

    /// Looks up a point without creating it.
    pub fn get(&self, id: &str) -> Option<&Point<C>> {
        self.points.get(id)
    }

    /// Known point ids. Callers must not rely on any particular order.
    pub fn keys(&self) -> BTreeSet<String> {
        self.points.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}
