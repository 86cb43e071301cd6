//! Ordering algorithm.
//!
//! # Responsibility
//! - Rebuild the resolved order from unanchored extensions plus anchor chains.
//! - Keep unresolved anchors parked for the next rebuild.
//!
//! # Invariants
//! - A rebuild is computed on a copy and committed only on success.
//! - Anchor lists are consumed once; each extension is placed at most once.
//! - An id re-entered while its own expansion is active is a cycle.

use crate::extension::{Anchor, Extension};
use crate::point::error::PointError;
use crate::point::{Orphans, Point};
use log::{debug, error};
use std::collections::{BTreeMap, BTreeSet};

impl<C> Point<C> {
    /// Recomputes the resolved order.
    ///
    /// # Errors
    /// - Returns `PointError::CircularReference` when an anchor chain loops.
    ///   The point is left untouched in that case.
    pub fn sort(&mut self) -> Result<&mut Self, PointError> {
        self.resort()?;
        Ok(self)
    }

    pub(crate) fn resort(&mut self) -> Result<(), PointError> {
        let (resolved, orphans) = match self.resolve() {
            Ok(state) => state,
            Err(err) => {
                error!(
                    "event=point_sort_failed module=point status=error point={} extension={}",
                    self.id,
                    err.extension_id()
                );
                return Err(err);
            }
        };

        self.extensions = resolved;
        self.orphans = orphans;
        debug!(
            "event=point_sorted module=point status=ok point={} resolved={} pending={}",
            self.id,
            self.extensions.len(),
            self.orphans.len()
        );
        Ok(())
    }

    fn resolve(&self) -> Result<(Vec<Extension<C>>, Orphans<C>), PointError> {
        let mut befores = BTreeMap::<String, Vec<Extension<C>>>::new();
        let mut afters = BTreeMap::<String, Vec<Extension<C>>>::new();
        let mut basic = Vec::new();

        // Pending extensions go first and are re-filed by their current
        // anchor, which `get` may have changed since they were parked.
        let candidates = self.orphans.iter().chain(self.extensions.iter()).cloned();
        for ext in candidates {
            match ext.anchor().cloned() {
                Some(Anchor::Before(target)) => befores.entry(target).or_default().push(ext),
                Some(Anchor::After(target)) => afters.entry(target).or_default().push(ext),
                None => basic.push(ext),
            }
        }

        sort_by_index(&mut basic);

        let mut placement = Placement {
            point_id: &self.id,
            befores,
            afters,
            active: BTreeSet::new(),
            resolved: Vec::with_capacity(self.extensions.len()),
        };
        for ext in basic {
            placement.place(ext)?;
        }

        let orphans = Orphans {
            before: placement.befores,
            after: placement.afters,
        };
        if let Some(extension) = find_pending_cycle(&orphans) {
            return Err(PointError::CircularReference {
                point: self.id.clone(),
                extension,
            });
        }

        Ok((placement.resolved, orphans))
    }
}

struct Placement<'a, C> {
    point_id: &'a str,
    befores: BTreeMap<String, Vec<Extension<C>>>,
    afters: BTreeMap<String, Vec<Extension<C>>>,
    active: BTreeSet<String>,
    resolved: Vec<Extension<C>>,
}

impl<C> Placement<'_, C> {
    fn place(&mut self, ext: Extension<C>) -> Result<(), PointError> {
        let id = ext.id().to_string();
        // Guard only: ids are unique per point, so `find_pending_cycle`
        // reports loops before placement can revisit an id.
        if !self.active.insert(id.clone()) {
            return Err(PointError::CircularReference {
                point: self.point_id.to_string(),
                extension: id,
            });
        }

        if let Some(mut before) = self.befores.remove(&id) {
            sort_by_index(&mut before);
            for child in before {
                self.place(child)?;
            }
        }

        self.resolved.push(ext);

        if let Some(mut after) = self.afters.remove(&id) {
            sort_by_index(&mut after);
            for child in after {
                self.place(child)?;
            }
        }

        self.active.remove(&id);
        Ok(())
    }
}

/// Stable, so equal keys keep their current relative order.
fn sort_by_index<C>(list: &mut [Extension<C>]) {
    list.sort_by_key(|ext| ext.index());
}

/// Returns the first pending extension whose anchor chain leads back to it.
fn find_pending_cycle<C>(orphans: &Orphans<C>) -> Option<String> {
    let mut links = BTreeMap::<&str, &str>::new();
    for (target, pending) in orphans.before.iter().chain(orphans.after.iter()) {
        for ext in pending {
            links.entry(ext.id()).or_insert(target.as_str());
        }
    }

    for (&start, &first_hop) in &links {
        let mut current = first_hop;
        for _ in 0..links.len() {
            if current == start {
                return Some(start.to_string());
            }
            match links.get(current) {
                Some(&next) => current = next,
                None => break,
            }
        }
    }
    None
}
