/// Central drawer registry for the engine.
///
/// Maps logical drawer kinds to bound GPU pipelines. Backends install their
/// drawers at startup; render passes resolve the kinds they need at
/// construction time and fail with a configuration error when a required
/// drawer is missing.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use super::drawer::{Drawer, DrawerKind};

/// Registry of installed drawers, keyed by logical kind.
///
/// Passed by reference to the render passes — no hidden global state.
pub struct DrawerRegistry {
    drawers: FxHashMap<DrawerKind, Arc<dyn Drawer>>,
}

impl DrawerRegistry {
    /// Create a new empty drawer registry
    pub fn new() -> Self {
        Self {
            drawers: FxHashMap::default(),
        }
    }

    /// Install a drawer for a logical kind
    ///
    /// # Errors
    ///
    /// Returns an error if a drawer is already installed for this kind.
    pub fn install(&mut self, kind: DrawerKind, drawer: Arc<dyn Drawer>) -> Result<()> {
        if self.drawers.contains_key(&kind) {
            engine_bail!("nova3d::DrawerRegistry",
                "Drawer {:?} already installed", kind);
        }

        self.drawers.insert(kind, drawer);
        Ok(())
    }

    /// Get a drawer by kind
    pub fn get(&self, kind: DrawerKind) -> Option<&Arc<dyn Drawer>> {
        self.drawers.get(&kind)
    }

    /// Resolve a drawer that a pass requires.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the drawer is not installed —
    /// a pass cannot be constructed without its pipelines.
    pub fn require(&self, kind: DrawerKind) -> Result<Arc<dyn Drawer>> {
        match self.drawers.get(&kind) {
            Some(drawer) => Ok(Arc::clone(drawer)),
            None => Err(crate::engine_config_err!("nova3d::DrawerRegistry",
                "Required drawer {:?} is not installed", kind)),
        }
    }

    /// Number of installed drawers
    pub fn len(&self) -> usize {
        self.drawers.len()
    }

    /// Whether no drawers are installed
    pub fn is_empty(&self) -> bool {
        self.drawers.is_empty()
    }

    /// Remove all installed drawers
    pub fn clear(&mut self) {
        self.drawers.clear();
    }
}

impl Default for DrawerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
