/// CullingEngine — visibility testing with per-cull-index result caching.
///
/// Each render pass queries under its own **cull index** (main camera,
/// per-shadow-light, ...). Results are cached per (index, object) so the
/// same object is never re-tested against the same volume within one frame,
/// while distinct indices stay fully isolated: an object invisible to a
/// shadow light can still be visible to the camera, and vice versa.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::camera::CullVolume;
use crate::scene::{Capability, CullResult, SceneObject, SceneObjectKey};
use super::counters::FrameCounters;

/// Cull index of the main camera
pub const CULL_INDEX_CAMERA: u32 = 0;
/// First cull index reserved for shadow-casting lights
pub const CULL_INDEX_SHADOW_BASE: u32 = 16;

/// Visibility testing engine with per-index caches.
pub struct CullingEngine {
    /// Cached results keyed by cull index, then object key
    caches: FxHashMap<u32, FxHashMap<SceneObjectKey, CullResult>>,
    counters: Arc<FrameCounters>,
}

impl CullingEngine {
    /// Create a culling engine reporting into the given counters
    pub fn new(counters: Arc<FrameCounters>) -> Self {
        Self {
            caches: FxHashMap::default(),
            counters,
        }
    }

    /// Drop all cached results (called at the top of each frame)
    pub fn begin_frame(&mut self) {
        self.caches.clear();
    }

    /// Test a set of objects against a volume under a cull index.
    ///
    /// Objects exposing the Cullable capability are tested (or served from
    /// this index's cache); objects without it are retained unconditionally
    /// with a zero distance. Inactive or invisible objects are ignored.
    ///
    /// Returns true if any object survived the test.
    pub fn cull_test(
        &mut self,
        cull_index: u32,
        volume: &CullVolume,
        objects: &[(SceneObjectKey, SceneObject)],
    ) -> bool {
        let cache = self.caches.entry(cull_index).or_default();
        let mut any_visible = false;

        for (key, object) in objects {
            if !object.is_active() || !object.is_visible() {
                continue;
            }

            let result = match cache.get(key) {
                Some(cached) => *cached,
                None => {
                    let result = match object.cullable() {
                        Some(cullable) => {
                            self.counters.add_cull();
                            cullable.cull(volume)
                        }
                        // No cull proxy: always retained
                        None => CullResult { culled: false, distance: 0.0 },
                    };
                    cache.insert(*key, result);
                    result
                }
            };

            if !result.culled {
                any_visible = true;
            }
        }

        any_visible
    }

    /// Cached result for an object under a cull index.
    ///
    /// None if the object was never tested under this index this frame.
    pub fn result(&self, cull_index: u32, key: SceneObjectKey) -> Option<CullResult> {
        self.caches.get(&cull_index)?.get(&key).copied()
    }

    /// Visible objects under a cull index, with their distances.
    ///
    /// Preserves the input order; only objects with a cached not-culled
    /// result are returned.
    pub fn visible<'a>(
        &self,
        cull_index: u32,
        objects: &'a [(SceneObjectKey, SceneObject)],
    ) -> Vec<(&'a SceneObjectKey, &'a SceneObject, f32)> {
        let Some(cache) = self.caches.get(&cull_index) else {
            return Vec::new();
        };

        objects
            .iter()
            .filter_map(|(key, object)| match cache.get(key) {
                Some(result) if !result.culled => Some((key, object, result.distance)),
                _ => None,
            })
            .collect()
    }

    /// Sort an opaque draw list nearest-first (minimizes early-Z overdraw).
    ///
    /// Stable: equal distances keep their existing order.
    pub fn sort_opaque<T>(list: &mut [(T, f32)]) {
        list.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    /// Sort a transparent draw list farthest-first (correct alpha blending).
    ///
    /// Stable: equal distances keep their existing order.
    pub fn sort_transparent<T>(list: &mut [(T, f32)]) {
        list.sort_by(|a, b| b.1.total_cmp(&a.1));
    }

    /// Whether an object exposes the capability needed for cull tests
    pub fn is_cullable(object: &SceneObject) -> bool {
        object.has_capability(Capability::Cullable)
    }
}

#[cfg(test)]
#[path = "culling_tests.rs"]
mod tests;
