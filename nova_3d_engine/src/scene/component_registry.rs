/// ComponentRegistry — the ordered, thread-synchronized scene object
/// collection.
///
/// Add/remove/sort are guarded by an internal mutex; enumeration hands out
/// snapshot vectors so readers never observe the registry mid-mutation.
/// Objects are stored in a SlotMap for O(1) insert/remove with stable keys;
/// a separate order vector carries the draw order (insertion order until
/// `sort_for_draw()` re-sorts it by the (layer, blend mode, depth-write)
/// key — ties stay in insertion order).

use std::sync::Mutex;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::Result;
use crate::engine_config_err;
use super::scene_object::{Capability, SceneObject, SceneObjectKey, UsageFlags};

struct Inner {
    /// Objects stored in a slot map for O(1) insert/remove
    objects: SlotMap<SceneObjectKey, SceneObject>,
    /// Draw order (insertion order until sorted)
    order: Vec<SceneObjectKey>,
    /// Unique-id lookup
    by_id: FxHashMap<String, SceneObjectKey>,
}

/// Ordered, thread-synchronized collection of scene objects.
pub struct ComponentRegistry {
    inner: Mutex<Inner>,
}

impl ComponentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                objects: SlotMap::with_key(),
                order: Vec::new(),
                by_id: FxHashMap::default(),
            }),
        }
    }

    /// Add a scene object to the registry.
    ///
    /// Returns a stable key that remains valid until the object is removed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if an object with the same id already
    /// exists. The registry is left unchanged — no partial insertion.
    pub fn add(&self, object: SceneObject) -> Result<SceneObjectKey> {
        let mut inner = self.inner.lock().unwrap();

        if inner.by_id.contains_key(object.id()) {
            return Err(engine_config_err!("nova3d::ComponentRegistry",
                "Scene object id '{}' already registered", object.id()));
        }

        let id = object.id().to_string();
        let key = inner.objects.insert(object);
        inner.order.push(key);
        inner.by_id.insert(id, key);
        Ok(key)
    }

    /// Remove a scene object, returning it. Returns None for stale keys.
    pub fn remove(&self, key: SceneObjectKey) -> Option<SceneObject> {
        let mut inner = self.inner.lock().unwrap();

        let object = inner.objects.remove(key)?;
        inner.by_id.remove(object.id());
        if let Some(pos) = inner.order.iter().position(|&k| k == key) {
            inner.order.remove(pos);
        }
        Some(object)
    }

    /// Whether the key refers to a live object
    pub fn contains(&self, key: SceneObjectKey) -> bool {
        self.inner.lock().unwrap().objects.contains_key(key)
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().objects.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all objects
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.objects.clear();
        inner.order.clear();
        inner.by_id.clear();
    }

    /// Look up an object key by its unique id.
    ///
    /// Returns None for an empty id or an unknown id.
    pub fn by_id(&self, id: &str) -> Option<SceneObjectKey> {
        if id.is_empty() {
            return None;
        }
        self.inner.lock().unwrap().by_id.get(id).copied()
    }

    /// Look up the first object (in draw order) with the given display name.
    ///
    /// Returns None for an empty name. Names are not unique; prefer `by_id`.
    pub fn by_name(&self, name: &str) -> Option<SceneObjectKey> {
        if name.is_empty() {
            return None;
        }
        let inner = self.inner.lock().unwrap();
        inner
            .order
            .iter()
            .copied()
            .find(|&key| inner.objects.get(key).map(|o| o.name() == name).unwrap_or(false))
    }

    /// Keys of objects whose usage flags intersect `usage`, in draw order
    pub fn with_usage(&self, usage: UsageFlags) -> Vec<SceneObjectKey> {
        let inner = self.inner.lock().unwrap();
        inner
            .order
            .iter()
            .copied()
            .filter(|&key| {
                inner.objects.get(key)
                    .map(|o| o.usage().intersects(usage))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Keys of objects exposing the given capability, in draw order
    pub fn with_capability(&self, capability: Capability) -> Vec<SceneObjectKey> {
        let inner = self.inner.lock().unwrap();
        inner
            .order
            .iter()
            .copied()
            .filter(|&key| {
                inner.objects.get(key)
                    .map(|o| o.has_capability(capability))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Re-sort the draw order by (layer, blend mode, depth-write).
    ///
    /// Objects on lower layers draw first; within a layer, opaque before
    /// blended modes, depth-writing objects before non-writing ones.
    /// The sort is stable: equal keys keep their insertion order.
    pub fn sort_for_draw(&self) {
        let mut inner = self.inner.lock().unwrap();

        let mut keyed: Vec<(SceneObjectKey, (i32, u32, bool))> = inner
            .order
            .iter()
            .copied()
            .map(|key| {
                let sort_key = inner.objects.get(key).map(|o| {
                    let (blend_rank, depth_write) = match o.drawable() {
                        Some(d) => (d.blend_mode.sort_rank(), d.depth_write),
                        None => (0, true),
                    };
                    (o.layer(), blend_rank, !depth_write)
                });
                (key, sort_key.unwrap_or((0, 0, false)))
            })
            .collect();

        keyed.sort_by_key(|&(_, sort_key)| sort_key);
        inner.order = keyed.into_iter().map(|(key, _)| key).collect();
    }

    /// Snapshot of (key, object) pairs in current draw order.
    ///
    /// The snapshot is a deep copy: readers can iterate it while other
    /// threads mutate the registry.
    pub fn snapshot(&self) -> Vec<(SceneObjectKey, SceneObject)> {
        let inner = self.inner.lock().unwrap();
        inner
            .order
            .iter()
            .copied()
            .filter_map(|key| inner.objects.get(key).map(|o| (key, o.clone())))
            .collect()
    }

    /// Keys in current draw order
    pub fn keys(&self) -> Vec<SceneObjectKey> {
        self.inner.lock().unwrap().order.clone()
    }

    /// Clone an object out of the registry
    pub fn get(&self, key: SceneObjectKey) -> Option<SceneObject> {
        self.inner.lock().unwrap().objects.get(key).cloned()
    }

    /// Run a closure against a mutable object. Returns None for stale keys.
    pub fn with_object_mut<R>(
        &self,
        key: SceneObjectKey,
        f: impl FnOnce(&mut SceneObject) -> R,
    ) -> Option<R> {
        let mut inner = self.inner.lock().unwrap();
        inner.objects.get_mut(key).map(f)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "component_registry_tests.rs"]
mod tests;
