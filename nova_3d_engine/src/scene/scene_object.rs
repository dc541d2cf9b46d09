/// Scene object types — the entities managed by the ComponentRegistry.
///
/// A SceneObject is identity plus a set of optional capabilities
/// (tagged composition instead of interface hierarchies): a `Drawable`
/// component makes it renderable, a `Cullable` component makes it
/// visibility-testable. Dispatch iterates only over objects exposing the
/// capability a pass needs.

use std::sync::Arc;
use glam::Mat4;
use slotmap::new_key_type;
use crate::camera::CullVolume;
use crate::device::{Buffer, IndexType, PrimitiveTopology};
use crate::drawer::DrawerKind;
use super::bounds::{AABB, Sphere};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a SceneObject within a ComponentRegistry.
    ///
    /// Keys remain valid even after other objects are removed.
    /// A key becomes invalid only when its own object is removed.
    pub struct SceneObjectKey;
}

// ===== USAGE FLAGS =====

bitflags::bitflags! {
    /// Usage flags classifying scene objects for queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UsageFlags: u32 {
        /// 2D/overlay object drawn in the UI layer
        const UI      = 1 << 0;
        /// Terrain / ground geometry
        const GROUND  = 1 << 1;
        /// Never moves after creation
        const STATIC  = 1 << 2;
        /// Transform changes at runtime
        const DYNAMIC = 1 << 3;
        /// Streamed vegetation patches
        const FOLIAGE = 1 << 4;
    }
}

// ===== BLEND MODE =====

/// Output blending category of a drawable.
///
/// Part of the draw sort key: opaque objects draw before blended ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    Alpha,
    Transparent,
    Additive,
}

impl BlendMode {
    /// Rank within the (layer, blend mode, depth-write) sort key
    pub fn sort_rank(&self) -> u32 {
        match self {
            BlendMode::Opaque => 0,
            BlendMode::Alpha => 1,
            BlendMode::Transparent => 2,
            BlendMode::Additive => 3,
        }
    }

    /// Whether this mode blends against the framebuffer
    pub fn is_blended(&self) -> bool {
        !matches!(self, BlendMode::Opaque)
    }
}

// ===== CAPABILITIES =====

/// Capability tags a scene object can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Drawable,
    Cullable,
}

// ===== GEOMETRY BINDING =====

/// GPU geometry of a drawable: shared buffers plus draw ranges.
///
/// The vertex buffer may be absent while the upload is still pending;
/// passes treat such a drawable as not-ready and skip the frame without
/// raising an error.
#[derive(Clone)]
pub struct GeometryBinding {
    /// Shared vertex buffer (None until uploaded)
    pub vertex_buffer: Option<Arc<dyn Buffer>>,
    /// Shared index buffer (None for non-indexed geometry)
    pub index_buffer: Option<Arc<dyn Buffer>>,
    /// Index type (only meaningful if index_buffer is Some)
    pub index_type: IndexType,
    /// Number of vertices to draw (non-indexed)
    pub vertex_count: u32,
    /// Number of indices to draw; 0 for non-indexed geometry
    pub index_count: u32,
    /// Primitive topology
    pub topology: PrimitiveTopology,
}

impl GeometryBinding {
    /// Non-indexed triangle list over an uploaded vertex buffer
    pub fn triangles(vertex_buffer: Arc<dyn Buffer>, vertex_count: u32) -> Self {
        Self {
            vertex_buffer: Some(vertex_buffer),
            index_buffer: None,
            index_type: IndexType::U16,
            vertex_count,
            index_count: 0,
            topology: PrimitiveTopology::TriangleList,
        }
    }

    /// Placeholder binding for geometry whose upload is still pending
    pub fn pending() -> Self {
        Self {
            vertex_buffer: None,
            index_buffer: None,
            index_type: IndexType::U16,
            vertex_count: 0,
            index_count: 0,
            topology: PrimitiveTopology::TriangleList,
        }
    }

    /// Whether the vertex binding is uploaded and drawable
    pub fn is_ready(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    /// Number of primitives a draw of this binding produces
    pub fn primitive_count(&self) -> u32 {
        let elements = if self.index_count > 0 {
            self.index_count
        } else {
            self.vertex_count
        };
        match self.topology {
            PrimitiveTopology::TriangleList => elements / 3,
            PrimitiveTopology::TriangleStrip => elements.saturating_sub(2),
            PrimitiveTopology::LineList => elements / 2,
        }
    }
}

// ===== DRAWABLE CAPABILITY =====

/// Drawable capability: everything a pass needs to submit the object.
///
/// Mutated by the application's per-frame update; consumed immutably
/// during draw recording.
#[derive(Clone)]
pub struct Drawable {
    /// Output blending category
    pub blend_mode: BlendMode,
    /// Whether the draw writes depth
    pub depth_write: bool,
    /// Eligible for the deferred geometry pass (false → forward pass)
    pub deferred: bool,
    /// Rendered into shadow maps
    pub cast_shadow: bool,
    /// Logical drawer used to submit this object
    pub drawer: DrawerKind,
    /// World transform
    pub world: Mat4,
    /// Material slot in the shared material table
    pub material_slot: u32,
    /// GPU geometry
    pub geometry: GeometryBinding,
}

impl Drawable {
    /// Opaque deferred drawable with the standard geometry drawer
    pub fn deferred_opaque(geometry: GeometryBinding, world: Mat4) -> Self {
        Self {
            blend_mode: BlendMode::Opaque,
            depth_write: true,
            deferred: true,
            cast_shadow: true,
            drawer: DrawerKind::Geometry,
            world,
            material_slot: 0,
            geometry,
        }
    }
}

// ===== CULLABLE CAPABILITY =====

/// World-space proxy shape used for visibility tests.
#[derive(Debug, Clone, Copy)]
pub enum CullProxy {
    Aabb(AABB),
    Sphere(Sphere),
}

/// Result of one cull test.
///
/// `distance` is only meaningful when `culled` is false; it is used purely
/// for draw ordering (nearest-first opaques, farthest-first transparents).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullResult {
    pub culled: bool,
    pub distance: f32,
}

/// Cullable capability: a world-space proxy testable against a volume.
#[derive(Debug, Clone, Copy)]
pub struct Cullable {
    pub proxy: CullProxy,
}

impl Cullable {
    /// Cullable with a world-space AABB proxy
    pub fn aabb(aabb: AABB) -> Self {
        Self { proxy: CullProxy::Aabb(aabb) }
    }

    /// Cullable with a world-space sphere proxy
    pub fn sphere(center: glam::Vec3, radius: f32) -> Self {
        Self { proxy: CullProxy::Sphere(Sphere::new(center, radius)) }
    }

    /// Test the proxy against a culling volume.
    pub fn cull(&self, volume: &CullVolume) -> CullResult {
        match &self.proxy {
            CullProxy::Aabb(aabb) => CullResult {
                culled: !volume.intersects_aabb(aabb),
                distance: volume.distance_to(aabb.center()),
            },
            CullProxy::Sphere(sphere) => CullResult {
                culled: !volume.intersects_sphere(sphere),
                distance: volume.distance_to(sphere.center),
            },
        }
    }
}

// ===== SCENE OBJECT =====

/// An entity participating in rendering and update.
///
/// Identity (unique id within a registry, display name), usage flags,
/// render layer (ascending = drawn later), active/visible flags, an
/// optional non-owning back-reference to an owner object, and the optional
/// capability components.
#[derive(Clone)]
pub struct SceneObject {
    id: String,
    name: String,
    usage: UsageFlags,
    layer: i32,
    active: bool,
    visible: bool,
    owner: Option<SceneObjectKey>,
    drawable: Option<Drawable>,
    cullable: Option<Cullable>,
}

impl SceneObject {
    /// Create a new scene object with the given unique id and display name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            usage: UsageFlags::empty(),
            layer: 0,
            active: true,
            visible: true,
            owner: None,
            drawable: None,
            cullable: None,
        }
    }

    // ===== BUILDER HELPERS =====

    /// Set the usage flags (chainable)
    pub fn with_usage(mut self, usage: UsageFlags) -> Self {
        self.usage = usage;
        self
    }

    /// Set the render layer (chainable)
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Attach the drawable capability (chainable)
    pub fn with_drawable(mut self, drawable: Drawable) -> Self {
        self.drawable = Some(drawable);
        self
    }

    /// Attach the cullable capability (chainable)
    pub fn with_cullable(mut self, cullable: Cullable) -> Self {
        self.cullable = Some(cullable);
        self
    }

    /// Set the owner back-reference (chainable).
    ///
    /// The owner relation never implies lifetime ownership.
    pub fn with_owner(mut self, owner: SceneObjectKey) -> Self {
        self.owner = Some(owner);
        self
    }

    // ===== ACCESSORS =====

    /// Unique id within the registry
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Usage flags
    pub fn usage(&self) -> UsageFlags {
        self.usage
    }

    /// Render layer (ascending = drawn later)
    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn set_layer(&mut self, layer: i32) {
        self.layer = layer;
    }

    /// Whether the object participates in update
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the object participates in rendering
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Non-owning back-reference to the owner object
    pub fn owner(&self) -> Option<SceneObjectKey> {
        self.owner
    }

    /// Drawable capability, if present
    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }

    /// Mutable drawable capability, if present
    pub fn drawable_mut(&mut self) -> Option<&mut Drawable> {
        self.drawable.as_mut()
    }

    /// Cullable capability, if present
    pub fn cullable(&self) -> Option<&Cullable> {
        self.cullable.as_ref()
    }

    /// Mutable cullable capability, if present
    pub fn cullable_mut(&mut self) -> Option<&mut Cullable> {
        self.cullable.as_mut()
    }

    /// Capability tags this object exposes
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut caps = Vec::with_capacity(2);
        if self.drawable.is_some() {
            caps.push(Capability::Drawable);
        }
        if self.cullable.is_some() {
            caps.push(Capability::Cullable);
        }
        caps
    }

    /// Whether this object exposes the given capability
    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Drawable => self.drawable.is_some(),
            Capability::Cullable => self.cullable.is_some(),
        }
    }
}

#[cfg(test)]
#[path = "scene_object_tests.rs"]
mod tests;
