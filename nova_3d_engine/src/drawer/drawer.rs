/// Drawer trait - a logical drawer bound to a GPU pipeline.
///
/// A drawer owns a shader pipeline plus its constant-buffer plumbing. The
/// render passes feed it per-frame, per-light and per-object parameters and
/// then ask it to issue the draw into a command recorder. Backends install
/// concrete drawers into the `DrawerRegistry`; the engine core never touches
/// shader code directly.

use glam::{Mat4, Vec3, Vec4};
use crate::error::Result;
use crate::camera::Camera;
use crate::device::CommandRecorder;
use crate::scene::GeometryBinding;

/// Logical drawer types resolved through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawerKind {
    /// G-buffer geometry writer
    Geometry,
    /// Depth-only shadow caster writer
    Shadow,
    /// Forward/UI drawer (non-deferred objects)
    Forward,
    /// Fullscreen directional light accumulation
    DirectionalLight,
    /// Point light volume accumulation
    PointLight,
    /// Spot light volume accumulation
    SpotLight,
    /// Flat stencil-marking drawer for light volume proxies
    StencilVolume,
    /// G-buffer + light buffer composition
    Composer,
    /// Objects target + UI target merge
    CombineTargets,
    /// Post-processing chain
    PostProcess,
    /// Final blit to the backbuffer
    Screen,
}

/// Per-frame shader parameters
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub inverse_view_projection: Mat4,
    pub camera_position: Vec3,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FrameParams {
    /// Snapshot the per-frame parameters from a camera
    pub fn from_camera(camera: &Camera) -> Self {
        let view_projection = camera.view_projection_matrix();
        Self {
            view: *camera.view_matrix(),
            projection: *camera.projection_matrix(),
            view_projection,
            inverse_view_projection: view_projection.inverse(),
            camera_position: camera.position(),
            viewport_width: camera.width(),
            viewport_height: camera.height(),
        }
    }
}

/// Per-light shader parameters
#[derive(Debug, Clone, Copy)]
pub struct LightParams {
    /// World-space light position (unused for directional lights)
    pub position: Vec3,
    /// Emission direction (unused for point lights)
    pub direction: Vec3,
    /// Light color, linear RGBA
    pub color: Vec4,
    /// Influence radius (unused for directional lights)
    pub range: f32,
    /// Cosine of the spot cone half-angle (spot lights only)
    pub cone_angle_cos: f32,
}

/// Per-object shader parameters
#[derive(Debug, Clone, Copy)]
pub struct ObjectParams {
    /// World transform
    pub world: Mat4,
    /// Material slot in the shared material table
    pub material_slot: u32,
}

/// A bound GPU pipeline exposing the engine's update/draw protocol.
///
/// `&self` because a drawer is shared between passes and frames; concrete
/// implementations keep their mutable GPU state behind the device.
pub trait Drawer: Send + Sync {
    /// Upload per-frame constants (camera matrices, viewport)
    fn update_per_frame(&self, frame: &FrameParams) -> Result<()>;

    /// Upload per-light constants (light accumulation drawers only)
    fn update_per_light(&self, light: &LightParams) -> Result<()>;

    /// Upload per-object constants (world transform, material slot)
    fn update_per_object(&self, object: &ObjectParams) -> Result<()>;

    /// Bind the pipeline and issue the draw for the given geometry
    fn draw(&self, cmd: &mut dyn CommandRecorder, geometry: &GeometryBinding) -> Result<()>;
}
