/// Camera — view/projection state for a render pass.
///
/// The camera is plain data: matrices, position and viewport dimensions.
/// Passes snapshot it at cull time; the snapshot stays valid for the frame
/// even if the live camera moves.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;
use super::volume::CullVolume;

/// Camera state for one render view.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space camera position
    position: Vec3,
    /// View matrix (world → view)
    view: Mat4,
    /// Projection matrix (view → clip)
    projection: Mat4,
    /// Viewport width in pixels
    width: u32,
    /// Viewport height in pixels
    height: u32,
}

impl Camera {
    /// Create a camera from explicit matrices
    pub fn new(position: Vec3, view: Mat4, projection: Mat4, width: u32, height: u32) -> Self {
        Self { position, view, projection, width, height }
    }

    /// Create a perspective camera looking at a target
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        width: u32,
        height: u32,
        near: f32,
        far: f32,
    ) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Self {
            position: eye,
            view: Mat4::look_at_rh(eye, target, up),
            projection: Mat4::perspective_rh(fov_y, aspect, near, far),
            width,
            height,
        }
    }

    /// World-space camera position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// View matrix
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// Combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Viewport width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Viewport height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Update the viewport dimensions (called on window resize)
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Extract the view frustum from the current matrices
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection_matrix())
    }

    /// Culling volume for this camera (frustum shape, camera-position origin)
    pub fn cull_volume(&self) -> CullVolume {
        CullVolume::frustum(self.frustum(), self.position)
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
