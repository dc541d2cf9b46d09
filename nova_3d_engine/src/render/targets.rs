/// Frame-sized render targets shared between the passes.
///
/// No single pass owns these surfaces: the geometry pass writes the
/// G-buffer, the light pass reads it and writes the light buffer, the
/// composition pass reads both. Dimensions always equal the current
/// viewport; every `resize()` is called in lockstep from the frame
/// renderer and is a no-op when the dimensions did not change, so repeated
/// resizes never leak or duplicate GPU allocations.

use std::sync::Arc;
use crate::device::{Device, RenderTarget, RenderTargetDesc, TextureFormat};
use crate::error::Result;

// ===== GEOMETRY BUFFER =====

/// Multi-target geometry buffer (G-buffer).
///
/// Per-pixel surface attributes written by the deferred geometry pass:
/// albedo color, world-space normal and depth/stencil.
pub struct GeometryBuffer {
    albedo: Arc<dyn RenderTarget>,
    normal: Arc<dyn RenderTarget>,
    depth: Arc<dyn RenderTarget>,
    width: u32,
    height: u32,
}

impl GeometryBuffer {
    /// Create the G-buffer surfaces at the given viewport dimensions
    pub fn new(device: &mut dyn Device, width: u32, height: u32) -> Result<Self> {
        let (albedo, normal, depth) = Self::create_surfaces(device, width, height)?;
        Ok(Self { albedo, normal, depth, width, height })
    }

    fn create_surfaces(
        device: &mut dyn Device,
        width: u32,
        height: u32,
    ) -> Result<(Arc<dyn RenderTarget>, Arc<dyn RenderTarget>, Arc<dyn RenderTarget>)> {
        let albedo = device.create_render_target(RenderTargetDesc {
            width,
            height,
            format: TextureFormat::R8G8B8A8_UNORM,
        })?;
        let normal = device.create_render_target(RenderTargetDesc {
            width,
            height,
            format: TextureFormat::R16G16B16A16_FLOAT,
        })?;
        let depth = device.create_render_target(RenderTargetDesc {
            width,
            height,
            format: TextureFormat::D24_UNORM_S8_UINT,
        })?;
        Ok((albedo, normal, depth))
    }

    /// Recreate the surfaces for a new viewport size.
    ///
    /// No-op when the dimensions are unchanged.
    pub fn resize(&mut self, device: &mut dyn Device, width: u32, height: u32) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        let (albedo, normal, depth) = Self::create_surfaces(device, width, height)?;
        self.albedo = albedo;
        self.normal = normal;
        self.depth = depth;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn albedo(&self) -> &Arc<dyn RenderTarget> {
        &self.albedo
    }

    pub fn normal(&self) -> &Arc<dyn RenderTarget> {
        &self.normal
    }

    pub fn depth(&self) -> &Arc<dyn RenderTarget> {
        &self.depth
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Descriptors of all surfaces (albedo, normal, depth)
    pub fn descriptors(&self) -> [RenderTargetDesc; 3] {
        [
            *self.albedo.desc(),
            *self.normal.desc(),
            *self.depth.desc(),
        ]
    }
}

// ===== LIGHT BUFFER =====

/// Additive light accumulation buffer.
///
/// Float format: per-light contributions are summed without clamping;
/// overexposure is handled by tone mapping in post-processing.
pub struct LightBuffer {
    accumulation: Arc<dyn RenderTarget>,
    width: u32,
    height: u32,
}

impl LightBuffer {
    /// Create the accumulation surface at the given viewport dimensions
    pub fn new(device: &mut dyn Device, width: u32, height: u32) -> Result<Self> {
        let accumulation = Self::create_surface(device, width, height)?;
        Ok(Self { accumulation, width, height })
    }

    fn create_surface(
        device: &mut dyn Device,
        width: u32,
        height: u32,
    ) -> Result<Arc<dyn RenderTarget>> {
        device.create_render_target(RenderTargetDesc {
            width,
            height,
            format: TextureFormat::R16G16B16A16_FLOAT,
        })
    }

    /// Recreate the surface for a new viewport size.
    ///
    /// No-op when the dimensions are unchanged.
    pub fn resize(&mut self, device: &mut dyn Device, width: u32, height: u32) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        self.accumulation = Self::create_surface(device, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn accumulation(&self) -> &Arc<dyn RenderTarget> {
        &self.accumulation
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Descriptor of the accumulation surface
    pub fn descriptor(&self) -> RenderTargetDesc {
        *self.accumulation.desc()
    }
}

// ===== FRAME TARGETS =====

/// Composition-side targets: the composed objects target, the forward/UI
/// overlay target and the backbuffer the final frame is blitted to.
pub struct FrameTargets {
    objects: Arc<dyn RenderTarget>,
    ui: Arc<dyn RenderTarget>,
    backbuffer: Arc<dyn RenderTarget>,
    width: u32,
    height: u32,
}

impl FrameTargets {
    /// Create the composition targets at the given viewport dimensions
    pub fn new(device: &mut dyn Device, width: u32, height: u32) -> Result<Self> {
        let (objects, ui, backbuffer) = Self::create_surfaces(device, width, height)?;
        Ok(Self { objects, ui, backbuffer, width, height })
    }

    fn create_surfaces(
        device: &mut dyn Device,
        width: u32,
        height: u32,
    ) -> Result<(Arc<dyn RenderTarget>, Arc<dyn RenderTarget>, Arc<dyn RenderTarget>)> {
        let objects = device.create_render_target(RenderTargetDesc {
            width,
            height,
            format: TextureFormat::R8G8B8A8_UNORM,
        })?;
        let ui = device.create_render_target(RenderTargetDesc {
            width,
            height,
            format: TextureFormat::R8G8B8A8_UNORM,
        })?;
        let backbuffer = device.create_render_target(RenderTargetDesc {
            width,
            height,
            format: TextureFormat::B8G8R8A8_UNORM,
        })?;
        Ok((objects, ui, backbuffer))
    }

    /// Recreate the surfaces for a new viewport size.
    ///
    /// No-op when the dimensions are unchanged.
    pub fn resize(&mut self, device: &mut dyn Device, width: u32, height: u32) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        let (objects, ui, backbuffer) = Self::create_surfaces(device, width, height)?;
        self.objects = objects;
        self.ui = ui;
        self.backbuffer = backbuffer;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn objects(&self) -> &Arc<dyn RenderTarget> {
        &self.objects
    }

    pub fn ui(&self) -> &Arc<dyn RenderTarget> {
        &self.ui
    }

    pub fn backbuffer(&self) -> &Arc<dyn RenderTarget> {
        &self.backbuffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
#[path = "targets_tests.rs"]
mod tests;
